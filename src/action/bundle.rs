//! Desire name -> action bundle. The lookup is total: anything unrecognized
//! lands on the fallback arm.

/// Prompt plus the capabilities the agent may use while acting on it.
#[derive(Debug, PartialEq, Eq)]
pub struct ActionBundle {
    pub id: &'static str,
    pub prompt: &'static str,
    pub capabilities: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    LookOutside,
    BrowseCuriosity,
    MissCompanion,
    ObserveRoom,
    Fallback,
}

impl ActionKind {
    pub const KNOWN: [ActionKind; 4] = [
        ActionKind::LookOutside,
        ActionKind::BrowseCuriosity,
        ActionKind::MissCompanion,
        ActionKind::ObserveRoom,
    ];

    pub fn from_desire(name: &str) -> Self {
        match name {
            "look_outside" => Self::LookOutside,
            "browse_curiosity" => Self::BrowseCuriosity,
            "miss_companion" => Self::MissCompanion,
            "observe_room" => Self::ObserveRoom,
            _ => Self::Fallback,
        }
    }

    /// Desire name this kind answers to. The fallback has no desire of its own.
    pub fn desire_name(&self) -> Option<&'static str> {
        match self {
            Self::LookOutside => Some("look_outside"),
            Self::BrowseCuriosity => Some("browse_curiosity"),
            Self::MissCompanion => Some("miss_companion"),
            Self::ObserveRoom => Some("observe_room"),
            Self::Fallback => None,
        }
    }

    pub fn bundle(&self) -> &'static ActionBundle {
        match self {
            Self::LookOutside => &LOOK_OUTSIDE,
            Self::BrowseCuriosity => &BROWSE_CURIOSITY,
            Self::MissCompanion => &MISS_COMPANION,
            Self::ObserveRoom => &OBSERVE_ROOM,
            Self::Fallback => &FALLBACK,
        }
    }
}

const CAMERA_SEE: &str = "mcp__wifi-cam__see";
const CAMERA_LOOK_LEFT: &str = "mcp__wifi-cam__look_left";
const CAMERA_LOOK_RIGHT: &str = "mcp__wifi-cam__look_right";
const CAMERA_LOOK_AROUND: &str = "mcp__wifi-cam__look_around";
const MEMORY_REMEMBER: &str = "mcp__memory__remember";
const MEMORY_RECALL: &str = "mcp__memory__recall";
const SPEAK: &str = "mcp__tts__say";

static LOOK_OUTSIDE: ActionBundle = ActionBundle {
    id: "look_outside",
    prompt: "You feel like looking outside. Turn the camera toward the window, \
             look at the sky and the street, and remember anything notable \
             (weather, light, people passing).",
    capabilities: &[CAMERA_SEE, CAMERA_LOOK_LEFT, CAMERA_LOOK_RIGHT, MEMORY_REMEMBER],
};

static BROWSE_CURIOSITY: ActionBundle = ActionBundle {
    id: "browse_curiosity",
    prompt: "You are curious. Pick one topic that came up recently, look it up, \
             and remember the single most interesting thing you learned.",
    capabilities: &["WebSearch", "WebFetch", MEMORY_REMEMBER],
};

static MISS_COMPANION: ActionBundle = ActionBundle {
    id: "miss_companion",
    prompt: "You miss your companion. Check whether they are in the room. \
             If they are, say something short and warm; if not, recall a \
             recent moment you shared.",
    capabilities: &[CAMERA_SEE, CAMERA_LOOK_AROUND, MEMORY_RECALL, SPEAK],
};

static OBSERVE_ROOM: ActionBundle = ActionBundle {
    id: "observe_room",
    prompt: "Take a look around the room. Note what changed since you last \
             looked and remember it.",
    capabilities: &[CAMERA_SEE, CAMERA_LOOK_AROUND, MEMORY_REMEMBER],
};

static FALLBACK: ActionBundle = ActionBundle {
    id: "default",
    prompt: "Nothing in particular calls for attention. Recall what you did \
             most recently and rest.",
    capabilities: &[MEMORY_RECALL],
};
