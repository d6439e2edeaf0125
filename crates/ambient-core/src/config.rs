//! Ambient monitor configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// File locations.
    pub paths: PathConfig,
    /// Sampling window and trend parameters.
    pub sampler: SamplerConfig,
    /// Context line parameters.
    pub context: ContextConfig,
    /// Action dispatch parameters.
    pub action: ActionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Root of the agent's working profile. `~/` is expanded.
    pub profile_dir: String,
    /// State snapshot, relative to the profile unless absolute.
    pub state_file: String,
    /// Desire record written by the desire system.
    pub desires_file: String,
    /// Append-only action run log.
    pub run_log: String,
    /// Directory for rolling sampler logs in loop mode.
    pub log_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of samples kept in the window (K).
    pub window_capacity: usize,
    /// Minimum change, in metric points, before a trend leaves "stable".
    pub deadband: f64,
    /// Tick cadence for `--loop` mode.
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Desire level at or above which the context line marks it `(!)`.
    pub desire_alert_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Agent CLI invoked with the bundle prompt.
    pub agent_program: String,
    /// Extra arguments placed before the prompt flags.
    pub agent_args: Vec<String>,
    /// Working directory for the agent process.
    pub workdir: Option<String>,
    /// Dominant levels below this are skipped instead of dispatched.
    pub min_level: f64,
    /// Log the dispatch instead of running the agent.
    pub dry_run: bool,
}

// ============================================================
// Defaults
// ============================================================

pub const DEFAULT_WINDOW_CAPACITY: usize = 12;
pub const DEFAULT_DEADBAND: f64 = 5.0;
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.7;

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            profile_dir: "~/.ambient".into(),
            state_file: "state.json".into(),
            desires_file: "desires.json".into(),
            run_log: "action.log".into(),
            log_dir: "logs".into(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            deadband: DEFAULT_DEADBAND,
            interval_secs: 300,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            desire_alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            agent_program: "claude".into(),
            agent_args: Vec::new(),
            workdir: None,
            min_level: 0.0,
            dry_run: false,
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl AmbientConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!("No config at {} - using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        if config.sampler.window_capacity == 0 {
            tracing::warn!("sampler.window_capacity must be positive - using {}", DEFAULT_WINDOW_CAPACITY);
            config.sampler.window_capacity = DEFAULT_WINDOW_CAPACITY;
        }
        if config.sampler.deadband.is_nan() || config.sampler.deadband < 0.0 {
            tracing::warn!("sampler.deadband must be non-negative - using {}", DEFAULT_DEADBAND);
            config.sampler.deadband = DEFAULT_DEADBAND;
        }
        Ok(config)
    }

    /// Render the config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn profile_dir(&self) -> PathBuf {
        expand_tilde(&self.paths.profile_dir)
    }

    pub fn state_path(&self) -> PathBuf {
        self.resolve(&self.paths.state_file)
    }

    pub fn desires_path(&self) -> PathBuf {
        self.resolve(&self.paths.desires_file)
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.resolve(&self.paths.run_log)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.paths.log_dir)
    }

    /// Default config location for a profile directory.
    pub fn default_path(profile_dir: &Path) -> PathBuf {
        profile_dir.join("ambient.toml")
    }

    fn resolve(&self, entry: &str) -> PathBuf {
        let path = expand_tilde(entry);
        if path.is_absolute() {
            path
        } else {
            self.profile_dir().join(path)
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
