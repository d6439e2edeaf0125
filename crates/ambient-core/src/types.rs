//! Core data model: samples, trends, state snapshots, desire records

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wall-clock format used for every sample timestamp (seconds resolution, local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Desire name used when the desire record is unreadable or names nothing usable.
pub const FALLBACK_DESIRE: &str = "rest";

/// Current local time rendered in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a sample timestamp. Accepts the native format and RFC 3339 (offset is dropped).
pub fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(ts)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

// ============================================================
// Sample
// ============================================================

/// One reading of the agent's surroundings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub ts: String,
    pub phase: String,
    /// 0-100
    pub arousal: f64,
    pub thermal: String,
    /// Percent of memory available, 0-100.
    pub mem_free: f64,
    pub uptime_min: f64,
}

impl Sample {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Arousal => self.arousal,
            Metric::MemFree => self.mem_free,
        }
    }

    pub fn parsed_ts(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.ts)
    }
}

// ============================================================
// Trend
// ============================================================

/// Numeric metrics tracked for trend direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Arousal,
    MemFree,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Arousal, Metric::MemFree];

    /// Key used in the snapshot's `trend` object.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Arousal => "arousal",
            Self::MemFree => "mem_free",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    /// Any direction string this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl Trend {
    /// Classify a change against a deadband. A delta exactly at the deadband is stable.
    pub fn classify(oldest: f64, newest: f64, deadband: f64) -> Self {
        let delta = newest - oldest;
        if delta > deadband {
            Self::Rising
        } else if -delta > deadband {
            Self::Falling
        } else {
            Self::Stable
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Rising => "+",
            Self::Falling => "-",
            Self::Stable => "~",
            Self::Unknown => "?",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rising => write!(f, "rising"),
            Self::Falling => write!(f, "falling"),
            Self::Stable => write!(f, "stable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Metric key -> direction, as stored in the snapshot.
pub type TrendMap = BTreeMap<String, Trend>;

// ============================================================
// StateSnapshot
// ============================================================

/// The sampler's published view: latest sample, trend per metric, and the window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub now: Sample,
    pub trend: TrendMap,
    /// Oldest first.
    pub window: Vec<Sample>,
}

impl StateSnapshot {
    pub fn trend_of(&self, metric: Metric) -> Trend {
        self.trend
            .get(metric.key())
            .copied()
            .unwrap_or(Trend::Unknown)
    }
}

// ============================================================
// DesireRecord
// ============================================================

/// Desire levels owned by the external desire system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesireRecord {
    pub desires: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant: Option<String>,
}

impl DesireRecord {
    /// Build a record whose dominant is derived from the levels.
    pub fn from_levels(desires: BTreeMap<String, f64>) -> Self {
        let dominant = Some(Self::compute_dominant(&desires).to_string());
        Self { desires, dominant }
    }

    /// Highest level wins; ties go to the lexicographically smallest name.
    /// Empty mappings yield [`FALLBACK_DESIRE`].
    pub fn compute_dominant(desires: &BTreeMap<String, f64>) -> &str {
        let mut best: Option<(&str, f64)> = None;
        // BTreeMap iterates in name order, so a strict `>` keeps the first name on ties.
        for (name, &level) in desires {
            match best {
                Some((_, top)) if level <= top => {}
                _ => best = Some((name.as_str(), level)),
            }
        }
        best.map(|(name, _)| name).unwrap_or(FALLBACK_DESIRE)
    }

    pub fn level(&self, name: &str) -> Option<f64> {
        self.desires.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.desires.is_empty()
    }

    /// Desires ordered by level descending, then name.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .desires
            .iter()
            .map(|(name, &level)| (name.as_str(), level))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundary_is_stable() {
        assert_eq!(Trend::classify(50.0, 55.0, 5.0), Trend::Stable);
        assert_eq!(Trend::classify(55.0, 50.0, 5.0), Trend::Stable);
        assert_eq!(Trend::classify(50.0, 55.5, 5.0), Trend::Rising);
        assert_eq!(Trend::classify(55.5, 50.0, 5.0), Trend::Falling);
    }

    #[test]
    fn unknown_trend_string_deserializes() {
        let t: Trend = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(t, Trend::Unknown);
        assert_eq!(t.arrow(), "?");
    }

    #[test]
    fn dominant_tie_breaks_by_name() {
        let mut levels = BTreeMap::new();
        levels.insert("observe_room".to_string(), 0.6);
        levels.insert("look_outside".to_string(), 0.6);
        levels.insert("miss_companion".to_string(), 0.2);
        assert_eq!(DesireRecord::compute_dominant(&levels), "look_outside");
    }

    #[test]
    fn dominant_of_empty_is_fallback() {
        assert_eq!(DesireRecord::compute_dominant(&BTreeMap::new()), FALLBACK_DESIRE);
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let dt = parse_timestamp("2024-03-11T09:15:30+09:00").unwrap();
        assert_eq!(dt.format(TIMESTAMP_FORMAT).to_string(), "2024-03-11T09:15:30");
        assert!(parse_timestamp("2024-03-11 09:15:30").is_none());
    }
}
