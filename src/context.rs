//! Context line - one line of ambient state for injection into an interactive session
//!
//! Reads the sampler's snapshot and, best-effort, the desire record. Always
//! produces a line: an absent snapshot yields a wall-clock fallback, a
//! malformed one degrades field by field, and desire failures drop the
//! desire segment silently.

use std::path::Path;

use ambient_core::{store, DesireRecord, Error, Metric, Trend};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const LINE_PREFIX: &str = "[ambient]";
pub const NOT_RUNNING_MARKER: &str = "(sampler not running)";
pub const UNREADABLE_MARKER: &str = "(state unreadable)";
/// Rendered for any field that is missing or not of the expected shape.
pub const UNKNOWN: &str = "?";

#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Desires at or above this level get a `(!)` marker.
    pub alert_threshold: f64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            alert_threshold: ambient_core::config::DEFAULT_ALERT_THRESHOLD,
        }
    }
}

/// Weekday derived from a timestamp's date portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Parsed(chrono::Weekday),
    Unknown,
}

impl DayOfWeek {
    pub fn abbrev(&self) -> String {
        match self {
            Self::Parsed(day) => day.to_string(),
            Self::Unknown => UNKNOWN.to_string(),
        }
    }
}

/// Split `YYYY-MM-DDTHH:MM:SS[...]` into a time of day and a weekday.
/// Without a `T` separator or with an unparsable date, both degrade.
pub fn split_timestamp(ts: &str) -> (String, DayOfWeek) {
    let Some((date, rest)) = ts.split_once('T') else {
        return (UNKNOWN.to_string(), DayOfWeek::Unknown);
    };
    let time: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let time = if time.is_empty() { UNKNOWN.to_string() } else { time };
    let day = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => DayOfWeek::Parsed(chrono::Datelike::weekday(&d)),
        Err(_) => DayOfWeek::Unknown,
    };
    (time, day)
}

// ============================================================
// Desire segment
// ============================================================

/// Collapse whitespace runs to `_` so a value stays one token on one line.
/// All-whitespace input becomes [`UNKNOWN`].
fn single_token(s: &str) -> String {
    let token = s.split_whitespace().collect::<Vec<_>>().join("_");
    if token.is_empty() {
        UNKNOWN.to_string()
    } else {
        token
    }
}

/// Short names for the desires the context line knows about.
pub fn abbreviate(name: &str) -> &str {
    match name {
        "look_outside" => "outside",
        "browse_curiosity" => "curiosity",
        "miss_companion" => "companion",
        "observe_room" => "room",
        other => other,
    }
}

/// `desires: a=0.80(!) b=0.30`, or `None` for an empty record.
pub fn desire_segment(record: &DesireRecord, threshold: f64) -> Option<String> {
    if record.is_empty() {
        return None;
    }
    let pairs: Vec<String> = record
        .ranked()
        .into_iter()
        .map(|(name, level)| {
            let mark = if level >= threshold { "(!)" } else { "" };
            format!("{}={:.2}{}", single_token(abbreviate(name)), level, mark)
        })
        .collect();
    Some(format!("desires: {}", pairs.join(" ")))
}

/// Read the desire record and render its segment. Every failure is `None`.
pub fn load_desire_segment(path: &Path, threshold: f64) -> Option<String> {
    store::read_desires(path).and_then(|record| desire_segment(&record, threshold))
}

// ============================================================
// State line
// ============================================================

fn text_field(obj: Option<&Value>, key: &str) -> String {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(single_token)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn number_field(obj: Option<&Value>, key: &str) -> Option<f64> {
    obj.and_then(|o| o.get(key)).and_then(Value::as_f64)
}

fn arrow(snapshot: &Value, metric: Metric) -> &'static str {
    snapshot
        .get("trend")
        .and_then(|t| t.get(metric.key()))
        .and_then(|v| serde_json::from_value::<Trend>(v.clone()).ok())
        .unwrap_or(Trend::Unknown)
        .arrow()
}

fn number_or_unknown(v: Option<f64>, suffix: &str) -> String {
    match v {
        Some(n) => format!("{:.0}{}", n, suffix),
        None => UNKNOWN.to_string(),
    }
}

/// Render a parsed snapshot document. Missing or ill-typed fields become `?`.
pub fn format_state_line(snapshot: &Value) -> String {
    let now = snapshot.get("now").filter(|v| v.is_object());
    let ts = now
        .and_then(|n| n.get("ts"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let (time, day) = split_timestamp(ts);
    let samples = snapshot
        .get("window")
        .and_then(Value::as_array)
        .map(|w| w.len().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    format!(
        "{} time={} day={} phase={} arousal={}({}) thermal={} mem={}({}) uptime={} samples={}",
        LINE_PREFIX,
        time,
        day.abbrev(),
        text_field(now, "phase"),
        number_or_unknown(number_field(now, "arousal"), ""),
        arrow(snapshot, Metric::Arousal),
        text_field(now, "thermal"),
        number_or_unknown(number_field(now, "mem_free"), "%"),
        arrow(snapshot, Metric::MemFree),
        number_or_unknown(number_field(now, "uptime_min"), "m"),
        samples,
    )
}

/// Wall-clock line used when no snapshot can be shown.
pub fn format_fallback_line(now: NaiveDateTime, marker: &str) -> String {
    format!(
        "{} time={} day={} date={} {}",
        LINE_PREFIX,
        now.format("%H:%M:%S"),
        now.format("%a"),
        now.format("%Y-%m-%d"),
        marker
    )
}

fn read_snapshot_value(path: &Path) -> ambient_core::Result<Value> {
    let value: Value = store::read_json(path)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(Error::malformed(path, "snapshot is not a JSON object"))
    }
}

/// Build the full context line. Never fails; diagnostics go to the tracing
/// subscriber (stderr), never into the returned line.
pub fn render(state_path: &Path, desires_path: Option<&Path>, opts: &ContextOptions, now: NaiveDateTime) -> String {
    let base = match read_snapshot_value(state_path) {
        Ok(snapshot) => format_state_line(&snapshot),
        Err(e) if e.is_missing() => format_fallback_line(now, NOT_RUNNING_MARKER),
        Err(e) => {
            tracing::warn!("ambient state unreadable: {}", e);
            format_fallback_line(now, UNREADABLE_MARKER)
        }
    };

    match desires_path.and_then(|p| load_desire_segment(p, opts.alert_threshold)) {
        Some(segment) => format!("{} | {}", base, segment),
        None => base,
    }
}
