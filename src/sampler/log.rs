//! One-line JSON tick events on stderr, for schedulers that grep tick outcomes.

use std::path::Path;
use std::time::Duration;

use ambient_core::{Error, StateSnapshot, TrendMap};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TickEvent<'a> {
    SamplerStarted {
        path: String,
        interval_secs: u64,
        window_capacity: usize,
    },
    TickWritten {
        path: String,
        sample_ts: &'a str,
        samples: usize,
        trend: &'a TrendMap,
    },
    TickSkipped {
        path: String,
        reason: &'static str,
        error: String,
    },
}

impl TickEvent<'_> {
    pub fn level(&self) -> &'static str {
        match self {
            Self::TickSkipped { .. } => "warn",
            _ => "info",
        }
    }
}

#[derive(Serialize)]
struct Line<'a> {
    ts: String,
    level: &'static str,
    #[serde(flatten)]
    event: &'a TickEvent<'a>,
}

fn emit(event: &TickEvent<'_>) {
    let line = Line {
        ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        level: event.level(),
        event,
    };
    if let Ok(json) = serde_json::to_string(&line) {
        eprintln!("{json}");
    }
}

fn skip_reason(error: &Error) -> &'static str {
    match error {
        Error::SampleUnavailable(_) => "sample_unavailable",
        _ => "write_failed",
    }
}

pub fn tick_written(path: &Path, snap: &StateSnapshot) {
    emit(&TickEvent::TickWritten {
        path: path.display().to_string(),
        sample_ts: &snap.now.ts,
        samples: snap.window.len(),
        trend: &snap.trend,
    });
}

pub fn tick_skipped(path: &Path, error: &Error) {
    emit(&TickEvent::TickSkipped {
        path: path.display().to_string(),
        reason: skip_reason(error),
        error: error.to_string(),
    });
}

pub fn loop_started(path: &Path, interval: Duration, capacity: usize) {
    emit(&TickEvent::SamplerStarted {
        path: path.display().to_string(),
        interval_secs: interval.as_secs(),
        window_capacity: capacity,
    });
}
