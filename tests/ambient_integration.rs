//! Integration tests: the three processes talking through a profile directory.
//!
//! Each test builds a throwaway profile, runs sampler ticks with a scripted
//! source, renders the context line, and drives the action selector against
//! a recording executor.

use std::path::Path;
use std::sync::{Arc, Mutex};

use ambient::action::{ActionSelector, AgentExecutor, DispatchReport, RunLog, RunOutcome};
use ambient::context::{self, ContextOptions, NOT_RUNNING_MARKER, UNREADABLE_MARKER};
use ambient::sampler::{Sampler, ScriptedSource};
use ambient_core::config::SamplerConfig;
use ambient_core::{store, Sample, Trend, FALLBACK_DESIRE};
use chrono::NaiveDateTime;
use tempfile::TempDir;

fn sample(ts: &str, arousal: f64, mem_free: f64) -> Sample {
    Sample {
        ts: ts.into(),
        phase: "morning".into(),
        arousal,
        thermal: "cool".into(),
        mem_free,
        uptime_min: 135.0,
    }
}

fn wall_clock() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-01-03T22:04:05", "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn write_state(dir: &Path, readings: Vec<Sample>) -> std::path::PathBuf {
    let path = dir.join("state.json");
    let mut sampler = Sampler::new(&path, &SamplerConfig::default());
    let mut src = ScriptedSource::new(readings.into_iter().map(Some));
    while sampler.tick(&mut src).is_ok() {}
    path
}

#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait::async_trait]
impl AgentExecutor for RecordingExecutor {
    fn name(&self) -> &str {
        "recording"
    }

    async fn execute(&self, prompt: &str, capabilities: &[&str]) -> ambient_core::Result<DispatchReport> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.into(), capabilities.iter().map(|c| c.to_string()).collect()));
        Ok(DispatchReport {
            exit_code: Some(0),
            output_tail: String::new(),
        })
    }
}

// ===========================================================================
// Sampler -> snapshot
// ===========================================================================

#[test]
fn ticks_build_window_and_trend() {
    let dir = TempDir::new().unwrap();
    let path = write_state(
        dir.path(),
        vec![
            sample("2024-03-11T09:00:00", 40.0, 60.0),
            sample("2024-03-11T09:05:00", 50.0, 58.0),
            sample("2024-03-11T09:10:00", 62.0, 52.0),
        ],
    );
    let snap = store::read_snapshot(&path).unwrap();
    assert_eq!(snap.window.len(), 3);
    assert_eq!(snap.now.ts, "2024-03-11T09:10:00");
    assert_eq!(snap.trend["arousal"], Trend::Rising);
    assert_eq!(snap.trend["mem_free"], Trend::Falling);
}

// ===========================================================================
// Context line
// ===========================================================================

#[test]
fn context_line_for_known_timestamp() {
    let dir = TempDir::new().unwrap();
    let state = write_state(
        dir.path(),
        vec![
            sample("2024-03-11T09:10:30", 60.0, 50.0),
            sample("2024-03-11T09:15:30", 62.0, 48.0),
        ],
    );
    let line = context::render(&state, None, &ContextOptions::default(), wall_clock());
    assert_eq!(
        line,
        "[ambient] time=09:15:30 day=Mon phase=morning arousal=62(~) thermal=cool mem=48%(~) uptime=135m samples=2"
    );
}

#[test]
fn context_without_state_uses_wall_clock() {
    let dir = TempDir::new().unwrap();
    let line = context::render(
        &dir.path().join("state.json"),
        Some(&dir.path().join("desires.json")),
        &ContextOptions::default(),
        wall_clock(),
    );
    assert!(line.contains(NOT_RUNNING_MARKER));
    assert_eq!(
        line,
        "[ambient] time=22:04:05 day=Fri date=2025-01-03 (sampler not running)"
    );
    assert!(!line.contains('\n'));
}

#[test]
fn context_with_corrupt_state_still_emits_a_line() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(&state, "{\"now\": {\"ts\": ").unwrap();
    let line = context::render(&state, None, &ContextOptions::default(), wall_clock());
    assert!(line.contains(UNREADABLE_MARKER));
    assert!(line.starts_with("[ambient] time=22:04:05"));

    std::fs::write(&state, "[1, 2, 3]").unwrap();
    let line = context::render(&state, None, &ContextOptions::default(), wall_clock());
    assert!(line.contains(UNREADABLE_MARKER));
}

#[test]
fn corrupt_state_still_carries_desires() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(&state, "not json at all").unwrap();
    let desires = dir.path().join("desires.json");
    std::fs::write(&desires, r#"{"desires": {"miss_companion": 0.9, "look_outside": 0.2}}"#).unwrap();

    let line = context::render(&state, Some(&desires), &ContextOptions::default(), wall_clock());
    assert_eq!(
        line,
        "[ambient] time=22:04:05 day=Fri date=2025-01-03 (state unreadable) | desires: companion=0.90(!) outside=0.20"
    );
}

#[test]
fn context_includes_desire_segment() {
    let dir = TempDir::new().unwrap();
    let state = write_state(dir.path(), vec![sample("2024-03-11T09:15:30", 62.0, 48.0)]);
    let desires = dir.path().join("desires.json");
    std::fs::write(&desires, r#"{"desires": {"look_outside": 0.8}, "dominant": "look_outside"}"#).unwrap();

    let line = context::render(&state, Some(&desires), &ContextOptions::default(), wall_clock());
    assert!(line.contains("outside=0.80(!)"), "{line}");
    assert!(line.ends_with(" | desires: outside=0.80(!)"), "{line}");
}

#[test]
fn malformed_or_missing_desires_match_no_desires() {
    let dir = TempDir::new().unwrap();
    let state = write_state(dir.path(), vec![sample("2024-03-11T09:15:30", 62.0, 48.0)]);
    let opts = ContextOptions::default();
    let baseline = context::render(&state, None, &opts, wall_clock());

    let missing = dir.path().join("missing.json");
    assert_eq!(context::render(&state, Some(&missing), &opts, wall_clock()), baseline);

    let malformed = dir.path().join("desires.json");
    for body in ["not json", r#"{"desires": {"look_outside": "high"}}"#, r#"{"desires": {}}"#] {
        std::fs::write(&malformed, body).unwrap();
        assert_eq!(context::render(&state, Some(&malformed), &opts, wall_clock()), baseline, "{body}");
    }
}

// ===========================================================================
// Action selector
// ===========================================================================

#[tokio::test]
async fn unknown_dominant_dispatches_fallback_once() {
    let dir = TempDir::new().unwrap();
    let desires = dir.path().join("desires.json");
    std::fs::write(&desires, r#"{"desires": {"unknown_desire_xyz": 0.9}, "dominant": "unknown_desire_xyz"}"#).unwrap();
    let log_path = dir.path().join("action.log");

    let exec = Arc::new(RecordingExecutor::default());
    let outcome = ActionSelector::new(&desires, exec.clone(), RunLog::new(&log_path, "2024-03-11T09:15:30"))
        .run()
        .await;

    match outcome {
        RunOutcome::Dispatched { desire, bundle, succeeded, .. } => {
            assert_eq!(desire, FALLBACK_DESIRE);
            assert_eq!(bundle, "default");
            assert!(succeeded);
        }
        other => panic!("expected dispatch, got {other:?}"),
    }
    assert_eq!(exec.calls.lock().unwrap().len(), 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("=== run 2024-03-11T09:15:30 ==="));
    assert!(log.contains("dominant=rest"));
    assert!(log.contains("bundle=default"));
    assert!(log.contains("dispatch start"));
    assert!(log.contains("dispatch end status=ok"));
}

#[tokio::test]
async fn known_dominant_passes_its_allow_list() {
    let dir = TempDir::new().unwrap();
    let desires = dir.path().join("desires.json");
    std::fs::write(
        &desires,
        r#"{"desires": {"browse_curiosity": 0.75, "look_outside": 0.3}, "dominant": "browse_curiosity"}"#,
    )
    .unwrap();

    let exec = Arc::new(RecordingExecutor::default());
    ActionSelector::new(&desires, exec.clone(), RunLog::new(dir.path().join("action.log"), "t"))
        .run()
        .await;

    let calls = exec.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.contains(&"WebSearch".to_string()));
}

#[tokio::test]
async fn unwritable_run_log_does_not_block_dispatch() {
    let dir = TempDir::new().unwrap();
    let exec = Arc::new(RecordingExecutor::default());
    // The run log path is a directory, so every append fails.
    let outcome = ActionSelector::new(dir.path().join("absent.json"), exec.clone(), RunLog::new(dir.path(), "t"))
        .run()
        .await;
    assert!(matches!(outcome, RunOutcome::Dispatched { succeeded: true, .. }));
    assert_eq!(exec.calls.lock().unwrap().len(), 1);
}
