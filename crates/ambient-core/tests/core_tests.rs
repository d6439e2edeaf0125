//! Tests for ambient-core: data model, desire records, snapshot store, errors

use ambient_core::store;
use ambient_core::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn sample(ts: &str, arousal: f64, mem_free: f64) -> Sample {
    Sample {
        ts: ts.into(),
        phase: "morning".into(),
        arousal,
        thermal: "cool".into(),
        mem_free,
        uptime_min: 42.0,
    }
}

fn snapshot_with(n: usize, marker: f64) -> StateSnapshot {
    let window: Vec<Sample> = (0..n)
        .map(|i| sample(&format!("2024-03-11T09:{:02}:00", i % 60), marker, marker))
        .collect();
    let mut trend = TrendMap::new();
    trend.insert("arousal".into(), Trend::Stable);
    trend.insert("mem_free".into(), Trend::Stable);
    StateSnapshot {
        now: window.last().cloned().unwrap(),
        trend,
        window,
    }
}

// ===========================================================================
// Wire format
// ===========================================================================

#[test]
fn snapshot_json_has_expected_keys() {
    let snap = snapshot_with(2, 50.0);
    let value = serde_json::to_value(&snap).unwrap();
    assert!(value["now"]["ts"].is_string());
    assert_eq!(value["trend"]["arousal"], "stable");
    assert_eq!(value["window"].as_array().unwrap().len(), 2);
    for key in ["ts", "phase", "arousal", "thermal", "mem_free", "uptime_min"] {
        assert!(value["now"].get(key).is_some(), "missing {key}");
    }
}

#[test]
fn snapshot_trend_of_missing_metric_is_unknown() {
    let mut snap = snapshot_with(1, 10.0);
    snap.trend.remove("mem_free");
    assert_eq!(snap.trend_of(Metric::MemFree), Trend::Unknown);
    assert_eq!(snap.trend_of(Metric::Arousal), Trend::Stable);
}

#[test]
fn desire_record_without_dominant_parses() {
    let record: DesireRecord = serde_json::from_str(r#"{"desires": {"observe_room": 0.3}}"#).unwrap();
    assert!(record.dominant.is_none());
    assert_eq!(record.level("observe_room"), Some(0.3));
}

#[test]
fn desire_record_from_levels_sets_dominant_key() {
    let mut levels = BTreeMap::new();
    levels.insert("browse_curiosity".to_string(), 0.4);
    levels.insert("miss_companion".to_string(), 0.9);
    let record = DesireRecord::from_levels(levels);
    let dominant = record.dominant.clone().unwrap();
    assert_eq!(dominant, "miss_companion");
    assert!(record.desires.contains_key(&dominant));
}

#[test]
fn desire_record_ranked_orders_by_level_then_name() {
    let mut levels = BTreeMap::new();
    levels.insert("b".to_string(), 0.5);
    levels.insert("a".to_string(), 0.5);
    levels.insert("c".to_string(), 0.9);
    let record = DesireRecord::from_levels(levels);
    let names: Vec<&str> = record.ranked().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

// ===========================================================================
// Atomic replace
// ===========================================================================

#[test]
fn concurrent_reader_never_sees_partial_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    store::write_snapshot(&path, &snapshot_with(1, 1.0)).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let path = path.clone();
        let done = done.clone();
        std::thread::spawn(move || {
            let mut reads = 0usize;
            while !done.load(Ordering::SeqCst) {
                let snap = store::read_snapshot(&path).expect("reader saw a torn snapshot");
                let marker = snap.now.arousal;
                assert!(snap.window.iter().all(|s| s.arousal == marker));
                reads += 1;
            }
            reads
        })
    };

    for i in 0..200 {
        // Alternate small and large documents so a torn write would be visible.
        let n = if i % 2 == 0 { 48 } else { 2 };
        store::write_snapshot(&path, &snapshot_with(n, i as f64)).unwrap();
    }
    done.store(true, Ordering::SeqCst);
    let reads = reader.join().unwrap();
    assert!(reads > 0);
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_display_and_missing_classification() {
    let e = Error::MissingState("/tmp/state.json".into());
    assert!(e.is_missing());
    assert!(e.to_string().contains("/tmp/state.json"));

    let e = Error::malformed("/tmp/state.json", "eof");
    assert!(!e.is_missing());
    assert!(e.to_string().contains("eof"));

    let io = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    assert!(io.is_missing());

    let e = Error::dispatch_failed("exit 2");
    assert_eq!(e.to_string(), "dispatch failed: exit 2");
}
