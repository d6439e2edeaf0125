//! ActionSelector - one run picks the dominant desire and dispatches exactly one bundle
//!
//! Idle -> Selecting -> Dispatching -> Done, or Selecting -> Done on an explicit skip.
//! The dispatch result is recorded, never fed back into the desire record.

use std::path::PathBuf;
use std::sync::Arc;

use ambient_core::{store, DesireRecord, FALLBACK_DESIRE};
use tracing::{info, warn};

use super::bundle::ActionKind;
use super::dispatch::AgentExecutor;
use super::runlog::RunLog;

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorState {
    Idle,
    Selecting,
    Dispatching { desire: String, kind: ActionKind },
    Done(RunOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Dispatched {
        desire: String,
        bundle: &'static str,
        succeeded: bool,
        detail: String,
    },
    Skipped {
        desire: String,
        reason: String,
    },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Dispatched { succeeded: false, .. })
    }
}

/// The desire a run acts on, after fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub desire: String,
    pub kind: ActionKind,
    pub level: Option<f64>,
    pub fell_back: bool,
}

/// Resolve the dominant desire. Unreadable records, a missing `dominant`,
/// and names with no bundle all resolve to [`FALLBACK_DESIRE`].
pub fn select(record: Option<&DesireRecord>) -> Selection {
    let dominant = record.and_then(|r| r.dominant.as_deref());
    match dominant {
        Some(name) if ActionKind::from_desire(name) != ActionKind::Fallback => Selection {
            desire: name.to_string(),
            kind: ActionKind::from_desire(name),
            level: record.and_then(|r| r.level(name)),
            fell_back: false,
        },
        _ => Selection {
            desire: FALLBACK_DESIRE.to_string(),
            kind: ActionKind::from_desire(FALLBACK_DESIRE),
            level: None,
            fell_back: true,
        },
    }
}

pub struct ActionSelector {
    desires_path: PathBuf,
    executor: Arc<dyn AgentExecutor>,
    run_log: RunLog,
    min_level: f64,
    state: SelectorState,
}

impl ActionSelector {
    pub fn new(desires_path: impl Into<PathBuf>, executor: Arc<dyn AgentExecutor>, run_log: RunLog) -> Self {
        Self {
            desires_path: desires_path.into(),
            executor,
            run_log,
            min_level: 0.0,
            state: SelectorState::Idle,
        }
    }

    /// Dominant levels strictly below this are skipped.
    pub fn with_min_level(mut self, min_level: f64) -> Self {
        self.min_level = min_level;
        self
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    /// Advance by one transition. A no-op once Done.
    pub async fn step(&mut self) {
        let next = match std::mem::replace(&mut self.state, SelectorState::Idle) {
            SelectorState::Idle => SelectorState::Selecting,
            SelectorState::Selecting => self.select_step(),
            SelectorState::Dispatching { desire, kind } => self.dispatch_step(desire, kind).await,
            done @ SelectorState::Done(_) => done,
        };
        self.state = next;
    }

    /// Drive the machine to Done and return the outcome.
    pub async fn run(mut self) -> RunOutcome {
        loop {
            if let SelectorState::Done(outcome) = &self.state {
                return outcome.clone();
            }
            self.step().await;
        }
    }

    fn select_step(&mut self) -> SelectorState {
        let record = store::read_desires(&self.desires_path);
        if record.is_none() {
            warn!("desire record unavailable at {}", self.desires_path.display());
        }
        let selection = select(record.as_ref());
        let bundle = selection.kind.bundle();

        info!(
            desire = %selection.desire,
            bundle = bundle.id,
            fell_back = selection.fell_back,
            "selected action"
        );
        let level = selection
            .level
            .map(|l| format!("{l:.2}"))
            .unwrap_or_else(|| "-".into());
        self.run_log.record(&format!(
            "dominant={} level={} fallback={}",
            selection.desire, level, selection.fell_back
        ));

        if let Some(level) = selection.level.filter(|l| *l < self.min_level) {
            let reason = format!("level {level:.2} below {:.2}", self.min_level);
            info!("skipping dispatch: {}", reason);
            self.run_log.record(&format!("skip {}", reason));
            return SelectorState::Done(RunOutcome::Skipped {
                desire: selection.desire,
                reason,
            });
        }

        self.run_log.record(&format!("bundle={}", bundle.id));
        SelectorState::Dispatching {
            desire: selection.desire,
            kind: selection.kind,
        }
    }

    async fn dispatch_step(&mut self, desire: String, kind: ActionKind) -> SelectorState {
        let bundle = kind.bundle();
        self.run_log.record(&format!(
            "dispatch start executor={} capabilities={}",
            self.executor.name(),
            bundle.capabilities.join(",")
        ));

        let result = self.executor.execute(bundle.prompt, bundle.capabilities).await;

        let (succeeded, detail) = match result {
            Ok(report) => {
                let code = report.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
                self.run_log.record(&format!("dispatch end status=ok exit={}", code));
                if !report.output_tail.is_empty() {
                    self.run_log.record(&format!("output: {}", report.output_tail.replace('\n', " ")));
                }
                info!(bundle = bundle.id, "dispatch finished");
                (true, report.output_tail)
            }
            Err(e) => {
                self.run_log.record(&format!("dispatch end status=failed error={}", e));
                warn!(bundle = bundle.id, "dispatch failed: {}", e);
                (false, e.to_string())
            }
        };

        SelectorState::Done(RunOutcome::Dispatched {
            desire,
            bundle: bundle.id,
            succeeded,
            detail,
        })
    }
}
