use std::path::{Path, PathBuf};
use std::time::Duration;

use ambient_core::config::SamplerConfig;
use ambient_core::{store, Error, Result, StateSnapshot};

use super::log;
use super::source::SampleSource;
use super::window::TrendWindow;

/// Owns the window and the snapshot file. Single writer.
pub struct Sampler {
    state_path: PathBuf,
    window: TrendWindow,
    deadband: f64,
}

impl Sampler {
    /// Start from an empty window.
    pub fn new(state_path: impl Into<PathBuf>, config: &SamplerConfig) -> Self {
        Self {
            state_path: state_path.into(),
            window: TrendWindow::new(config.window_capacity),
            deadband: config.deadband,
        }
    }

    /// Start from the window persisted by the previous tick, if it can be read.
    pub fn rehydrate(state_path: impl Into<PathBuf>, config: &SamplerConfig) -> Self {
        let mut sampler = Self::new(state_path, config);
        match store::read_snapshot(&sampler.state_path) {
            Ok(prev) => {
                sampler.window = TrendWindow::from_samples(config.window_capacity, prev.window);
                tracing::debug!("Rehydrated {} samples", sampler.window.len());
            }
            Err(e) if e.is_missing() => {
                tracing::debug!("No previous snapshot at {}", sampler.state_path.display());
            }
            Err(e) => {
                tracing::warn!("Previous snapshot unusable, starting empty window: {}", e);
            }
        }
        sampler
    }

    /// Sample -> push -> trend -> atomic write. On any failure the snapshot
    /// already on disk is left untouched.
    pub fn tick(&mut self, source: &mut dyn SampleSource) -> Result<StateSnapshot> {
        let result = self.try_tick(source);
        match &result {
            Ok(snap) => log::tick_written(&self.state_path, snap),
            Err(e) => log::tick_skipped(&self.state_path, e),
        }
        result
    }

    fn try_tick(&mut self, source: &mut dyn SampleSource) -> Result<StateSnapshot> {
        let sample = source.sample()?;

        // Only committed once the snapshot is on disk.
        let mut window = self.window.clone();
        window.push_or_restart(sample.clone());

        let snapshot = StateSnapshot {
            now: sample,
            trend: window.trends(self.deadband),
            window: window.to_vec(),
        };
        store::write_snapshot(&self.state_path, &snapshot)?;
        self.window = window;
        Ok(snapshot)
    }

    pub fn window(&self) -> &TrendWindow {
        &self.window
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }
}

/// Tick on a fixed cadence until interrupted. Skipped ticks are logged and
/// the loop carries on.
pub async fn run_loop(
    mut sampler: Sampler,
    mut source: Box<dyn SampleSource + Send>,
    interval: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    log::loop_started(sampler.state_path(), interval, sampler.window().capacity());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Errors are already logged by tick().
                let _ = sampler.tick(source.as_mut());
            }
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(Error::Io)?;
                tracing::info!("Sampler loop interrupted");
                return Ok(());
            }
        }
    }
}
