use std::cmp::Ordering;
use std::collections::VecDeque;

use ambient_core::{Error, Metric, Result, Sample, Trend, TrendMap};

/// Bounded, time-ordered buffer of recent samples. Oldest is evicted on overflow.
#[derive(Debug, Clone)]
pub struct TrendWindow {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl TrendWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild a window from persisted samples. Entries that would break time
    /// order are dropped, then only the newest `capacity` are kept.
    pub fn from_samples(capacity: usize, samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut window = Self::new(capacity);
        for sample in samples {
            if let Err(e) = window.push(sample) {
                tracing::debug!("Dropping persisted sample: {}", e);
            }
        }
        window
    }

    /// Append a sample, evicting the oldest at capacity. Rejects samples older
    /// than the newest one held.
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if let Some(newest) = self.samples.back() {
            if compare_ts(&sample, newest) == Ordering::Less {
                return Err(Error::OutOfOrderSample {
                    newest: newest.ts.clone(),
                    offered: sample.ts,
                });
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        Ok(())
    }

    /// Append a sample; a sample older than the newest one means the wall clock
    /// went back (DST fall-back, NTP step), so the window restarts from it.
    /// Returns true when the window was restarted.
    pub fn push_or_restart(&mut self, sample: Sample) -> bool {
        match self.push(sample.clone()) {
            Ok(()) => false,
            Err(e) => {
                tracing::warn!("Clock went back, restarting trend window: {}", e);
                self.samples.clear();
                self.samples.push_back(sample);
                true
            }
        }
    }

    /// Direction of one metric, oldest entry against newest.
    pub fn trend(&self, metric: Metric, deadband: f64) -> Trend {
        match (self.samples.front(), self.samples.back()) {
            (Some(oldest), Some(newest)) if self.samples.len() >= 2 => {
                Trend::classify(oldest.value(metric), newest.value(metric), deadband)
            }
            _ => Trend::Stable,
        }
    }

    pub fn trends(&self, deadband: f64) -> TrendMap {
        Metric::ALL
            .iter()
            .map(|&m| (m.key().to_string(), self.trend(m, deadband)))
            .collect()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }
}

/// Parsed comparison when both timestamps parse, lexical otherwise.
fn compare_ts(a: &Sample, b: &Sample) -> Ordering {
    match (a.parsed_ts(), b.parsed_ts()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.ts.cmp(&b.ts),
    }
}
