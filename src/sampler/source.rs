use std::collections::VecDeque;

use ambient_core::{now_timestamp, Error, Result, Sample};
use chrono::{Local, Timelike};
use sysinfo::{Components, System};

/// Producer of one reading per tick. A failed reading skips the tick.
pub trait SampleSource {
    fn sample(&mut self) -> Result<Sample>;
}

/// Reads memory, uptime, load and temperature sensors from the host.
pub struct SystemSource {
    system: System,
    components: Components,
}

impl SystemSource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            components: Components::new_with_refreshed_list(),
        }
    }

    fn max_temperature(&mut self) -> Option<f32> {
        self.components.refresh();
        self.components
            .list()
            .iter()
            .map(|c| c.temperature())
            .filter(|t| t.is_finite() && *t > 0.0)
            .reduce(f32::max)
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SystemSource {
    fn sample(&mut self) -> Result<Sample> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(Error::sample_unavailable("total memory reported as zero"));
        }
        let mem_free = self.system.available_memory() as f64 / total as f64 * 100.0;

        let hour = Local::now().hour();
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let load = System::load_average().one / cpus as f64;

        Ok(Sample {
            ts: now_timestamp(),
            phase: phase_for_hour(hour).to_string(),
            arousal: arousal_for(hour, load),
            thermal: thermal_label(self.max_temperature()).to_string(),
            mem_free: round1(mem_free.clamp(0.0, 100.0)),
            uptime_min: (System::uptime() / 60) as f64,
        })
    }
}

pub fn phase_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=10 => "morning",
        11..=16 => "day",
        17..=21 => "evening",
        _ => "night",
    }
}

/// Circadian base for the phase, lifted by per-CPU load.
pub fn arousal_for(hour: u32, load_per_cpu: f64) -> f64 {
    let base = match phase_for_hour(hour) {
        "morning" => 60.0,
        "day" => 70.0,
        "evening" => 50.0,
        _ => 20.0,
    };
    let load = if load_per_cpu.is_finite() { load_per_cpu.max(0.0) } else { 0.0 };
    round1((base + load * 30.0).clamp(0.0, 100.0))
}

pub fn thermal_label(max_celsius: Option<f32>) -> &'static str {
    match max_celsius {
        None => "unknown",
        Some(t) if t < 50.0 => "cool",
        Some(t) if t < 70.0 => "warm",
        Some(t) if t < 85.0 => "hot",
        Some(_) => "critical",
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Replays a fixed sequence of readings; `None` entries fail like a dead sensor.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    readings: VecDeque<Option<Sample>>,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = Option<Sample>>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }
}

impl SampleSource for ScriptedSource {
    fn sample(&mut self) -> Result<Sample> {
        match self.readings.pop_front() {
            Some(Some(sample)) => Ok(sample),
            Some(None) => Err(Error::sample_unavailable("scripted failure")),
            None => Err(Error::sample_unavailable("script exhausted")),
        }
    }
}
