//! ambient-sampler - one sampling tick per invocation
//!
//! Usage:
//!   ambient-sampler                    → one tick: sample, update trend, replace state.json
//!   ambient-sampler --loop             → tick every sampler.interval_secs until Ctrl-C
//!   ambient-sampler --dump-config      → print default config

use std::time::Duration;

use ambient::cli::{self, ProfileArgs};
use ambient::sampler::{tick, Sampler, SystemSource};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ambient-sampler",
    about = "Sample ambient state and publish the trend snapshot",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(flatten)]
    profile: ProfileArgs,

    /// State snapshot path (overrides paths.state_file)
    #[arg(long)]
    state: Option<String>,

    /// Keep running and tick on an interval instead of exiting after one tick
    #[arg(long = "loop", default_value_t = false)]
    run_loop: bool,

    /// Tick interval in seconds for --loop (overrides sampler.interval_secs)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Window capacity K (overrides sampler.window_capacity)
    #[arg(long)]
    window: Option<usize>,

    /// Trend deadband in metric points (overrides sampler.deadband)
    #[arg(long)]
    deadband: Option<f64>,

    /// Print the written snapshot as JSON on stdout
    #[arg(long, default_value_t = false)]
    print: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.profile.dump_if_requested() {
        return Ok(());
    }

    let mut config = cli.profile.load();
    if let Some(k) = cli.window.filter(|k| *k > 0) {
        config.sampler.window_capacity = k;
    }
    if let Some(d) = cli.deadband.filter(|d| *d >= 0.0) {
        config.sampler.deadband = d;
    }
    if let Some(secs) = cli.interval_secs.filter(|s| *s > 0) {
        config.sampler.interval_secs = secs;
    }
    let state_path = cli::path_or(cli.state.as_deref(), config.state_path());

    if cli.run_loop {
        let _guard = cli::init_tracing_with_file("ambient=info", &config.log_dir(), "sampler.log");
        // In-process cadence keeps the window in memory after the first load.
        let sampler = Sampler::rehydrate(&state_path, &config.sampler);
        tick::run_loop(
            sampler,
            Box::new(SystemSource::new()),
            Duration::from_secs(config.sampler.interval_secs),
        )
        .await?;
        return Ok(());
    }

    cli::init_tracing("ambient=info");
    let mut sampler = Sampler::rehydrate(&state_path, &config.sampler);
    let snapshot = sampler.tick(&mut SystemSource::new())?;
    if cli.print {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
