//! ambient-context - print one line of ambient state for session context injection
//!
//! Always prints exactly one line on stdout and exits 0, even when the arguments
//! don't parse. Diagnostics go to stderr.

use ambient::cli::{self, ProfileArgs};
use ambient::context::{self, ContextOptions};
use chrono::Local;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ambient-context",
    about = "Print the current ambient state as a single context line",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(flatten)]
    profile: ProfileArgs,

    /// State snapshot path (overrides paths.state_file)
    #[arg(long)]
    state: Option<String>,

    /// Desire record path (overrides paths.desires_file)
    #[arg(long)]
    desires: Option<String>,

    /// Leave the desire segment out
    #[arg(long, default_value_t = false)]
    no_desires: bool,
}

fn main() {
    // A bad flag must not cost the caller its context line.
    let cli: Cli = cli::parse_or_default(std::env::args());
    if cli.profile.dump_if_requested() {
        return;
    }
    cli::init_tracing("ambient=warn");

    let config = cli.profile.load();
    let state_path = cli::path_or(cli.state.as_deref(), config.state_path());
    let desires_path = cli::path_or(cli.desires.as_deref(), config.desires_path());
    let opts = ContextOptions {
        alert_threshold: config.context.desire_alert_threshold,
    };

    let line = context::render(
        &state_path,
        (!cli.no_desires).then_some(desires_path.as_path()),
        &opts,
        Local::now().naive_local(),
    );
    println!("{line}");
}
