//! ambient-act - act on the dominant desire
//!
//! One invocation = one ActionSelector run = at most one dispatch to the agent.
//! Exits non-zero when the dispatch itself failed so the scheduler can see it.

use std::path::PathBuf;
use std::sync::Arc;

use ambient::action::{ActionSelector, AgentExecutor, CliExecutor, DryRunExecutor, RunLog, RunOutcome};
use ambient::cli::{self, ProfileArgs};
use ambient_core::config::expand_tilde;
use ambient_core::now_timestamp;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ambient-act",
    about = "Dispatch the action bundle for the dominant desire",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(flatten)]
    profile: ProfileArgs,

    /// Desire record path (overrides paths.desires_file)
    #[arg(long)]
    desires: Option<String>,

    /// Run log path (overrides paths.run_log)
    #[arg(long)]
    run_log: Option<String>,

    /// Agent program (overrides action.agent_program)
    #[arg(long)]
    agent: Option<String>,

    /// Skip dispatch when the dominant level is below this (overrides action.min_level)
    #[arg(long)]
    min_level: Option<f64>,

    /// Log the bundle instead of running the agent
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.profile.dump_if_requested() {
        return Ok(());
    }
    cli::init_tracing("ambient=info");

    let config = cli.profile.load();
    let desires_path = cli::path_or(cli.desires.as_deref(), config.desires_path());
    let run_log_path = cli::path_or(cli.run_log.as_deref(), config.run_log_path());
    let min_level = cli.min_level.unwrap_or(config.action.min_level);

    let executor: Arc<dyn AgentExecutor> = if cli.dry_run || config.action.dry_run {
        Arc::new(DryRunExecutor)
    } else {
        let program = cli.agent.unwrap_or_else(|| config.action.agent_program.clone());
        let workdir: Option<PathBuf> = config.action.workdir.as_deref().map(expand_tilde);
        Arc::new(
            CliExecutor::new(program)
                .with_args(config.action.agent_args.clone())
                .with_workdir(workdir),
        )
    };

    let run_log = RunLog::new(run_log_path, now_timestamp());
    let outcome = ActionSelector::new(desires_path, executor, run_log)
        .with_min_level(min_level)
        .run()
        .await;

    match outcome {
        RunOutcome::Dispatched { succeeded: false, detail, .. } => anyhow::bail!(detail),
        RunOutcome::Dispatched { desire, bundle, .. } => {
            tracing::info!("run complete: {} -> {}", desire, bundle);
        }
        RunOutcome::Skipped { desire, reason } => {
            tracing::info!("run skipped: {} ({})", desire, reason);
        }
    }
    Ok(())
}
