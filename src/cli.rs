//! Pieces shared by the three binaries: profile/config flags and tracing setup.

use std::path::{Path, PathBuf};

use ambient_core::config::expand_tilde;
use ambient_core::AmbientConfig;
use clap::error::ErrorKind;
use clap::{Args, Parser};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Agent profile directory (overrides paths.profile_dir)
    #[arg(long, env = "AMBIENT_PROFILE")]
    pub profile: Option<String>,

    /// Path to config file (TOML). Default: <profile>/ambient.toml
    #[arg(long)]
    pub config: Option<String>,

    /// Dump default config as TOML and exit
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,
}

impl ProfileArgs {
    /// Load the config file, then apply `--profile`.
    pub fn load(&self) -> AmbientConfig {
        let profile = self
            .profile
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| AmbientConfig::default().profile_dir());
        let path = self
            .config
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| AmbientConfig::default_path(&profile));

        let mut config = AmbientConfig::load(&path);
        if let Some(p) = &self.profile {
            config.paths.profile_dir = p.clone();
        }
        config
    }

    /// Handles `--dump-config`. Returns true when the caller should exit.
    pub fn dump_if_requested(&self) -> bool {
        if self.dump_config {
            println!("{}", AmbientConfig::default().to_toml());
        }
        self.dump_config
    }
}

fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
}

/// Logs to stderr only; stdout stays reserved for the binary's real output.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Stderr plus a daily-rolling file under `log_dir`. Keep the guard alive
/// for the life of the process or buffered lines are lost.
pub fn init_tracing_with_file(default_filter: &str, log_dir: &Path, prefix: &str) -> Option<WorkerGuard> {
    let file = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, prefix);
            Some(tracing_appender::non_blocking(appender))
        }
        Err(e) => {
            eprintln!("log dir {} unavailable: {e}", log_dir.display());
            None
        }
    };
    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    guard
}

/// Resolve an optional CLI path override against the configured default.
pub fn path_or(arg: Option<&str>, default: PathBuf) -> PathBuf {
    arg.map(expand_tilde).unwrap_or(default)
}

/// Parse arguments, falling back to all defaults when they don't parse.
/// `--help` and `--version` still print and exit.
pub fn parse_or_default<C, I>(args: I) -> C
where
    C: Parser,
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let bin = args.next().unwrap_or_default();
    let rest: Vec<String> = args.collect();
    match C::try_parse_from(std::iter::once(bin.clone()).chain(rest)) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("ignoring arguments: {e}");
            C::parse_from([bin])
        }
    }
}
