//! External agent execution - hand a prompt and a capability allow-list to an agent

use std::path::PathBuf;

use ambient_core::{Error, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// What came back from one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub exit_code: Option<i32>,
    /// Last part of the agent's stdout, for the run log.
    pub output_tail: String,
}

/// The agent-execution boundary. One call is one dispatch attempt; callers do not retry.
#[async_trait::async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    async fn execute(&self, prompt: &str, capabilities: &[&str]) -> Result<DispatchReport>;
}

const OUTPUT_TAIL_CHARS: usize = 500;

/// Keep the last `max` bytes of `s`, moved forward to a char boundary.
fn tail(s: &str, max: usize) -> &str {
    let s = s.trim();
    if s.len() <= max {
        return s;
    }
    let mut idx = s.len() - max;
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    &s[idx..]
}

/// Runs an agent CLI: `<program> [args..] -p <prompt> --allowedTools a,b,c`.
pub struct CliExecutor {
    program: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
}

impl CliExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_workdir(mut self, workdir: Option<PathBuf>) -> Self {
        self.workdir = workdir;
        self
    }

    /// Full argument vector passed to the program.
    pub fn command_args(&self, prompt: &str, capabilities: &[&str]) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("-p".into());
        args.push(prompt.into());
        args.push("--allowedTools".into());
        args.push(capabilities.join(","));
        args
    }
}

#[async_trait::async_trait]
impl AgentExecutor for CliExecutor {
    fn name(&self) -> &str {
        &self.program
    }

    async fn execute(&self, prompt: &str, capabilities: &[&str]) -> Result<DispatchReport> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(prompt, capabilities));
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        debug!("exec {} with {} capabilities", self.program, capabilities.len());

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::dispatch_failed(format!("{} exec failed: {e}", self.program)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            Ok(DispatchReport {
                exit_code: output.status.code(),
                output_tail: tail(&stdout, OUTPUT_TAIL_CHARS).to_string(),
            })
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::dispatch_failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                tail(&stderr, OUTPUT_TAIL_CHARS)
            )))
        }
    }
}

/// Logs what would be dispatched and reports success.
pub struct DryRunExecutor;

#[async_trait::async_trait]
impl AgentExecutor for DryRunExecutor {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn execute(&self, prompt: &str, capabilities: &[&str]) -> Result<DispatchReport> {
        info!("dry run: would dispatch [{}] {}", capabilities.join(","), prompt);
        Ok(DispatchReport {
            exit_code: Some(0),
            output_tail: "(dry run)".into(),
        })
    }
}
