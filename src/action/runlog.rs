use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Append-only, human-readable log of selector runs. Each run's lines sit
/// under a `=== run <ts> ===` header. Write failures are logged and dropped.
pub struct RunLog {
    path: PathBuf,
    run_ts: String,
    header_written: bool,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>, run_ts: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            run_ts: run_ts.into(),
            header_written: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_ts(&self) -> &str {
        &self.run_ts
    }

    /// Append one timestamped line.
    pub fn record(&mut self, line: &str) {
        let mut text = String::new();
        if !self.header_written {
            text.push_str(&format!("\n=== run {} ===\n", self.run_ts));
        }
        text.push_str(&format!("[{}] {}\n", Local::now().format("%H:%M:%S"), line));

        match self.append(&text) {
            Ok(()) => self.header_written = true,
            Err(e) => tracing::warn!("run log {} not written: {}", self.path.display(), e),
        }
    }

    fn append(&self, text: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(text.as_bytes())
    }
}
