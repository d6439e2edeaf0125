//! Error types for the ambient monitor

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("state file missing: {}", .0.display())]
    MissingState(PathBuf),

    #[error("malformed state in {}: {reason}", path.display())]
    MalformedState { path: PathBuf, reason: String },

    #[error("sample out of order: newest {newest}, offered {offered}")]
    OutOfOrderSample { newest: String, offered: String },

    #[error("sample unavailable: {0}")]
    SampleUnavailable(String),

    #[error("dispatch failed: {0}")]
    DispatchFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedState {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn sample_unavailable(reason: impl Into<String>) -> Self {
        Self::SampleUnavailable(reason.into())
    }

    pub fn dispatch_failed(reason: impl Into<String>) -> Self {
        Self::DispatchFailed(reason.into())
    }

    /// True for failures that mean "nothing usable on disk" rather than an I/O fault.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::MissingState(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
