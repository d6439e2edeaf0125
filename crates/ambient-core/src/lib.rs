//! Ambient Core - Types, configuration, snapshot store, and error handling

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::AmbientConfig;
pub use error::{Error, Result};
pub use types::*;
