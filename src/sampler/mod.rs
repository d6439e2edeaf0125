//! Write path: SampleSource -> TrendWindow -> StateSnapshot.

pub mod log;
pub mod source;
pub mod tick;
pub mod window;

pub use source::{SampleSource, ScriptedSource, SystemSource};
pub use tick::Sampler;
pub use window::TrendWindow;
