//! Desire-driven action selection and dispatch.

pub mod bundle;
pub mod dispatch;
pub mod runlog;
pub mod selector;

pub use bundle::{ActionBundle, ActionKind};
pub use dispatch::{AgentExecutor, CliExecutor, DispatchReport, DryRunExecutor};
pub use runlog::RunLog;
pub use selector::{select, ActionSelector, RunOutcome, Selection, SelectorState};
