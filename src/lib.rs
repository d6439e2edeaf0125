//! Ambient - periodic state sampling and desire-driven action dispatch for an agent
//!
//! Three independently scheduled processes share two on-disk documents:
//! - sampler: SampleSource -> TrendWindow -> state snapshot (atomic replace)
//! - context: state snapshot + desire record -> one status line on stdout
//! - action:  desire record -> action bundle -> external agent

pub mod action;
pub mod cli;
pub mod context;
pub mod sampler;
