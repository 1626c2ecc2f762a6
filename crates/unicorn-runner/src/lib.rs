//! # unicorn-runner
//!
//! Wires configuration, storage, the pattern catalog and the orchestrator
//! together for a single run date.

pub mod args;
pub mod runtime;

pub use args::RunArgs;
pub use runtime::{RuntimeOptions, UnicornRuntime};
