//! # unicorn-core
//!
//! Core types, traits, errors, config, and tracing for the unicorn
//! pattern evaluation engine. Every other crate in the workspace
//! depends on this one; it has no knowledge of SQL or scheduling.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;
