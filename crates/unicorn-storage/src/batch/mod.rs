//! Result writer thread.

pub mod commands;
pub mod writer;

pub use commands::ResultCommand;
pub use writer::{ResultWriter, WriteStats};
