//! Typed queries against the unicorn tables.

pub mod catalog;
pub mod market;
pub mod players;
pub mod results;
