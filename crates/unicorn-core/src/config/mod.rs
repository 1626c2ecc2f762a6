//! Configuration system for the unicorn engine.
//! TOML-based, 4-layer resolution: CLI > env > project > defaults.

pub mod catalog_config;
pub mod engine_config;
pub mod storage_config;
pub mod unicorn_config;

pub use catalog_config::CatalogConfig;
pub use engine_config::EngineConfig;
pub use storage_config::StorageConfig;
pub use unicorn_config::{CliOverrides, UnicornConfig};
