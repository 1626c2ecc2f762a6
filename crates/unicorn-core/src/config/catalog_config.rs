//! Pattern catalog source.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where patterns come from. With neither `path` nor `from_database` set,
/// the built-in seed catalog is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// TOML catalog file.
    pub path: Option<PathBuf>,
    /// Read patterns from the `pattern_templates` table.
    pub from_database: Option<bool>,
}
