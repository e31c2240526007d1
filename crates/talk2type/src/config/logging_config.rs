use crate::config::DEFAULT_LOG_FILTER;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log output configuration. `RUST_LOG` overrides `filter` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Also write logs to this file, rotated daily.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Write the file log as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            file: None,
            json: false,
        }
    }
}

fn default_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
