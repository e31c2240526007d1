use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use talk2type_core::session::DEFAULT_SAMPLE_RATE;

/// Audio capture and storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Requested capture rate in Hz. The device may open at another rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Directory for saved recordings. Defaults to the data directory.
    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            recordings_dir: None,
        }
    }
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}
