use crate::config::default_auto_paste;

use serde::{Deserialize, Serialize};

/// What happens to transcribed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Paste into the focused window after copying; `false` only copies.
    #[serde(default = "default_auto_paste")]
    pub auto_paste: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            auto_paste: default_auto_paste(),
        }
    }
}
