use crate::config::{DEFAULT_DEBOUNCE_MS, DEFAULT_HOLD_MS, DEFAULT_HOTKEY};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use talk2type_core::ActivationPolicy;

/// How presses of the hotkey start and stop recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPolicy {
    /// Each press toggles recording, like a Caps Lock light.
    #[default]
    Immediate,
    /// Recording starts once the key has been held for `hold_ms`.
    Hold,
}

/// Trigger key configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Hotkey in global-hotkey syntax, e.g. `CapsLock` or `ctrl+shift+Space`.
    #[serde(default = "default_hotkey")]
    pub hotkey: String,

    /// `immediate` or `hold`.
    #[serde(default)]
    pub policy: TriggerPolicy,

    /// Hold threshold in milliseconds, used by the `hold` policy.
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,

    /// Minimum gap in milliseconds between stopping and the next start.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl TriggerConfig {
    /// Core activation policy for these settings.
    pub fn activation_policy(&self) -> ActivationPolicy {
        match self.policy {
            TriggerPolicy::Immediate => ActivationPolicy::Immediate,
            TriggerPolicy::Hold => ActivationPolicy::HeldFor(Duration::from_millis(self.hold_ms)),
        }
    }

    /// Debounce as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            hotkey: default_hotkey(),
            policy: TriggerPolicy::default(),
            hold_ms: default_hold_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_hotkey() -> String {
    DEFAULT_HOTKEY.to_string()
}

fn default_hold_ms() -> u64 {
    DEFAULT_HOLD_MS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
