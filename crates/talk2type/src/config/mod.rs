mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod trigger_config;
mod whisper_config;

pub(crate) use {
    audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::Config,
    logging_config::LoggingConfig, trigger_config::{TriggerConfig, TriggerPolicy},
    whisper_config::WhisperConfig,
};

pub(crate) const DEFAULT_AUTO_PASTE: bool = true;
pub(crate) const DEFAULT_HOTKEY: &str = "CapsLock";
pub(crate) const DEFAULT_HOLD_MS: u64 = 1_000;
pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 50;
pub(crate) const DEFAULT_LOG_FILTER: &str = "talk2type=info,talk2type_core=info";

pub(crate) fn default_auto_paste() -> bool {
    DEFAULT_AUTO_PASTE
}
