use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use talk2type_core::audio::WhisperSettings;

const DEFAULT_PROMPT: &str = "This is a dictation in English. Please transcribe accurately with \
proper punctuation and capitalization. Common words and phrases may include technical terms, \
proper nouns, and everyday speech.";

/// Whisper model configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhisperConfig {
    /// Path to the Whisper model file (e.g., ggml-base.en.bin).
    pub model_path: PathBuf,

    /// Use GPU for inference if a GPU backend was compiled in (Metal/Vulkan).
    #[serde(default = "default_use_gpu")]
    pub use_gpu: bool,

    /// Spoken language code. Omit to let Whisper detect it.
    #[serde(default = "default_language")]
    pub language: Option<String>,

    /// Text that primes the decoder with vocabulary and punctuation style.
    #[serde(default = "default_initial_prompt")]
    pub initial_prompt: Option<String>,
}

impl WhisperConfig {
    /// Settings for a model at `model_path`, everything else default.
    pub fn with_model_path(model_path: PathBuf) -> Self {
        Self {
            model_path,
            use_gpu: default_use_gpu(),
            language: default_language(),
            initial_prompt: default_initial_prompt(),
        }
    }

    /// Decoder options for the engine.
    pub fn settings(&self) -> WhisperSettings {
        WhisperSettings {
            use_gpu: self.use_gpu,
            language: self.language.clone(),
            initial_prompt: self.initial_prompt.clone(),
        }
    }
}

fn default_use_gpu() -> bool {
    true
}

fn default_language() -> Option<String> {
    Some("en".to_string())
}

fn default_initial_prompt() -> Option<String> {
    Some(DEFAULT_PROMPT.to_string())
}
