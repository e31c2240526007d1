use crate::{
    CoreError, CoreResult,
    audio::{decode_wav, to_whisper_rate},
    ports::Transcriber,
};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Rate Whisper models are trained on.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decoding options passed to Whisper on every transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhisperSettings {
    /// Offload inference to Metal / Vulkan when compiled in.
    pub use_gpu: bool,
    /// Spoken language code, or `None` to auto-detect.
    pub language: Option<String>,
    /// Text that primes the decoder (vocabulary, punctuation style).
    pub initial_prompt: Option<String>,
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            use_gpu: true,
            language: Some("en".to_string()),
            initial_prompt: None,
        }
    }
}

/// Local Whisper transcription of WAV recordings.
pub struct SttEngine {
    ctx: WhisperContext,
    settings: WhisperSettings,
}

impl SttEngine {
    /// Load the ggml model at `model_path`.
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, settings: WhisperSettings) -> CoreResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = WhisperContextParameters::default();
        params.use_gpu(settings.use_gpu);

        let ctx = WhisperContext::new_with_params(
            path.to_str().ok_or(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            })?,
            params,
        )
        .map_err(|e| CoreError::TranscriptionFailed {
            source: Box::new(e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(model_path = ?path, use_gpu = settings.use_gpu, "Whisper model loaded");

        Ok(Self { ctx, settings })
    }

    /// Transcribe mono samples captured at `capture_rate`, converting them
    /// to 16kHz first if needed.
    #[track_caller]
    pub fn transcribe_capture(&self, samples: Vec<f32>, capture_rate: u32) -> CoreResult<String> {
        let samples = to_whisper_rate(samples, capture_rate)?;
        self.transcribe_samples(&samples)
    }

    /// Transcribe 16kHz mono samples.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn transcribe_samples(&self, samples: &[f32]) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(CoreError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_language(self.settings.language.as_deref());
        if let Some(prompt) = self.settings.initial_prompt.as_deref() {
            params.set_initial_prompt(prompt);
        }
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let num_segments = state.full_n_segments();

        let mut result = String::with_capacity(num_segments.max(0) as usize * 256);

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| CoreError::TranscriptionFailed {
                    source: format!("Failed to get segment {}", i).into(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            result.push_str(&segment.to_string());
            result.push(' ');
        }

        let transcription = result.trim().to_string();

        debug!(
            sample_count = samples.len(),
            segment_count = num_segments,
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }
}

impl Transcriber for SttEngine {
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    fn transcribe(&self, audio: &[u8]) -> CoreResult<String> {
        let (samples, sample_rate) = decode_wav(audio)?;
        self.transcribe_capture(samples, sample_rate)
    }
}
