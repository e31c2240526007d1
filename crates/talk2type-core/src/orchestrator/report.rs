use std::{path::PathBuf, time::Duration};

use uuid::Uuid;

/// How the transcription pipeline for one recording ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Text was transcribed and handed to the injector.
    Injected {
        /// Length of the injected text in bytes.
        text_len: usize,
    },
    /// The transcriber returned only whitespace; nothing was injected.
    EmptyTranscription,
    /// The transcriber failed. The recording stays on disk.
    TranscriptionFailed(String),
    /// Transcription succeeded but injection failed.
    InjectionFailed(String),
    /// The task was cancelled or panicked before reporting.
    Aborted(String),
}

impl PipelineOutcome {
    /// Whether the text reached the injector successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Injected { .. } | Self::EmptyTranscription)
    }
}

/// Result of one transcription pipeline, surfaced for logging.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Session the recording belongs to.
    pub session_id: Uuid,
    /// Saved recording, kept regardless of outcome.
    pub path: PathBuf,
    /// Length of the recorded audio.
    pub duration: Duration,
    /// Time spent transcribing and injecting.
    pub elapsed: Duration,
    /// How it ended.
    pub outcome: PipelineOutcome,
}
