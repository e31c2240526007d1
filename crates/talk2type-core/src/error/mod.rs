use error_location::ErrorLocation;
use thiserror::Error;

/// Trigger, session and pipeline errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A session is already capturing audio.
    #[error("Recording already in progress {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested while no session was capturing.
    #[error("No recording in progress {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The session finished without a single captured chunk.
    #[error("No audio captured {location}")]
    NoAudioCaptured {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture collaborator could not be opened.
    #[error("Failed to open audio capture: {reason} {location}")]
    CaptureOpenFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed after the stream was opened.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Encoding captured samples failed.
    #[error("Audio encoding failed: {reason} {location}")]
    EncodingFailed {
        /// Description of the encoding error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the encoded recording to disk failed.
    #[error("Failed to persist recording to {path:?}: {source} {location}")]
    PersistenceFailed {
        /// Target path of the recording.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transcription process failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from the transcription backend.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Delivering text to the focused application failed.
    #[error("Text injection failed: {reason} {location}")]
    InjectionFailed {
        /// Description of the injection error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper model file not found at specified path.
    #[error("Model not found at path: {path:?} {location}")]
    ModelNotFound {
        /// Path to the missing model file.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The orchestrator's command channel is closed.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A live hold-timer fire reached the machine outside `ArmPending`.
    ///
    /// Cancellation clears the live generation on every exit from
    /// `ArmPending`, so this indicates a broken invariant rather than a
    /// recoverable condition.
    #[error("Hold timer race: {reason} {location}")]
    TimerRace {
        /// Description of the observed state.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
