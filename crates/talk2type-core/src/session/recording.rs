use crate::{
    CoreError, CoreResult,
    ports::{AudioEncoder, AudioSource, CaptureHandle, CaptureRequest},
    session::{FrameBuffer, RecordingStore},
};

use std::{
    fmt,
    panic::Location,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default capture rate. Whisper models expect 16kHz mono.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Lifecycle status of a [`RecordingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Never started.
    #[default]
    NotStarted,
    /// Receiving chunks from the capture collaborator.
    Capturing,
    /// Capture closed, encoding and persisting.
    Finalizing,
    /// Recording finalized and saved.
    Complete,
    /// Open, encode or persist failed, or nothing was captured.
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not_started",
            Self::Capturing => "capturing",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// A finished recording, moved into the transcription pipeline.
#[derive(Debug, Clone)]
pub struct FinalizedRecording {
    /// Session the audio belongs to.
    pub session_id: Uuid,
    /// Where the encoded audio was saved.
    pub path: PathBuf,
    /// Length of the captured audio.
    pub duration: Duration,
    /// Number of mono samples captured.
    pub sample_count: usize,
    /// Rate the samples were captured at.
    pub sample_rate: u32,
    /// Encoded audio, identical to the file contents.
    pub audio: Vec<u8>,
}

/// Owns one capture lifecycle at a time: start, accumulate, stop, finalize.
///
/// The same instance is reused across sessions; every successful `start`
/// begins a new session id and a fresh frame buffer.
pub struct RecordingSession {
    source: Arc<dyn AudioSource>,
    encoder: Arc<dyn AudioEncoder>,
    store: RecordingStore,
    requested_rate: u32,
    id: Option<Uuid>,
    status: SessionStatus,
    buffer: FrameBuffer,
    capture: Option<Box<dyn CaptureHandle>>,
    sample_rate: u32,
    started_at: Option<Instant>,
    captured_at: Option<DateTime<Utc>>,
}

impl RecordingSession {
    /// Create an idle session that captures from `source` at `sample_rate`.
    pub fn new(
        source: Arc<dyn AudioSource>,
        encoder: Arc<dyn AudioEncoder>,
        store: RecordingStore,
        sample_rate: u32,
    ) -> Self {
        Self {
            source,
            encoder,
            store,
            requested_rate: sample_rate,
            id: None,
            status: SessionStatus::NotStarted,
            buffer: FrameBuffer::new(),
            capture: None,
            sample_rate,
            started_at: None,
            captured_at: None,
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether a session is capturing audio right now.
    pub fn is_capturing(&self) -> bool {
        self.status == SessionStatus::Capturing
    }

    /// Id of the current (or last) session.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// When the current (or last) session started.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// The frame buffer of the current session.
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Where finalized recordings are written.
    pub fn store(&self) -> &RecordingStore {
        &self.store
    }

    /// Open the capture collaborator and begin buffering chunks.
    ///
    /// # Errors
    ///
    /// `AlreadyRecording` if a session is capturing (its buffer is left
    /// untouched); `CaptureOpenFailed` if the source cannot be opened or
    /// reports a rate of 0 Hz.
    #[track_caller]
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn start(&mut self) -> CoreResult<Uuid> {
        if self.status == SessionStatus::Capturing {
            return Err(CoreError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session_id = Uuid::new_v4();
        self.buffer.reset();

        let handle = match self
            .source
            .open(CaptureRequest::mono(self.requested_rate), self.buffer.sink())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.buffer.seal();
                self.status = SessionStatus::Failed;
                self.id = Some(session_id);
                return Err(e);
            }
        };

        let actual_rate = handle.sample_rate();
        if actual_rate == 0 {
            if let Err(e) = handle.close() {
                error!(error = ?e, "Failed to close capture reporting 0 Hz");
            }
            self.buffer.seal();
            self.status = SessionStatus::Failed;
            self.id = Some(session_id);
            return Err(CoreError::CaptureOpenFailed {
                reason: "Capture reported a sample rate of 0 Hz".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.sample_rate = actual_rate;
        if self.sample_rate != self.requested_rate {
            warn!(
                requested = self.requested_rate,
                actual = self.sample_rate,
                "Capture opened at a different sample rate"
            );
        }

        self.capture = Some(handle);
        self.id = Some(session_id);
        self.started_at = Some(Instant::now());
        self.captured_at = Some(Utc::now());
        self.status = SessionStatus::Capturing;

        info!(session_id = %session_id, sample_rate = self.sample_rate, "Capture started");

        Ok(session_id)
    }

    /// Stop capturing, encode the audio and save it.
    ///
    /// The buffer is sealed before the capture collaborator is closed, so a
    /// chunk delivered late by the device can never be appended.
    ///
    /// # Errors
    ///
    /// `NotRecording` without side effects if no session is capturing.
    /// `NoAudioCaptured` if no chunk arrived (nothing is written).
    /// `EncodingFailed` / `PersistenceFailed` if finalizing fails.
    #[track_caller]
    #[instrument(skip(self), fields(status = %self.status, session_id = ?self.id))]
    pub fn stop(&mut self) -> CoreResult<FinalizedRecording> {
        if self.status != SessionStatus::Capturing {
            return Err(CoreError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let frames = self.buffer.seal();

        if let Some(handle) = self.capture.take() {
            if let Err(e) = handle.close() {
                // Buffer is already sealed; keep what was captured.
                error!(error = ?e, "Failed to close capture cleanly");
            }
        }

        self.status = SessionStatus::Finalizing;

        let session_id = self.id.unwrap_or_else(Uuid::nil);
        let captured_at = self.captured_at.unwrap_or_else(Utc::now);
        let wall_time = self.started_at.map(|s| s.elapsed()).unwrap_or_default();

        if frames.dropped_samples > 0 {
            warn!(
                dropped_samples = frames.dropped_samples,
                "Audio beyond buffer capacity was discarded"
            );
        }

        if frames.is_empty() {
            self.status = SessionStatus::Failed;
            warn!(session_id = %session_id, "No audio data to save");
            return Err(CoreError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let chunk_count = frames.chunks.len();
        let samples = frames.concat();
        let sample_count = samples.len();
        let duration = Duration::from_secs_f64(sample_count as f64 / f64::from(self.sample_rate));

        debug!(
            chunk_count,
            sample_count,
            wall_ms = wall_time.as_millis(),
            "Captured audio samples"
        );

        let audio = match self.encoder.encode(&samples, self.sample_rate) {
            Ok(audio) => audio,
            Err(e) => {
                self.status = SessionStatus::Failed;
                return Err(e);
            }
        };

        let path = match self.store.persist(&audio, captured_at) {
            Ok(path) => path,
            Err(e) => {
                self.status = SessionStatus::Failed;
                return Err(e);
            }
        };

        self.status = SessionStatus::Complete;

        info!(
            session_id = %session_id,
            path = ?path,
            duration_ms = duration.as_millis(),
            sample_count,
            "Recording finalized"
        );

        Ok(FinalizedRecording {
            session_id,
            path,
            duration,
            sample_count,
            sample_rate: self.sample_rate,
            audio,
        })
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if let Some(handle) = self.capture.take() {
            self.buffer.seal();
            let _ = handle.close();
        }
    }
}
