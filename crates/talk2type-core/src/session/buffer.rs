use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, warn};

/// Maximum samples to buffer (5 minutes at 48kHz mono).
/// Prevents unbounded memory growth during long recordings.
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 60s * 5 min * 4 bytes/f32 = ~58MB
/// - This is a hard upper bound; typical recordings are shorter
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

#[derive(Debug, Default)]
struct Frames {
    chunks: Vec<Vec<f32>>,
    total_samples: usize,
    dropped_samples: usize,
    sealed: bool,
}

/// Append-only sequence of sample chunks for one recording session.
///
/// The session owns the buffer; the capture thread only ever sees a
/// [`FrameSink`]. Once [`FrameBuffer::seal`] returns, no further push can
/// land: the sealed flag is checked under the same lock that guards the
/// chunks.
#[derive(Debug)]
pub struct FrameBuffer {
    frames: Arc<Mutex<Frames>>,
    capacity: usize,
}

/// Write handle given to the capture collaborator.
#[derive(Debug, Clone)]
pub struct FrameSink {
    frames: Arc<Mutex<Frames>>,
    capacity: usize,
}

/// Chunks drained from a sealed buffer.
#[derive(Debug, Default)]
pub struct SealedFrames {
    /// Chunks in arrival order.
    pub chunks: Vec<Vec<f32>>,
    /// Total samples across all chunks.
    pub total_samples: usize,
    /// Samples rejected because the buffer was full.
    pub dropped_samples: usize,
}

impl SealedFrames {
    /// Concatenate all chunks into one contiguous sample sequence.
    pub fn concat(self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.total_samples);
        for chunk in self.chunks {
            samples.extend_from_slice(&chunk);
        }
        samples
    }

    /// Whether no chunk was ever captured.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

// Recover from lock poison rather than silently dropping audio.
// A poisoned mutex means a previous holder panicked, but the
// chunk data is still valid and usable.
fn lock(frames: &Mutex<Frames>) -> MutexGuard<'_, Frames> {
    frames.lock().unwrap_or_else(|e| {
        error!("Frame buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

impl FrameBuffer {
    /// Create an empty, sealed buffer bounded at [`MAX_BUFFER_SAMPLES`].
    ///
    /// Call [`FrameBuffer::reset`] to open it for a new session.
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SAMPLES)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Arc::new(Mutex::new(Frames {
                sealed: true,
                ..Frames::default()
            })),
            capacity,
        }
    }

    /// Discard all chunks and accept pushes again.
    pub fn reset(&self) {
        let mut frames = lock(&self.frames);
        *frames = Frames::default();
    }

    /// A write handle for the capture collaborator.
    pub fn sink(&self) -> FrameSink {
        FrameSink {
            frames: Arc::clone(&self.frames),
            capacity: self.capacity,
        }
    }

    /// Stop accepting pushes and take everything captured so far.
    pub fn seal(&self) -> SealedFrames {
        let mut frames = lock(&self.frames);
        frames.sealed = true;
        SealedFrames {
            chunks: std::mem::take(&mut frames.chunks),
            total_samples: std::mem::take(&mut frames.total_samples),
            dropped_samples: std::mem::take(&mut frames.dropped_samples),
        }
    }

    /// Samples buffered so far.
    pub fn total_samples(&self) -> usize {
        lock(&self.frames).total_samples
    }

    /// Chunks buffered so far.
    pub fn chunk_count(&self) -> usize {
        lock(&self.frames).chunks.len()
    }

    /// Whether pushes are currently rejected.
    pub fn is_sealed(&self) -> bool {
        lock(&self.frames).sealed
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink {
    /// Append one chunk. Returns `false` once the buffer is sealed, which
    /// tells the producer to stop delivering.
    ///
    /// A chunk that would exceed the capacity is dropped whole so that the
    /// buffer never holds a partial chunk.
    pub fn push(&self, chunk: &[f32]) -> bool {
        if chunk.is_empty() {
            return true;
        }

        let mut frames = lock(&self.frames);
        if frames.sealed {
            return false;
        }

        if frames.total_samples + chunk.len() > self.capacity {
            if frames.dropped_samples == 0 {
                warn!(
                    capacity = self.capacity,
                    "Frame buffer full, dropping further audio"
                );
            }
            frames.dropped_samples += chunk.len();
            return true;
        }

        frames.total_samples += chunk.len();
        frames.chunks.push(chunk.to_vec());
        true
    }
}
