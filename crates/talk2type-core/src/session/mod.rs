mod buffer;
mod recording;
mod store;

pub(crate) use {buffer::MAX_BUFFER_SAMPLES, store::discard_partial};

pub use {
    buffer::{FrameBuffer, FrameSink, SealedFrames},
    recording::{DEFAULT_SAMPLE_RATE, FinalizedRecording, RecordingSession, SessionStatus},
    store::RecordingStore,
};
