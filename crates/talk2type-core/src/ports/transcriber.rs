use crate::CoreResult;

/// Speech-to-text backend.
///
/// Called from a blocking worker thread, never from the trigger loop.
pub trait Transcriber: Send + Sync {
    /// Transcribe one encoded recording.
    fn transcribe(&self, audio: &[u8]) -> CoreResult<String>;
}
