use crate::{CoreResult, session::FrameSink};

/// Parameters for opening a capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Preferred sample rate in Hz.
    pub sample_rate: u32,
    /// Channels delivered to the sink. Always 1 for dictation.
    pub channels: u16,
}

impl CaptureRequest {
    /// Mono capture at `sample_rate`.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// Microphone (or any other sample producer).
///
/// While the returned handle is open the source pushes mono `f32` chunks into
/// `sink` from its own thread, in capture order.
pub trait AudioSource: Send + Sync {
    /// Open a stream that delivers chunks to `sink`.
    fn open(&self, request: CaptureRequest, sink: FrameSink) -> CoreResult<Box<dyn CaptureHandle>>;
}

/// An open capture stream.
pub trait CaptureHandle: Send {
    /// Rate the stream actually runs at. May differ from the request when the
    /// device does not support it.
    fn sample_rate(&self) -> u32;

    /// Stop delivery and release the device. No chunk is pushed after this
    /// returns.
    fn close(self: Box<Self>) -> CoreResult<()>;
}
