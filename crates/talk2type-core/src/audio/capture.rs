use crate::{
    CoreError, CoreResult,
    ports::{AudioSource, CaptureHandle, CaptureRequest},
    session::FrameSink,
};

use std::{
    panic::Location,
    sync::mpsc,
    thread::{self, JoinHandle},
};

use cpal::{
    BufferSize, Device, SampleFormat, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Captures from the default input device through cpal.
///
/// Each open runs the cpal stream on its own thread, because a `Stream` may
/// not be moved between threads on every backend. The callback downmixes to
/// mono and pushes straight into the session's [`FrameSink`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalAudioSource;

impl CpalAudioSource {
    /// Create a source for the host's default input device.
    pub fn new() -> Self {
        Self
    }
}

impl AudioSource for CpalAudioSource {
    #[track_caller]
    #[instrument(skip(self, sink))]
    fn open(&self, request: CaptureRequest, sink: FrameSink) -> CoreResult<Box<dyn CaptureHandle>> {
        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<u32>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("talk2type-capture".to_string())
            .spawn(move || run_stream(request, sink, ready_tx, stop_rx))
            .map_err(|e| CoreError::CaptureOpenFailed {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => Ok(Box::new(CpalCapture {
                sample_rate,
                stop_tx,
                thread: Some(thread),
            })),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CoreError::CaptureOpenFailed {
                    reason: "Capture thread exited before the stream started".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}

fn run_stream(
    request: CaptureRequest,
    sink: FrameSink,
    ready_tx: mpsc::Sender<CoreResult<u32>>,
    stop_rx: mpsc::Receiver<()>,
) {
    let (stream, sample_rate) = match open_stream(request, sink) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if ready_tx.send(Ok(sample_rate)).is_err() {
        return;
    }

    // Returns on close() or when the handle is dropped.
    let _ = stop_rx.recv();

    drop(stream);
    info!("Audio capture stopped");
}

#[track_caller]
fn open_stream(request: CaptureRequest, sink: FrameSink) -> CoreResult<(Stream, u32)> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| CoreError::CaptureOpenFailed {
            reason: "No microphone found".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let config = stream_config(&device, request)?;
    let channels = usize::from(config.channels.max(1));

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if channels == 1 {
                    sink.push(data);
                } else {
                    let mono: Vec<f32> = data
                        .chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                        .collect();
                    sink.push(&mono);
                }
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| CoreError::CaptureOpenFailed {
            reason: format!("Failed to build stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| CoreError::CaptureOpenFailed {
        reason: format!("Failed to start stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!(
        device_id = ?device.id(),
        sample_rate = config.sample_rate,
        channels = config.channels,
        "Audio capture started"
    );

    Ok((stream, config.sample_rate))
}

/// Prefer an `f32` config at the requested rate; fall back to the device
/// default and let the transcriber resample.
#[track_caller]
fn stream_config(device: &Device, request: CaptureRequest) -> CoreResult<StreamConfig> {
    if let Ok(ranges) = device.supported_input_configs() {
        for range in ranges {
            if range.sample_format() == SampleFormat::F32
                && range.min_sample_rate() <= request.sample_rate
                && request.sample_rate <= range.max_sample_rate()
            {
                debug!(
                    channels = range.channels(),
                    sample_rate = request.sample_rate,
                    "Using requested capture rate"
                );
                return Ok(StreamConfig {
                    channels: range.channels(),
                    sample_rate: request.sample_rate,
                    buffer_size: BufferSize::Default,
                });
            }
        }
    }

    let default = device
        .default_input_config()
        .map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to get config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    warn!(
        requested = request.sample_rate,
        actual = default.sample_rate(),
        "Requested capture rate unsupported, using device default"
    );

    Ok(default.into())
}

struct CpalCapture {
    sample_rate: u32,
    stop_tx: mpsc::Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl CpalCapture {
    #[track_caller]
    fn shutdown(&mut self) -> CoreResult<()> {
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| CoreError::DeviceError {
                reason: "Capture thread panicked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }
        Ok(())
    }
}

impl CaptureHandle for CpalCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn close(mut self: Box<Self>) -> CoreResult<()> {
        self.shutdown()
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
