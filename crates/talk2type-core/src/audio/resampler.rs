//! Sample-rate conversion of finished captures to Whisper's input rate.

use crate::{CoreError, CoreResult, audio::WHISPER_SAMPLE_RATE};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler};
use tracing::{debug, instrument};

/// Input frames per FFT chunk asked of rubato. Non-integer ratios round it.
const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Bring a mono capture recorded at `capture_rate` to 16 kHz.
///
/// Captures already at 16 kHz are returned untouched.
#[track_caller]
pub(crate) fn to_whisper_rate(samples: Vec<f32>, capture_rate: u32) -> CoreResult<Vec<f32>> {
    if capture_rate == WHISPER_SAMPLE_RATE {
        return Ok(samples);
    }
    RateConverter::new(capture_rate, WHISPER_SAMPLE_RATE)?.convert(&samples)
}

/// Converts one whole mono recording between two rates.
///
/// The filter delay is removed from the front and the output is exactly
/// `round(len * to / from)` samples long, so timestamps Whisper reports
/// line up with the capture.
pub(crate) struct RateConverter {
    fft: Fft<f32>,
    from: u32,
    to: u32,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl RateConverter {
    #[track_caller]
    pub(crate) fn new(from: u32, to: u32) -> CoreResult<Self> {
        if from == 0 || to == 0 {
            return Err(CoreError::ResamplingError {
                reason: format!("Cannot convert {} Hz audio to {} Hz", from, to),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let fft = Fft::<f32>::new(
            from as usize,
            to as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to build {} Hz -> {} Hz converter: {}", from, to, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let input = vec![0.0; fft.input_frames_max()];
        let output = vec![0.0; fft.output_frames_max()];

        Ok(Self {
            fft,
            from,
            to,
            input,
            output,
        })
    }

    /// Number of output samples `len` input samples convert to.
    pub(crate) fn output_len(&self, len: usize) -> usize {
        let from = u64::from(self.from);
        ((len as u64 * u64::from(self.to) + from / 2) / from) as usize
    }

    /// Convert `samples`, flushing the converter with silence at the end.
    #[track_caller]
    #[instrument(skip(self, samples), fields(from = self.from, to = self.to, len = samples.len()))]
    pub(crate) fn convert(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        let wanted = self.output_len(samples.len());
        if wanted == 0 {
            return Ok(Vec::new());
        }

        let delay = self.fft.output_delay();
        let mut converted = Vec::with_capacity(delay + wanted + self.output.len());
        let mut consumed = 0;

        while converted.len() < delay + wanted {
            let frames = self.fft.input_frames_next();
            let take = frames.min(samples.len() - consumed);
            self.input[..take].copy_from_slice(&samples[consumed..consumed + take]);
            self.input[take..frames].fill(0.0);
            consumed += take;

            let written = self.process_chunk(frames)?;
            if written == 0 {
                return Err(CoreError::ResamplingError {
                    reason: "Converter produced no output for a full chunk".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            converted.extend_from_slice(&self.output[..written]);
        }

        converted.drain(..delay);
        converted.truncate(wanted);

        debug!(
            delay,
            output_len = converted.len(),
            "Capture converted to Whisper rate"
        );

        Ok(converted)
    }

    #[track_caller]
    fn process_chunk(&mut self, frames: usize) -> CoreResult<usize> {
        let input = InterleavedSlice::new(&self.input[..frames], 1, frames).map_err(|e| {
            CoreError::ResamplingError {
                reason: format!("Input chunk of {} frames rejected: {}", frames, e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let capacity = self.output.len();
        let mut output = InterleavedSlice::new_mut(&mut self.output, 1, capacity).map_err(|e| {
            CoreError::ResamplingError {
                reason: format!("Output buffer of {} frames rejected: {}", capacity, e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let (_, written) = self
            .fft
            .process_into_buffer(&input, &mut output, None)
            .map_err(|e| CoreError::ResamplingError {
                reason: format!("Chunk conversion failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(written)
    }
}
