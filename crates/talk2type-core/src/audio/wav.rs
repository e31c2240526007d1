use crate::{CoreError, CoreResult, ports::AudioEncoder};

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Encodes mono `f32` samples as 16-bit PCM WAV.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl WavEncoder {
    /// Create a WAV encoder.
    pub fn new() -> Self {
        Self
    }
}

impl AudioEncoder for WavEncoder {
    #[track_caller]
    #[instrument(skip(self, samples), fields(sample_count = samples.len()))]
    fn encode(&self, samples: &[f32], sample_rate: u32) -> CoreResult<Vec<u8>> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let encoding_failed = |e: hound::Error| CoreError::EncodingFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(encoding_failed)?;
            for &sample in samples {
                let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                writer.write_sample(pcm).map_err(encoding_failed)?;
            }
            writer.finalize().map_err(encoding_failed)?;
        }

        let bytes = cursor.into_inner();
        debug!(bytes = bytes.len(), sample_rate, "Encoded WAV");

        Ok(bytes)
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}

/// Decode WAV bytes into mono `f32` samples and their sample rate.
///
/// Multi-channel input is averaged down to mono.
#[track_caller]
pub fn decode_wav(bytes: &[u8]) -> CoreResult<(Vec<f32>, u32)> {
    let decoding_failed = |e: hound::Error| CoreError::TranscriptionFailed {
        source: Box::new(e),
        location: ErrorLocation::from(Location::caller()),
    };

    let reader = WavReader::new(Cursor::new(bytes)).map_err(decoding_failed)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decoding_failed)?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(decoding_failed)?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}
