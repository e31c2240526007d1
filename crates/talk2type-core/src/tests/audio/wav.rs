use crate::{
    CoreError,
    audio::{WavEncoder, decode_wav},
    ports::AudioEncoder,
};

use std::io::Cursor;

const RATE: u32 = 16_000;
const PCM_TOLERANCE: f32 = 1.0 / 16_000.0;

/// WHAT: Encoded audio is 16-bit mono PCM at the capture rate
/// WHY: Whisper and most players read this format directly
#[test]
#[allow(clippy::unwrap_used)]
fn given_samples_when_encoding_then_16bit_mono_wav() {
    // Given: A short ramp
    let samples: Vec<f32> = (0..1_600).map(|i| i as f32 / 1_600.0 - 0.5).collect();

    // When: Encoding
    let bytes = WavEncoder::new().encode(&samples, RATE).unwrap();

    // Then: The header describes the audio and every sample is present
    let reader = hound::WavReader::new(Cursor::new(&bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len() as usize, samples.len());
    assert_eq!(WavEncoder::new().extension(), "wav");
}

/// WHAT: Decoding an encoded recording returns the samples within PCM precision
/// WHY: The transcriber reads back exactly what was saved
#[test]
#[allow(clippy::unwrap_used)]
fn given_encoded_recording_when_decoding_then_samples_match() {
    // Given: An encoded tone
    let samples: Vec<f32> = (0..4_800).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
    let bytes = WavEncoder::new().encode(&samples, 48_000).unwrap();

    // When: Decoding
    let (decoded, rate) = decode_wav(&bytes).unwrap();

    // Then: Same rate, same length, values within one quantization step
    assert_eq!(rate, 48_000);
    assert_eq!(decoded.len(), samples.len());
    assert!(
        decoded
            .iter()
            .zip(&samples)
            .all(|(d, s)| (d - s).abs() < PCM_TOLERANCE)
    );
}

/// WHAT: Out-of-range samples are clamped rather than wrapped
/// WHY: Clipping must not turn into loud artifacts
#[test]
#[allow(clippy::unwrap_used)]
fn given_samples_beyond_full_scale_when_encoding_then_clamped() {
    // Given: Samples outside [-1, 1]
    let samples = [2.0f32, -3.0];

    // When: Encoding and decoding
    let bytes = WavEncoder::new().encode(&samples, RATE).unwrap();
    let (decoded, _) = decode_wav(&bytes).unwrap();

    // Then: Pinned near full scale with the original sign
    assert!(decoded[0] > 0.99);
    assert!(decoded[1] < -0.99);
}

/// WHAT: Stereo WAV input is averaged down to mono
/// WHY: Recordings from other tools may be stereo
#[test]
#[allow(clippy::unwrap_used)]
fn given_stereo_wav_when_decoding_then_downmixed() {
    // Given: A stereo float WAV with left 0.5, right -0.5 then left 1.0, right 0.0
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in [0.5f32, -0.5, 1.0, 0.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    // When: Decoding
    let (decoded, rate) = decode_wav(&cursor.into_inner()).unwrap();

    // Then: Two mono frames with averaged values
    assert_eq!(rate, RATE);
    assert_eq!(decoded, vec![0.0, 0.5]);
}

/// WHAT: Non-WAV bytes fail to decode
/// WHY: Corrupt recordings must surface as errors
#[test]
fn given_garbage_when_decoding_then_transcription_failed() {
    // Given/When: Decoding bytes without a RIFF header
    let result = decode_wav(b"not a riff header");

    // Then: TranscriptionFailed
    assert!(matches!(result, Err(CoreError::TranscriptionFailed { .. })));
}
