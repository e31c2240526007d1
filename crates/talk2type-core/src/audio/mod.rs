//! Device, codec and model adapters behind the core ports.

mod capture;
mod engine;
mod resampler;
mod wav;

pub(crate) use resampler::{RateConverter, to_whisper_rate};

pub use {
    capture::CpalAudioSource,
    engine::{SttEngine, WHISPER_SAMPLE_RATE, WhisperSettings},
    wav::{WavEncoder, decode_wav},
};
