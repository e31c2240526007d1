use crate::CoreResult;

/// Pure conversion from raw samples to the persisted audio format.
pub trait AudioEncoder: Send + Sync {
    /// Encode mono samples captured at `sample_rate`.
    fn encode(&self, samples: &[f32], sample_rate: u32) -> CoreResult<Vec<u8>>;

    /// File extension of the encoded format, without the dot.
    fn extension(&self) -> &'static str;
}
