use thiserror::Error;

use super::WavBytes;
use super::header::{BYTES_PER_SAMPLE, HEADER_LEN, write_header};
use crate::audio::NormalizedSample;

/// Largest payload whose RIFF size (`36 + data`) still fits in a u32.
const MAX_DATA_BYTES: u64 = u32::MAX as u64 - 36;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Cannot encode WAV at 0 Hz")]
    ZeroSampleRate,
    #[error("{samples} samples do not fit in a single WAV file")]
    TooLong { samples: usize },
}

/// Serializes mono float samples into a 16-bit PCM WAV buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavEncoder;

impl WavEncoder {
    pub fn encode(&self, samples: &[f32], sample_rate: u32) -> Result<WavBytes, EncodeError> {
        if sample_rate == 0 {
            return Err(EncodeError::ZeroSampleRate);
        }
        let data_bytes = (samples.len() as u64).saturating_mul(BYTES_PER_SAMPLE as u64);
        if data_bytes > MAX_DATA_BYTES {
            return Err(EncodeError::TooLong {
                samples: samples.len(),
            });
        }
        let mut out = Vec::with_capacity(HEADER_LEN + data_bytes as usize);
        write_header(&mut out, sample_rate, data_bytes as u32);
        for &sample in samples {
            out.extend_from_slice(&quantize_sample(sample).to_le_bytes());
        }
        Ok(WavBytes::from_encoded(out))
    }

    pub fn encode_normalized(&self, sample: &NormalizedSample) -> Result<WavBytes, EncodeError> {
        self.encode(sample.samples(), sample.sample_rate())
    }
}

/// Clamp to [-1, 1] before scaling so out-of-range input saturates instead of wrapping.
pub fn quantize_sample(sample: f32) -> i16 {
    if !sample.is_finite() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
