//! Canonical mono 16-bit PCM WAV encoding for the classifier upload.

mod encode;
mod header;

pub use encode::{EncodeError, WavEncoder, quantize_sample};
pub use header::{HEADER_LEN, HeaderError, WavHeader};

/// Encoded WAV file: a 44-byte header followed by little-endian i16 samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WavBytes {
    bytes: Vec<u8>,
}

impl WavBytes {
    pub(crate) fn from_encoded(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.bytes.len().saturating_sub(HEADER_LEN) / header::BYTES_PER_SAMPLE as usize
    }

    /// Parsed view of the header fields.
    pub fn header(&self) -> Result<WavHeader, HeaderError> {
        WavHeader::parse(&self.bytes)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for WavBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
