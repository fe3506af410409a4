//! RIFF/WAVE header layout for the mono 16-bit PCM files we upload.

use thiserror::Error;

/// Size of the canonical PCM header (RIFF + `fmt ` + `data` chunk headers).
pub const HEADER_LEN: usize = 44;
pub(crate) const PCM_FORMAT: u16 = 1;
pub(crate) const CHANNELS: u16 = 1;
pub(crate) const BITS_PER_SAMPLE: u16 = 16;
pub(crate) const BYTES_PER_SAMPLE: u32 = (BITS_PER_SAMPLE / 8) as u32;
const FMT_CHUNK_LEN: u32 = 16;

/// Fields read back from a WAV buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Offset of the first payload byte.
    pub data_offset: usize,
    pub data_size: u32,
}

impl WavHeader {
    /// Walk the RIFF chunks of `bytes` and collect the format and data sizes.
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < 12 {
            return Err(HeaderError::TooShort { len: bytes.len() });
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(HeaderError::NotRiffWave);
        }
        let riff_size = read_u32(bytes, 4);

        let mut format = None;
        let mut offset = 12usize;
        while offset + 8 <= bytes.len() {
            let id = &bytes[offset..offset + 4];
            let chunk_size = read_u32(bytes, offset + 4);
            let chunk_data = offset + 8;
            if id == b"fmt " {
                if chunk_size < FMT_CHUNK_LEN || chunk_data + FMT_CHUNK_LEN as usize > bytes.len() {
                    return Err(HeaderError::Truncated { chunk: "fmt " });
                }
                format = Some((
                    read_u16(bytes, chunk_data),
                    read_u16(bytes, chunk_data + 2),
                    read_u32(bytes, chunk_data + 4),
                    read_u32(bytes, chunk_data + 8),
                    read_u16(bytes, chunk_data + 12),
                    read_u16(bytes, chunk_data + 14),
                ));
            } else if id == b"data" {
                let (audio_format, channels, sample_rate, byte_rate, block_align, bits_per_sample) =
                    format.ok_or(HeaderError::MissingChunk { chunk: "fmt " })?;
                return Ok(Self {
                    riff_size,
                    audio_format,
                    channels,
                    sample_rate,
                    byte_rate,
                    block_align,
                    bits_per_sample,
                    data_offset: chunk_data,
                    data_size: chunk_size,
                });
            }
            offset = chunk_data.saturating_add(chunk_size as usize);
            if chunk_size % 2 == 1 {
                offset = offset.saturating_add(1);
            }
        }
        Err(HeaderError::MissingChunk { chunk: "data" })
    }

    /// Samples per channel declared by the data chunk.
    pub fn sample_count(&self) -> usize {
        match self.block_align {
            0 => 0,
            align => self.data_size as usize / align as usize,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("WAV buffer too short ({len} bytes)")]
    TooShort { len: usize },
    #[error("Missing RIFF/WAVE signature")]
    NotRiffWave,
    #[error("Missing '{chunk}' chunk")]
    MissingChunk { chunk: &'static str },
    #[error("Truncated '{chunk}' chunk")]
    Truncated { chunk: &'static str },
}

/// Append the canonical 44-byte mono PCM16 header for `data_bytes` of payload.
pub(crate) fn write_header(out: &mut Vec<u8>, sample_rate: u32, data_bytes: u32) {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate.saturating_mul(CHANNELS as u32 * BYTES_PER_SAMPLE);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_bytes).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_bytes.to_le_bytes());
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
