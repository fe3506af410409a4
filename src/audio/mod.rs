//! Audio intake: decode a submitted file, cut a centered window, downmix it to
//! mono and resample it to the classifier's fixed rate.

mod decode;
mod downmix;
mod error;
mod normalize;
mod resample;
mod window;

use std::path::Path;

pub use decode::{DecodingService, SymphoniaDecoder};
pub use downmix::ChannelLayout;
pub use error::{InvalidSettings, NormalizeError};
pub use normalize::{AudioNormalizer, NormalizeSettings};
pub use window::SampleWindow;

/// Sample rate expected by the classifier.
pub const TARGET_SAMPLE_RATE: u32 = 22_050;
/// Length of the excerpt sent to the classifier.
pub const TARGET_DURATION_SECONDS: f64 = 10.0;

/// Raw file bytes as submitted by the user, plus the declared type.
#[derive(Clone, Debug)]
pub struct RawAudioInput {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: Option<String>,
}

impl RawAudioInput {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    /// Attach the original file name; its extension is used as a decoder hint.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Read a file from disk, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let extension = path.extension().and_then(|ext| ext.to_str());
        let mime_type = extension.and_then(mime_for_extension).unwrap_or("application/octet-stream");
        let input = Self::new(bytes, mime_type);
        Ok(match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => input.with_file_name(name),
            None => input,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Lowercase extension hint, from the file name first and the MIME type second.
    pub fn format_hint(&self) -> Option<String> {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(str::to_ascii_lowercase);
        from_name.or_else(|| extension_for_mime(&self.mime_type).map(str::to_string))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" | "wave" => "audio/wav",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "aif" | "aiff" => "audio/aiff",
        _ => return None,
    };
    Some(mime)
}

fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let extension = match essence.as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => "wav",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/aac" | "audio/x-aac" => "aac",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/ogg" | "audio/vorbis" | "application/ogg" => "ogg",
        "audio/aiff" | "audio/x-aiff" => "aiff",
        _ => return None,
    };
    Some(extension)
}

/// Fully decoded audio: one sample vector per channel at the native rate.
///
/// Construction guarantees at least one channel, equal channel lengths and a
/// non-zero sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, NormalizeError> {
        if channels.is_empty() {
            return Err(NormalizeError::unsupported("audio has no channels"));
        }
        if sample_rate == 0 {
            return Err(NormalizeError::unsupported("audio reports a 0 Hz sample rate"));
        }
        let frames = channels[0].len();
        if let Some(idx) = channels.iter().position(|channel| channel.len() != frames) {
            return Err(NormalizeError::decode(format!(
                "channel {idx} has {} samples, expected {frames}",
                channels[idx].len()
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Split interleaved samples into channels, dropping a trailing partial frame.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, NormalizeError> {
        if channel_count == 0 {
            return Err(NormalizeError::unsupported("audio has no channels"));
        }
        let frames = samples.len() / channel_count;
        let mut channels: Vec<Vec<f32>> =
            (0..channel_count).map(|_| Vec::with_capacity(frames)).collect();
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(channels, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples in each channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Mono excerpt at the classifier's sample rate, ready for WAV encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedSample {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl NormalizedSample {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
