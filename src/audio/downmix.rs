use tracing::debug;

use super::{DecodedAudio, NormalizeError};

/// Channels that take part in the mono downmix.
///
/// Only the first two channels of a source are ever read. Surround layouts
/// therefore collapse to the average of their front pair, which is a known
/// simplification rather than a proper surround fold-down.
#[derive(Clone, Copy, Debug)]
pub enum ChannelLayout<'a> {
    Mono(&'a [f32]),
    Stereo { left: &'a [f32], right: &'a [f32] },
}

impl<'a> ChannelLayout<'a> {
    pub fn from_decoded(decoded: &'a DecodedAudio) -> Result<Self, NormalizeError> {
        match (decoded.channel(0), decoded.channel(1)) {
            (Some(left), Some(right)) => {
                if decoded.channel_count() > 2 {
                    debug!(
                        "Ignoring {} channel(s) beyond the first two",
                        decoded.channel_count() - 2
                    );
                }
                Ok(Self::Stereo { left, right })
            }
            (Some(mono), None) => Ok(Self::Mono(mono)),
            _ => Err(NormalizeError::unsupported("audio has no channels")),
        }
    }

    pub fn frames(&self) -> usize {
        match self {
            Self::Mono(samples) => samples.len(),
            Self::Stereo { left, right } => left.len().min(right.len()),
        }
    }

    /// Mono value of `frame`; reads past the end of the stream yield silence.
    pub fn sample_at(&self, frame: usize) -> f32 {
        match self {
            Self::Mono(samples) => read_or_silence(samples, frame),
            Self::Stereo { left, right } => {
                (read_or_silence(left, frame) + read_or_silence(right, frame)) / 2.0
            }
        }
    }
}

fn read_or_silence(samples: &[f32], frame: usize) -> f32 {
    match samples.get(frame) {
        Some(sample) if sample.is_finite() => *sample,
        _ => 0.0,
    }
}
