use thiserror::Error;

/// Failures while turning submitted bytes into a normalized sample.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The bytes could not be parsed as audio.
    #[error("Could not decode audio: {message}")]
    Decode { message: String },
    /// The audio decoded far enough to be recognised but its layout or codec is not handled.
    #[error("Unsupported audio format: {message}")]
    UnsupportedFormat { message: String },
}

impl NormalizeError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }
}

/// Rejected normalization parameters.
#[derive(Debug, Error, PartialEq)]
#[error("Invalid normalize settings: {message}")]
pub struct InvalidSettings {
    pub message: String,
}
