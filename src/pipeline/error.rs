use thiserror::Error;

use crate::audio::NormalizeError;
use crate::classify::ClassifyError;
use crate::wav::EncodeError;

/// Why a submission produced no classification. Messages are user-facing.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("That file could not be read as audio ({message})")]
    Decode { message: String },
    #[error("That audio format is not supported ({message})")]
    UnsupportedFormat { message: String },
    #[error("Could not prepare the sample for upload: {0}")]
    Encode(#[from] EncodeError),
    #[error("Could not reach the classifier ({message})")]
    Network { message: String },
    #[error("The classifier could not score this sample ({message})")]
    Service { message: String },
    #[error("The classification worker stopped before finishing")]
    Interrupted,
}

impl From<NormalizeError> for PipelineError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Decode { message } => Self::Decode { message },
            NormalizeError::UnsupportedFormat { message } => Self::UnsupportedFormat { message },
        }
    }
}

impl From<ClassifyError> for PipelineError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Network(message) => Self::Network { message },
            other @ (ClassifyError::Status { .. } | ClassifyError::InvalidResponse(_)) => {
                Self::Service {
                    message: other.to_string(),
                }
            }
        }
    }
}

/// Why a submission was not started.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("A classification is already in progress")]
    InFlight,
    #[error("Failed to start the classification worker: {0}")]
    Spawn(std::io::Error),
}
