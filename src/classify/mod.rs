//! Remote classifier contract: the JSON reply, the verdict rule and the upload client.
//!
//! The service answers `{ "prediction": <label>, "score": <0..1> }`. A track
//! counts as a banger when the label matches the positive label OR the score
//! clears the threshold. The two can disagree: `{"prediction": "not_bangers",
//! "score": 0.9}` is a banger under this rule, and the raw prediction is kept
//! on [`Classification`] so callers can surface the disagreement.

mod client;

use serde::Deserialize;
use thiserror::Error;

pub use client::{ClassifierClient, MULTIPART_FIELD_NAME};

/// Label the service uses for the positive class.
pub const DEFAULT_POSITIVE_LABEL: &str = "bangers";
/// Scores strictly above this count as a banger.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Body of a successful classifier response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PredictionResponse {
    pub prediction: String,
    pub score: f64,
}

impl PredictionResponse {
    /// Parse and validate a response body.
    pub fn parse(body: &[u8]) -> Result<Self, ClassifyError> {
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ClassifyError::InvalidResponse(
                "Empty response body".to_string(),
            ));
        }
        let parsed: PredictionResponse = serde_json::from_str(trimmed)
            .map_err(|err| ClassifyError::InvalidResponse(format!("{err}: {trimmed}")))?;
        if !parsed.score.is_finite() || !(0.0..=1.0).contains(&parsed.score) {
            return Err(ClassifyError::InvalidResponse(format!(
                "score {} is outside [0, 1]",
                parsed.score
            )));
        }
        Ok(parsed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Banger,
    NotBanger,
}

impl Verdict {
    pub fn is_banger(self) -> bool {
        matches!(self, Self::Banger)
    }
}

/// Final result handed to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    /// Label exactly as returned by the service.
    pub prediction: String,
    pub score: f64,
}

/// Turns a prediction into a verdict.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationRule {
    positive_label: String,
    score_threshold: f64,
}

impl ClassificationRule {
    pub fn new(positive_label: impl Into<String>, score_threshold: f64) -> Self {
        Self {
            positive_label: positive_label.into(),
            score_threshold,
        }
    }

    pub fn positive_label(&self) -> &str {
        &self.positive_label
    }

    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    pub fn classify(&self, response: PredictionResponse) -> Classification {
        let label_match = response
            .prediction
            .eq_ignore_ascii_case(&self.positive_label);
        let verdict = if label_match || response.score > self.score_threshold {
            Verdict::Banger
        } else {
            Verdict::NotBanger
        };
        Classification {
            verdict,
            prediction: response.prediction,
            score: response.score,
        }
    }
}

impl Default for ClassificationRule {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIVE_LABEL, DEFAULT_SCORE_THRESHOLD)
    }
}

/// Failures talking to the classifier.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The request could not be sent or timed out.
    #[error("Could not reach the classifier: {0}")]
    Network(String),
    /// The service answered with a non-2xx status.
    #[error("Classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The service answered 2xx with a body that is not a valid prediction.
    #[error("Classifier sent an invalid response: {0}")]
    InvalidResponse(String),
}
