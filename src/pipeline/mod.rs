//! Normalize → encode → classify, composed into one call.
//!
//! [`BangerCheck`] runs the stages synchronously on the calling thread.
//! [`PipelineRunner`] moves a run onto a worker thread and refuses a second
//! submission while one is still in flight.

mod error;
mod runner;

use std::time::Instant;

use tracing::info;

pub use error::{PipelineError, SubmitError};
pub use runner::{Pending, PipelineRunner};

use crate::audio::{AudioNormalizer, DecodingService, RawAudioInput};
use crate::classify::{Classification, ClassificationRule, ClassifierClient};
use crate::wav::{WavBytes, WavEncoder};

pub struct BangerCheck<D> {
    normalizer: AudioNormalizer<D>,
    encoder: WavEncoder,
    client: ClassifierClient,
    rule: ClassificationRule,
}

impl<D: DecodingService> BangerCheck<D> {
    pub fn new(
        normalizer: AudioNormalizer<D>,
        client: ClassifierClient,
        rule: ClassificationRule,
    ) -> Self {
        Self {
            normalizer,
            encoder: WavEncoder,
            client,
            rule,
        }
    }

    /// Normalize and encode without contacting the classifier.
    pub fn prepare(&self, input: RawAudioInput) -> Result<WavBytes, PipelineError> {
        let started = Instant::now();
        let sample = self.normalizer.normalize(input)?;
        let wav = self.encoder.encode_normalized(&sample)?;
        info!(
            "Prepared {:.2}s sample ({} bytes) in {:.0?}",
            sample.duration_seconds(),
            wav.len(),
            started.elapsed()
        );
        Ok(wav)
    }

    /// Send an already-encoded sample and apply the verdict rule.
    pub fn classify_wav(&self, wav: &WavBytes) -> Result<Classification, PipelineError> {
        let started = Instant::now();
        let response = self.client.predict(wav)?;
        let classification = self.rule.classify(response);
        info!(
            "Classifier said {:?} (prediction {:?}, score {:.3}) in {:.0?}",
            classification.verdict,
            classification.prediction,
            classification.score,
            started.elapsed()
        );
        Ok(classification)
    }

    pub fn run(&self, input: RawAudioInput) -> Result<Classification, PipelineError> {
        let wav = self.prepare(input)?;
        self.classify_wav(&wav)
    }
}
