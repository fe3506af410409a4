use tracing::debug;

use super::resample::resample_window;
use super::{
    ChannelLayout, DecodedAudio, DecodingService, InvalidSettings, NormalizeError,
    NormalizedSample, RawAudioInput, SampleWindow, TARGET_DURATION_SECONDS, TARGET_SAMPLE_RATE,
};

/// Output format of the normalizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizeSettings {
    sample_rate: u32,
    duration_seconds: f64,
}

impl NormalizeSettings {
    pub fn new(sample_rate: u32, duration_seconds: f64) -> Result<Self, InvalidSettings> {
        if sample_rate == 0 {
            return Err(InvalidSettings {
                message: "sample_rate must be greater than 0".to_string(),
            });
        }
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(InvalidSettings {
                message: format!("duration_seconds must be positive, got {duration_seconds}"),
            });
        }
        Ok(Self {
            sample_rate,
            duration_seconds,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            duration_seconds: TARGET_DURATION_SECONDS,
        }
    }
}

/// Decodes a submission and reduces it to a centered mono excerpt.
#[derive(Clone, Debug)]
pub struct AudioNormalizer<D> {
    decoder: D,
    settings: NormalizeSettings,
}

impl<D: DecodingService> AudioNormalizer<D> {
    /// Normalizer producing 10 seconds at 22050 Hz.
    pub fn new(decoder: D) -> Self {
        Self::with_settings(decoder, NormalizeSettings::default())
    }

    pub fn with_settings(decoder: D, settings: NormalizeSettings) -> Self {
        Self { decoder, settings }
    }

    pub fn settings(&self) -> NormalizeSettings {
        self.settings
    }

    pub fn normalize(&self, input: RawAudioInput) -> Result<NormalizedSample, NormalizeError> {
        let decoded = self.decoder.decode(input)?;
        self.normalize_decoded(&decoded)
    }

    /// Window, downmix and resample already-decoded audio.
    pub fn normalize_decoded(
        &self,
        decoded: &DecodedAudio,
    ) -> Result<NormalizedSample, NormalizeError> {
        let layout = ChannelLayout::from_decoded(decoded)?;
        let rate = self.settings.sample_rate;
        let window = SampleWindow::centered(decoded.duration_seconds(), self.settings.duration_seconds);
        let first = window.start_index(rate);
        let count = window.sample_count(rate);
        debug!(
            "Window {:.3}s..{:.3}s of {:.3}s -> {count} samples @ {rate} Hz from {} Hz",
            window.start_seconds,
            window.end_seconds,
            decoded.duration_seconds(),
            decoded.sample_rate()
        );
        let samples = resample_window(&layout, decoded.sample_rate(), rate, first, count);
        Ok(NormalizedSample::new(samples, rate))
    }
}
