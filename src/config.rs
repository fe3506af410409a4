//! Persisted settings stored as `config.toml` in the app root.
//!
//! Every key is optional; missing keys fall back to the defaults below, and a
//! missing file means "all defaults".

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::app_dirs;
use crate::audio::{InvalidSettings, NormalizeSettings, TARGET_DURATION_SECONDS, TARGET_SAMPLE_RATE};
use crate::classify::{ClassificationRule, DEFAULT_POSITIVE_LABEL, DEFAULT_SCORE_THRESHOLD};

pub const CONFIG_FILE_NAME: &str = "config.toml";
const MIN_TIMEOUT_SECONDS: u64 = 1;
const MIN_RESPONSE_BYTES: usize = 1024;

/// Errors that may occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory found: {0}")]
    NoConfigDir(#[from] app_dirs::AppDirError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config for {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: InvalidSettings,
    },
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

/// `[normalize]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f64,
}

impl NormalizeConfig {
    pub fn to_settings(&self) -> Result<NormalizeSettings, InvalidSettings> {
        NormalizeSettings::new(self.sample_rate, self.duration_seconds)
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            duration_seconds: default_duration_seconds(),
        }
    }
}

/// `[classifier]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// HTTPS endpoint that accepts the multipart upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_upload_file_name")]
    pub upload_file_name: String,
    #[serde(default = "default_positive_label")]
    pub positive_label: String,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl ClassifierSettings {
    /// Clamp out-of-range values and drop a blank endpoint.
    pub fn normalized(mut self) -> Self {
        self.endpoint = self
            .endpoint
            .map(|endpoint| endpoint.trim().to_string())
            .filter(|endpoint| !endpoint.is_empty());
        if self.upload_file_name.trim().is_empty() {
            self.upload_file_name = default_upload_file_name();
        }
        self.score_threshold = if self.score_threshold.is_finite() {
            self.score_threshold.clamp(0.0, 1.0)
        } else {
            default_score_threshold()
        };
        self.connect_timeout_seconds = self.connect_timeout_seconds.max(MIN_TIMEOUT_SECONDS);
        self.request_timeout_seconds = self.request_timeout_seconds.max(MIN_TIMEOUT_SECONDS);
        self.max_response_bytes = self.max_response_bytes.max(MIN_RESPONSE_BYTES);
        self
    }

    pub fn rule(&self) -> ClassificationRule {
        ClassificationRule::new(self.positive_label.clone(), self.score_threshold)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            upload_file_name: default_upload_file_name(),
            positive_label: default_positive_label(),
            score_threshold: default_score_threshold(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

fn default_sample_rate() -> u32 {
    TARGET_SAMPLE_RATE
}

fn default_duration_seconds() -> f64 {
    TARGET_DURATION_SECONDS
}

fn default_upload_file_name() -> String {
    "processed_audio.wav".to_string()
}

fn default_positive_label() -> String {
    DEFAULT_POSITIVE_LABEL.to_string()
}

fn default_score_threshold() -> f64 {
    DEFAULT_SCORE_THRESHOLD
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_request_timeout_seconds() -> u64 {
    60
}

fn default_max_response_bytes() -> usize {
    64 * 1024
}

/// Resolve the configuration file path, ensuring the app root exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load `config.toml` from the app root, returning defaults if it is missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_from(&config_path()?)
}

/// Load settings from `path`, returning defaults if the file does not exist.
pub fn load_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        debug!("No config at {}; using defaults", path.display());
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut settings: AppSettings = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    settings.normalize.to_settings().map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    settings.classifier = settings.classifier.normalized();
    Ok(settings)
}

/// Write `settings` to `path`, creating parent directories as needed.
pub fn save_to_path(settings: &AppSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
