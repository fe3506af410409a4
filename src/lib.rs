//! Library exports for the bangercheck pipeline, reused by the CLI and tests.
/// Application directory helpers.
pub mod app_dirs;
/// Decoding, windowing, downmixing and resampling of submitted audio.
pub mod audio;
/// Remote classifier contract and client.
pub mod classify;
/// Persisted settings loaded from `config.toml`.
pub mod config;
mod http_client;
/// Logging setup.
pub mod logging;
/// End-to-end pipeline and the single-flight background runner.
pub mod pipeline;
/// Canonical 16-bit PCM WAV encoding.
pub mod wav;
