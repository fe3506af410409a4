//! Where bangercheck keeps its files.
//!
//! Everything lives in one `.bangercheck` folder under the OS config directory
//! (`%APPDATA%` on Windows, `~/.config` on Linux). Setting
//! `BANGERCHECK_CONFIG_HOME` moves that folder under another base directory,
//! which is how tests and portable setups isolate themselves.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the base config directory.
pub const APP_DIR_NAME: &str = ".bangercheck";
/// Environment variable that replaces the base config directory.
pub const CONFIG_HOME_ENV: &str = "BANGERCHECK_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No base config directory could be determined for bangercheck files")]
    NoBaseDir,
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// `<base>/.bangercheck`, created on demand.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = resolve_base_dir(std::env::var_os(CONFIG_HOME_ENV)).ok_or(AppDirError::NoBaseDir)?;
    app_root_in(&base)
}

/// `<base>/.bangercheck/logs`, created on demand.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    create_all(app_root_dir()?.join(LOGS_DIR_NAME))
}

/// A non-empty override wins; otherwise fall back to the platform config dir.
fn resolve_base_dir(override_dir: Option<OsString>) -> Option<PathBuf> {
    match override_dir.filter(|value| !value.is_empty()) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

fn app_root_in(base: &Path) -> Result<PathBuf, AppDirError> {
    create_all(base.join(APP_DIR_NAME))
}

fn create_all(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}
