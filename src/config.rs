//! Runtime configuration from `AEROLUNG_*` environment variables.
//!
//! Resolved once in `main`; nothing else reads the environment except the
//! log sanitizer's size cap.

use std::path::PathBuf;

use crate::domain::{parse_yes_no, FormDefaults};
use crate::{AeroLungError, Result};

pub const ENV_MODEL_PATH: &str = "AEROLUNG_MODEL_PATH";
pub const ENV_REPORT_DIR: &str = "AEROLUNG_REPORT_DIR";
pub const ENV_LOG_MODE: &str = "AEROLUNG_LOG_MODE";
pub const ENV_LOG_FILE: &str = "AEROLUNG_LOG_FILE";
pub const ENV_DEFAULT_FAMILY_HISTORY: &str = "AEROLUNG_DEFAULT_FAMILY_HISTORY";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "file" => Some(Self::File),
            "stdout" => Some(Self::Stdout),
            _ => None,
        }
    }

    /// Whether to log to a file, given whether stdout is interactive.
    #[must_use]
    pub fn uses_file(self, interactive: bool) -> bool {
        match self {
            Self::Auto => interactive,
            Self::File => true,
            Self::Stdout => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Model directory or direct artifact path.
    pub model_path: PathBuf,
    pub report_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub form_defaults: FormDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            report_dir: PathBuf::from("reports"),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("aerolung.log"),
            form_defaults: FormDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Config` naming the variable whose value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    /// Returns `Config` naming the variable whose value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_MODEL_PATH) {
            config.model_path = PathBuf::from(path);
        }
        if let Some(dir) = get(ENV_REPORT_DIR) {
            config.report_dir = PathBuf::from(dir);
        }
        if let Some(file) = get(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(file);
        }
        if let Some(mode) = get(ENV_LOG_MODE) {
            config.log_mode = LogMode::parse(&mode).ok_or_else(|| {
                AeroLungError::Config(format!(
                    "{ENV_LOG_MODE}: expected auto, file or stdout, got {mode:?}"
                ))
            })?;
        }
        if let Some(value) = get(ENV_DEFAULT_FAMILY_HISTORY) {
            let yes = parse_yes_no(value.trim())
                .map_err(|e| AeroLungError::Config(format!("{ENV_DEFAULT_FAMILY_HISTORY}: {e}")))?;
            config.form_defaults = config.form_defaults.with_family_history(yes);
        }

        Ok(config)
    }
}
