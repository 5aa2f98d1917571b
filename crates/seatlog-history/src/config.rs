#![forbid(unsafe_code)]

//! History engine configuration.
//!
//! # Loading
//!
//! ```toml
//! # seatlog-history.toml
//! max_history_age_days = 30
//! persist_transient = false
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("seatlog-history.toml")?;
//! let config = HistoryConfig::from_settings(&store.borrow().settings);
//! ```

use std::path::Path;

use chrono::TimeDelta;
use seatlog_core::Settings;
use seatlog_core::settings::DEFAULT_MAX_UNDO_HISTORY_DAYS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted retention window, roughly a thousand years.
pub const MAX_HISTORY_AGE_DAYS: u32 = 365_000;

/// Tunables for the history controller and persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Persisted entries older than this are dropped on load.
    pub max_history_age_days: u32,

    /// Also request a flush after transient commands (live-session marks).
    /// For hosts that have no autosave timer.
    pub persist_transient: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_age_days: DEFAULT_MAX_UNDO_HISTORY_DAYS,
            persist_transient: false,
        }
    }
}

/// Error loading a [`HistoryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl HistoryConfig {
    /// Read the retention window from the host settings, falling back to the
    /// default when the key is missing or not a positive integer.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_history_age_days: settings
                .max_undo_history_days()
                .unwrap_or(DEFAULT_MAX_UNDO_HISTORY_DAYS),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::checked(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::checked(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Returns a list of validation errors; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_history_age_days == 0 {
            errors.push("max_history_age_days must be >= 1".to_string());
        }
        if self.max_history_age_days > MAX_HISTORY_AGE_DAYS {
            errors.push(format!(
                "max_history_age_days must be <= {MAX_HISTORY_AGE_DAYS}"
            ));
        }
        errors
    }

    /// The retention window as a duration, saturating at [`TimeDelta::MAX`].
    #[must_use]
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::try_days(i64::from(self.max_history_age_days)).unwrap_or(TimeDelta::MAX)
    }

    fn checked(config: Self) -> Result<Self, ConfigError> {
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
