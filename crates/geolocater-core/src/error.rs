//! Error types for configuration and preference storage.

use std::io;
use thiserror::Error;

/// Errors reported by [`ConfigStore`](crate::ConfigStore) operations.
///
/// None of these are fatal to the store: a failed call leaves every
/// configuration value exactly as it was.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key is not one of the recognized configuration keys.
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The key is recognized but owned by the host.
    #[error("Configuration key '{0}' is read-only")]
    ReadOnly(String),

    /// The value cannot be normalized to the key's type.
    #[error("Invalid value for '{key}': {reason}")]
    Validation { key: String, reason: String },

    /// An override coordinate is unset or not a number.
    #[error("Override coordinate '{key}' is missing or invalid")]
    MissingConfiguration { key: String },

    /// The preference backend failed.
    #[error("Preference storage error: {0}")]
    Storage(#[from] PrefError),
}

/// Errors raised by a [`PreferenceStore`](crate::PreferenceStore) backend.
#[derive(Debug, Error)]
pub enum PrefError {
    /// I/O error while reading or writing the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file is not a flat JSON object of strings and numbers.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
