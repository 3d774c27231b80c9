use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::core::wizard::{SaveError, ValidationError};

/// Failures raised by key-value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid storage key: `{0}`")]
    InvalidKey(String),
    #[error("No entry id is left after {0}")]
    IdsExhausted(u64),
}

/// Failures raised while loading or saving [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Reasons a device location request may come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("No location provider is configured")]
    Unavailable,
    #[error("Location request was denied: {0}")]
    Denied(String),
    #[error("Location provider failed: {0}")]
    Failed(String),
    #[error("Location request timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failures raised while writing a CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Unified error type surfaced to the command line.
#[derive(Debug, Error)]
pub enum QuickLogError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Prompt failed: {0}")]
    Prompt(String),
    #[error("Invalid input: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, QuickLogError>;

impl From<SaveError> for QuickLogError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Validation(err) => QuickLogError::Validation(err),
            SaveError::Storage(err) => QuickLogError::Storage(err),
        }
    }
}

impl From<dialoguer::Error> for QuickLogError {
    fn from(err: dialoguer::Error) -> Self {
        QuickLogError::Prompt(err.to_string())
    }
}
