//! Core error types for tomodoro-core.
//!
//! The reducer itself cannot fail. Errors come from the edges: settings
//! rejected at the store boundary, a driver handle used after shutdown,
//! the configuration file, and the audio side effect.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Tick driver errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not name a configuration value
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Tick driver errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The handle outlived its driver task.
    #[error("timer driver is not running")]
    NotRunning,
}

/// Notification sound errors. Never propagated past the driver.
#[derive(Error, Debug)]
pub enum ChimeError {
    #[error("audio output unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for DriverError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        DriverError::NotRunning
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for DriverError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        DriverError::NotRunning
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
