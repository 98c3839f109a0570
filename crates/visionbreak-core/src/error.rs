//! Core error types for visionbreak-core.
//!
//! Nothing on the timer path performs I/O. Failures come from settings
//! persistence, malformed user input, or a display collaborator that went
//! away.

use std::path::PathBuf;
use thiserror::Error;

use crate::ipc::DisplayId;

/// Core error type for visionbreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Display surface or status indicator errors
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// The controller task is no longer running
    #[error("Controller is not running")]
    ControllerClosed,
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

    /// Data directory could not be created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Time of day not in HH:MM form
    #[error("Invalid time of day '{0}': expected HH:MM")]
    InvalidTimeOfDay(String),
}

/// Errors reported by display surfaces and the status indicator.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The display is no longer attached
    #[error("Display {0} is not attached")]
    DisplayMissing(DisplayId),

    /// Rendering backend rejected the request
    #[error("Surface backend failed: {0}")]
    Backend(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
