//! Error types for the Lumen captioning pipeline.
//!
//! Per-file errors (`CaptionError`) never abort a batch: the captioner logs
//! them and moves on. Only setup failures (`ConfigError`, discovery of the
//! input directory) surface as a top-level `LumenError`.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input directory could not be listed
    #[error("Cannot read input directory {path}: {message}")]
    Discovery { path: PathBuf, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors for a single image, organized by stage.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Source image could not be opened or read
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Network, HTTP or payload failure talking to the inference service
    #[error("{message}")]
    Request {
        message: String,
        status_code: Option<u16>,
    },

    /// The service answered but produced no caption text
    #[error("No caption generated for {path}: {reason}")]
    EmptyResponse { path: PathBuf, reason: String },

    /// The request did not complete within the configured timeout
    #[error("Request for {path} timed out after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },

    /// Caption text could not be written next to the image
    #[error("Failed to write caption {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl CaptionError {
    /// Whether this error counts as a failed file.
    ///
    /// An empty response is reported but is not a hard failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, CaptionError::EmptyResponse { .. })
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;
