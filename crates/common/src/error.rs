//! Error types shared across mocap-events crates.

use std::path::PathBuf;

/// Top-level error type for mocap-events operations.
#[derive(Debug, thiserror::Error)]
pub enum MocapError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Output error: {message}")]
    Output { message: String },
}

/// Result type alias using MocapError.
pub type MocapResult<T> = Result<T, MocapError>;

impl MocapError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output {
            message: msg.into(),
        }
    }
}
