//! Error types for the arbore core library.
//!
//! Uses `thiserror` for the public error type shared by the generator and the
//! loaders. The binary wraps these in `anyhow` at the top level.

use std::path::PathBuf;

/// Top-level error type for arbore operations.
#[derive(Debug, thiserror::Error)]
pub enum ArboreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("Only JSON files are supported. Got: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ArboreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Whether the error describes bad user input rather than a runtime failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::NotFound { .. } | Self::UnsupportedFormat { .. }
        )
    }
}

pub type Result<T, E = ArboreError> = std::result::Result<T, E>;
