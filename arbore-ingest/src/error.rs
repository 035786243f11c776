//! Error types for the loaders.

use arbore_core::ArboreError;

/// Errors raised while moving records into a warehouse.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Core(#[from] ArboreError),

    #[error("Warehouse error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Stage error: {0}")]
    Stage(String),

    #[error("Pipe {pipe} rejected files: {message}")]
    Pipe { pipe: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    pub fn pipe(pipe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipe {
            pipe: pipe.into(),
            message: message.into(),
        }
    }

    /// Whether the failure was caused by the input (missing file, wrong
    /// extension) rather than the warehouse.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_user_error())
    }
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
