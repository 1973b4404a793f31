//! Error types shared by the release helpers

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed input in {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("Missing field in {}: {field}", path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvironment(Vec<&'static str>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PortError>;

impl PortError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        PortError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        PortError::MalformedInput {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_field(path: &Path, field: impl Into<String>) -> Self {
        PortError::MissingField {
            path: path.to_path_buf(),
            field: field.into(),
        }
    }

    /// Conditions outside the expected taxonomy; these get a stack trace when reported.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, PortError::Io { .. } | PortError::Json(_))
    }
}
