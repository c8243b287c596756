//! Errors raised while running a session.

use plotgrip_core::CoordinatorError;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown object name: {0}")]
    UnknownName(String),
    #[error("{0} has no artifact #{1}")]
    NoSuchArtifact(String, usize),
    #[error("Usage: {0}")]
    Usage(String),
}

/// Result type for session operations.
pub type AppResult<T> = Result<T, AppError>;
