//! Error types for notefile
//!
//! All errors use thiserror for structured error handling.
//! Every error maps onto one of the [`ErrorKind`]s that cross the HTTP
//! boundary, so callers never see an undifferentiated fault.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    /// `expected` is the version the caller sent, if any
    #[error("Version conflict on {id}: current version is {current}")]
    VersionConflict {
        id: String,
        expected: Option<i64>,
        current: i64,
    },

    #[error("{0}")]
    Generic(String),
}

/// Error classes visible to API consumers and the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    Validation,
    NotFound,
    VersionConflict,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Validation(_) | AppError::Serialization(_) => ErrorKind::Validation,
            AppError::FileNotFound(_) => ErrorKind::NotFound,
            AppError::VersionConflict { .. } => ErrorKind::VersionConflict,
            AppError::Database(_) | AppError::Io(_) | AppError::Http(_) | AppError::Generic(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status equivalent of this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Unauthorized => 401,
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::VersionConflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
