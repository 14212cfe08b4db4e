//! Error types for control point import/export operations.

use thiserror::Error;

use crate::crs::CrsError;

/// Errors that can occur while importing or exporting control points.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The source coordinate system could not be resolved or applied
    #[error("Coordinate system error: {0}")]
    Crs(#[from] CrsError),

    /// Invalid format structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Check if this error comes from an unresolvable projection descriptor.
    pub fn is_unresolvable_projection(&self) -> bool {
        matches!(self, Self::Crs(CrsError::UnresolvableProjection { .. }))
    }
}
