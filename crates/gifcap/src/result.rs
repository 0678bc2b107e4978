//! Result and error types for Gifcap.

use thiserror::Error;

/// Result type for Gifcap operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors that can occur while capturing or encoding
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Operation conflicts with one already in progress (saving, recording)
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state or context)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Frame dimensions or pixel buffer are malformed
    #[error("Invalid frame: {message}")]
    InvalidFrame {
        /// Error message
        message: String,
    },

    /// GIF or image processing failure (resizing, quantization, encoding)
    #[error("Encoding failed: {message}")]
    Encode {
        /// Error message
        message: String,
    },

    /// Encode worker terminated without reporting a result
    #[error("Encode worker panicked: {message}")]
    WorkerPanicked {
        /// Error message
        message: String,
    },

    /// Configuration could not be parsed or serialized
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    /// Create a conflict error
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an invalid frame error
    #[must_use]
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }

    /// Create an encoding error
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error reports a conflicting operation in progress
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
