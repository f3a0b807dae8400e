//! Error types for screen operations.

use thiserror::Error;

/// Screen error type.
#[derive(Error, Debug)]
pub enum ScreenError {
    /// A line index fell outside the buffer.
    #[error("line index {index} out of range (buffer has {len} lines)")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Buffer length at the time of the access.
        len: usize,
    },

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No module registered a capability under this name.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for screen operations.
pub type Result<T> = std::result::Result<T, ScreenError>;
