//! Error types for transition-state

use thiserror::Error;

/// Errors produced by bundle sinks.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Bundles are write-once; a second write for the same detection is rejected.
    #[error("bundle already written: {detection_id}")]
    AlreadyWritten { detection_id: String },

    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed bundle on line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("sink lock poisoned")]
    LockPoisoned,
}

/// Result type for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;
