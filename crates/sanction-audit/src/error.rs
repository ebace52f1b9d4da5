// error.rs — Error types for the audit log.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or reading the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to open or create the log file.
    #[error("failed to open audit log at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write or read a line.
    #[error("audit log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line is not a valid event.
    #[error("malformed audit event: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The hash chain is broken at `line` (1-based).
    #[error("integrity check failed at line {line}: expected hash {expected}, got {actual}")]
    IntegrityViolation {
        line: usize,
        expected: String,
        actual: String,
    },
}
