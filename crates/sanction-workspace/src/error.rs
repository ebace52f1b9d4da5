// error.rs — Error types for applying file actions.
//
// WorkspaceError is per action: it ends up as text in a FileActionResult and
// never stops the batch. ApplyError is structural: the batch didn't run.

use std::path::PathBuf;

use sanction_proposal::ConversationId;
use thiserror::Error;

/// A single file action failed.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path is absolute, climbs out with `..`, or resolves (through a
    /// symlink) outside the project root.
    #[error("path escapes project root: '{path}'")]
    PathEscapesRoot { path: String },

    /// The path names no file (empty, or only `.` components).
    #[error("invalid path: '{path}'")]
    InvalidPath { path: String },
}

/// The batch could not be processed at all.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// No project root is known for the conversation.
    #[error("no project root for conversation {0}")]
    ProjectNotFound(ConversationId),

    /// The project root is missing or is not a directory.
    #[error("project root {path} is unavailable: {reason}")]
    RootUnavailable { path: PathBuf, reason: String },
}
