// directive.rs — Directive data model.
//
// A Directive is one structured instruction recovered from an assistant
// reply. Only two kinds exist: a free-text summary of the whole change and
// a file write. Directives carry exactly what the tag said; defaults such as
// fallback titles or summaries are applied later by the proposal builder.

use serde::{Deserialize, Serialize};

/// A request to write `content` to `path` (relative to the project root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWrite {
    /// Target path exactly as the tag gave it (leading/trailing whitespace trimmed).
    pub path: String,

    /// Raw file content. Written verbatim.
    pub content: String,

    /// Optional human-readable description of the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FileWrite {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            description: None,
        }
    }

    /// Set the description and return self (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A structured instruction extracted from text.
///
/// Serializes as `{"kind": "summary", "text": ...}` or
/// `{"kind": "file_write", "path": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    /// A one-line title/summary for the whole change.
    Summary { text: String },

    /// Write a file.
    FileWrite(FileWrite),
}

impl Directive {
    /// The summary text, if this is a summary directive.
    pub fn as_summary(&self) -> Option<&str> {
        match self {
            Directive::Summary { text } => Some(text),
            Directive::FileWrite(_) => None,
        }
    }

    /// The file write, if this is a file-write directive.
    pub fn as_file_write(&self) -> Option<&FileWrite> {
        match self {
            Directive::FileWrite(write) => Some(write),
            Directive::Summary { .. } => None,
        }
    }
}
