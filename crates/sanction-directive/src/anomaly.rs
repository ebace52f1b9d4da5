// anomaly.rs — Recoverable parse anomalies.
//
// Anomalies are not errors: the parser drops the offending tag and keeps
// going. They are collected so callers can log or display them, and carry
// the byte offset of the tag's `<` in the scanned text.

use std::fmt;

use serde::Serialize;

/// A malformed or incomplete tag that was skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "anomaly", rename_all = "snake_case")]
pub enum ParseAnomaly {
    /// `<sanction-` followed by something that isn't a well-formed opening tag
    /// (unquoted attribute, missing `>`, ...).
    MalformedTag { offset: usize },

    /// A well-formed tag in our namespace that no directive uses.
    UnknownTag { name: String, offset: usize },

    /// The opening tag has no matching close before the text ends (or before
    /// the same tag is opened again).
    Unterminated { tag: String, offset: usize },

    /// A required attribute is absent or blank.
    MissingAttribute {
        tag: String,
        attribute: String,
        offset: usize,
    },

    /// A self-closing form of a tag that needs a body.
    MissingContent { tag: String, offset: usize },

    /// A summary tag whose body is empty or whitespace.
    EmptySummary { offset: usize },
}

impl ParseAnomaly {
    /// Byte offset of the offending tag in the scanned text.
    pub fn offset(&self) -> usize {
        match self {
            ParseAnomaly::MalformedTag { offset }
            | ParseAnomaly::UnknownTag { offset, .. }
            | ParseAnomaly::Unterminated { offset, .. }
            | ParseAnomaly::MissingAttribute { offset, .. }
            | ParseAnomaly::MissingContent { offset, .. }
            | ParseAnomaly::EmptySummary { offset } => *offset,
        }
    }
}

impl fmt::Display for ParseAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAnomaly::MalformedTag { offset } => {
                write!(f, "malformed tag at byte {offset}")
            }
            ParseAnomaly::UnknownTag { name, offset } => {
                write!(f, "unknown tag <{name}> at byte {offset}")
            }
            ParseAnomaly::Unterminated { tag, offset } => {
                write!(f, "unterminated <{tag}> at byte {offset}")
            }
            ParseAnomaly::MissingAttribute {
                tag,
                attribute,
                offset,
            } => write!(f, "<{tag}> at byte {offset} has no {attribute}"),
            ParseAnomaly::MissingContent { tag, offset } => {
                write!(f, "<{tag}/> at byte {offset} has no content")
            }
            ParseAnomaly::EmptySummary { offset } => {
                write!(f, "empty summary at byte {offset}")
            }
        }
    }
}
