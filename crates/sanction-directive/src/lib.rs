//! # sanction-directive
//!
//! Extraction of tagged directives from free-form assistant replies.
//!
//! An assistant reply is prose with structured instructions embedded inline:
//!
//! ```text
//! Sure, here's the change.
//! <sanction-chat-summary>Rename util</sanction-chat-summary>
//! <sanction-write path="src/a.ts" description="Export a constant">
//! export const a=1;
//! </sanction-write>
//! ```
//!
//! The parser never fails. Malformed, unknown, or unterminated tags are
//! dropped and reported as [`ParseAnomaly`] values; every well-formed
//! directive around them is still extracted.
//!
//! ## Key components
//!
//! - [`Directive`] — a summary or a [`FileWrite`], in encounter order
//! - [`scan`] — full pass returning a [`ParseReport`] (directives + anomalies)
//! - [`extract_summary`] / [`extract_file_writes`] — the narrow accessors most
//!   callers need

pub mod anomaly;
pub mod directive;
pub mod parser;

pub use anomaly::ParseAnomaly;
pub use directive::{Directive, FileWrite};
pub use parser::{
    extract_directives, extract_file_writes, extract_summary, scan, ParseReport, SUMMARY_TAG,
    WRITE_TAG,
};
