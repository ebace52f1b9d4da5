// builder.rs — Build a Proposal from an assistant message's text.
//
// The builder only normalizes: title fallback, display names, and summary
// fallback. It never invents a description and never drops a file write.

use sanction_directive::{scan, FileWrite, ParseReport};

use crate::ids::MessageId;
use crate::proposal::{FileChange, Proposal, FALLBACK_TITLE, NO_SUMMARY};

/// Build the proposal for `message_id` from its body text.
///
/// Returns None when the text carries neither a summary nor a file write:
/// there is nothing to review.
pub fn build(message_id: MessageId, text: &str) -> Option<Proposal> {
    build_from_report(message_id, &scan(text))
}

/// Build a proposal from an already scanned text.
pub fn build_from_report(message_id: MessageId, report: &ParseReport) -> Option<Proposal> {
    let summary = report.summary();
    let files_changed: Vec<FileChange> = report.file_writes().map(file_change).collect();

    if summary.is_none() && files_changed.is_empty() {
        tracing::debug!(%message_id, "no directives in message, nothing to propose");
        return None;
    }

    Some(Proposal {
        message_id,
        title: summary.unwrap_or(FALLBACK_TITLE).to_string(),
        files_changed,
    })
}

fn file_change(write: &FileWrite) -> FileChange {
    FileChange {
        path: write.path.clone(),
        display_name: display_name(&write.path).to_string(),
        summary: write
            .description
            .clone()
            .unwrap_or_else(|| NO_SUMMARY.to_string()),
    }
}

/// Last non-empty path segment. Accepts both `/` and `\` separators.
fn display_name(path: &str) -> &str {
    path.split(['/', '\\'])
        .rev()
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}
