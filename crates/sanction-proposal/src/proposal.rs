// proposal.rs — Proposal: the reviewable summary of one assistant message.
//
// Serialized with camelCase keys because the consumer is usually a UI layer
// reading JSON (`filesChanged`, `displayName`).

use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Title used when the message has file writes but no summary tag.
pub const FALLBACK_TITLE: &str = "Proposed File Changes";

/// Per-file summary used when a write carries no description.
pub const NO_SUMMARY: &str = "(no change summary found)";

/// One file the proposal would touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// Full path as given by the directive; this is what gets applied.
    pub path: String,

    /// Last path segment, for display.
    pub display_name: String,

    /// The directive's description, or [`NO_SUMMARY`].
    pub summary: String,
}

/// A reviewable set of file changes derived from exactly one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// The message this proposal was derived from. Approval is keyed on it.
    pub message_id: MessageId,

    /// The parsed summary, or [`FALLBACK_TITLE`].
    pub title: String,

    /// Files in directive encounter order (duplicates kept).
    pub files_changed: Vec<FileChange>,
}

impl Proposal {
    /// Distinct paths touched, in first-encounter order.
    pub fn distinct_paths(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for change in &self.files_changed {
            if !seen.contains(&change.path.as_str()) {
                seen.push(change.path.as_str());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(path: &str, summary: &str) -> FileChange {
        FileChange {
            path: path.to_string(),
            display_name: path.rsplit('/').next().unwrap_or(path).to_string(),
            summary: summary.to_string(),
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let proposal = Proposal {
            message_id: MessageId(9),
            title: "t".to_string(),
            files_changed: vec![change("src/a.ts", NO_SUMMARY)],
        };
        let json = serde_json::to_value(&proposal).unwrap();
        assert_eq!(json["messageId"], 9);
        assert_eq!(json["filesChanged"][0]["displayName"], "a.ts");
        assert_eq!(json["filesChanged"][0]["summary"], NO_SUMMARY);
    }

    #[test]
    fn distinct_paths_keeps_first_encounter_order() {
        let proposal = Proposal {
            message_id: MessageId(1),
            title: FALLBACK_TITLE.to_string(),
            files_changed: vec![
                change("b", NO_SUMMARY),
                change("a", "x"),
                change("b", "again"),
            ],
        };
        assert_eq!(proposal.distinct_paths(), vec!["b", "a"]);
    }
}
