// result.rs — Per-action and aggregate outcomes of an apply.

use serde::{Deserialize, Serialize};

/// Whether a single file action went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Success,
    Failure,
}

/// The outcome of one file-write directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileActionResult {
    /// Path as given by the directive.
    pub path: String,

    pub outcome: ActionOutcome,

    /// Why the action failed. Only set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Change-summary text recorded for this path: the directive's
    /// description, or the "no summary" fallback.
    pub summary: String,

    /// SHA-256 of the content that was written. Only set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl FileActionResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == ActionOutcome::Success
    }
}

/// All results of one apply, in directive order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub results: Vec<FileActionResult>,

    /// True only when every action succeeded (vacuously true for no actions).
    pub success: bool,
}

impl AggregateResult {
    pub fn from_results(results: Vec<FileActionResult>) -> Self {
        let success = results.iter().all(FileActionResult::succeeded);
        Self { results, success }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileActionResult> {
        self.results.iter().filter(|r| !r.succeeded())
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    /// One line per failed action, or None when everything succeeded.
    pub fn failure_report(&self) -> Option<String> {
        if self.success {
            return None;
        }
        let lines: Vec<String> = self
            .failures()
            .map(|r| format!("{}: {}", r.path, r.error.as_deref().unwrap_or("unknown error")))
            .collect();
        Some(format!(
            "{} of {} file action(s) failed:\n{}",
            lines.len(),
            self.results.len(),
            lines.join("\n")
        ))
    }
}
