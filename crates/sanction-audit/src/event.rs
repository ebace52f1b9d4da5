// event.rs — Audit event data model.
//
// One event per line in the JSONL log. `previous_hash` is filled in by
// AuditLog::append and links each event to the line before it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sanction_proposal::{ConversationId, MessageId};

/// What kind of action an event records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A proposal was approved and its message marked `approved`.
    Approved,
    /// A proposal was rejected and its message marked `rejected`.
    Rejected,
    /// A file was written while applying an approved proposal.
    FileWritten,
    /// A single file write failed; the rest of the batch continued.
    FileWriteFailed,
    /// The batch could not be applied at all; the message stays `pending`.
    ApplyAborted,
}

/// A single audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,

    /// When the event was recorded (UTC).
    pub timestamp: DateTime<Utc>,

    /// Who caused it (the configured reviewer identity).
    pub actor: String,

    pub action: AuditAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,

    /// The path affected, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// SHA-256 of the content written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Change-summary text associated with the target (description or fallback).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Error text for failed or aborted actions, warnings for approvals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Hash of the previous line in the log; None for the first event.
    pub previous_hash: Option<String>,
}

impl AuditEvent {
    /// New event stamped now, with a fresh id.
    pub fn new(actor: impl Into<String>, action: AuditAction) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: actor.into(),
            action,
            conversation_id: None,
            message_id: None,
            target: None,
            content_hash: None,
            summary: None,
            detail: None,
            previous_hash: None,
        }
    }

    /// Attach the conversation and message the event belongs to.
    pub fn for_message(mut self, conversation_id: ConversationId, message_id: MessageId) -> Self {
        self.conversation_id = Some(conversation_id);
        self.message_id = Some(message_id);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
