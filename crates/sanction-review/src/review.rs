// review.rs — Reviewer: the approval state machine for assistant messages.
//
// Approve:
//   1. Claim the message id (one review per message at a time).
//   2. Load it; it must be an assistant message of the conversation and
//      still `pending`.
//   3. Apply its file directives. A structural failure stops here and the
//      message stays `pending`.
//   4. Commit `approved` with a conditional store update.
//   5. Record the summary as conversation title, audit the decision.
//
// Reject runs 1, 2 and 4 with `rejected` and never touches the file system.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use sanction_audit::{AuditAction, AuditEvent, AuditLog, SharedAuditLog};
use sanction_directive::scan;
use sanction_proposal::{build, ConversationId, MessageId, Proposal};
use sanction_workspace::{ActionProcessor, AggregateResult, ProjectRoots};

use crate::error::ReviewError;
use crate::message::{ApprovalState, Message};
use crate::store::MessageStore;

/// The result of a committed approval.
#[derive(Debug, Clone, Serialize)]
pub struct Approval {
    pub message_id: MessageId,

    /// Per-file outcomes of the apply.
    pub result: AggregateResult,

    /// Set when some file actions failed. The approval still stands.
    pub warning: Option<String>,
}

/// Drives messages from `pending` to `approved` or `rejected`.
pub struct Reviewer<S: MessageStore, R: ProjectRoots> {
    store: S,
    processor: ActionProcessor<R>,
    audit_log: Option<SharedAuditLog>,

    /// Identity recorded on audit events.
    actor: String,

    /// Message ids with an approve or reject currently running.
    in_flight: Mutex<HashSet<MessageId>>,
}

impl<S: MessageStore, R: ProjectRoots> Reviewer<S, R> {
    pub fn new(store: S, processor: ActionProcessor<R>) -> Self {
        Self {
            store,
            processor,
            audit_log: None,
            actor: "human".to_string(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Audit decisions and file writes in `log`, attributed to `actor`.
    pub fn with_audit_log(mut self, log: SharedAuditLog, actor: impl Into<String>) -> Self {
        let actor = actor.into();
        self.processor = self.processor.with_audit_log(log.clone(), actor.clone());
        self.audit_log = Some(log);
        self.actor = actor;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn processor(&self) -> &ActionProcessor<R> {
        &self.processor
    }

    /// The latest assistant message of the conversation with its proposal,
    /// if that message is still `pending` and carries any directive.
    pub fn get_actionable_message(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<(Message, Proposal)>, ReviewError> {
        let Some(message) = self.store.find_latest_assistant_message(conversation_id)? else {
            return Ok(None);
        };
        if message.approval_state.is_terminal() {
            tracing::debug!(
                %conversation_id,
                message_id = %message.id,
                state = %message.approval_state,
                "latest assistant message already reviewed"
            );
            return Ok(None);
        }
        Ok(build(message.id, &message.body).map(|proposal| (message, proposal)))
    }

    /// Apply the message's file directives and mark it `approved`.
    pub fn approve(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Approval, ReviewError> {
        let _claim = self.claim(message_id)?;
        let message = self.pending_message(conversation_id, message_id)?;

        let report = scan(&message.body);
        let result = self
            .processor
            .apply_message(&report.directives, conversation_id, message_id)?;

        self.commit(conversation_id, message_id, ApprovalState::Approved)?;

        if let Some(summary) = report.summary() {
            if let Err(e) = self.store.record_conversation_title(conversation_id, summary) {
                tracing::warn!(%conversation_id, "failed to record conversation title: {}", e);
            }
        }

        let warning = result.failure_report();
        if let Some(warning) = &warning {
            tracing::warn!(%message_id, "approved with failed file actions: {}", warning);
        }

        let mut event = AuditEvent::new(&self.actor, AuditAction::Approved)
            .for_message(conversation_id, message_id);
        if let Some(summary) = report.summary() {
            event = event.with_summary(summary);
        }
        if let Some(warning) = &warning {
            event = event.with_detail(warning);
        }
        self.audit(event);

        Ok(Approval {
            message_id,
            result,
            warning,
        })
    }

    /// Mark the message `rejected`. No file is touched.
    pub fn reject(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<(), ReviewError> {
        let _claim = self.claim(message_id)?;
        self.pending_message(conversation_id, message_id)?;
        self.commit(conversation_id, message_id, ApprovalState::Rejected)?;
        self.audit(
            AuditEvent::new(&self.actor, AuditAction::Rejected)
                .for_message(conversation_id, message_id),
        );
        Ok(())
    }

    fn pending_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Message, ReviewError> {
        let message = self
            .store
            .find_message(conversation_id, message_id)?
            .ok_or(ReviewError::NotFound {
                conversation_id,
                message_id,
            })?;
        if message.approval_state.is_terminal() {
            return Err(ReviewError::AlreadyReviewed {
                message_id,
                state: message.approval_state,
            });
        }
        Ok(message)
    }

    fn commit(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
        state: ApprovalState,
    ) -> Result<(), ReviewError> {
        if self.store.set_approval_state(message_id, state)? {
            tracing::info!(%conversation_id, %message_id, %state, "message reviewed");
            return Ok(());
        }

        // Another writer got there first, or the message is gone.
        let Some(message) = self.store.find_message(conversation_id, message_id)? else {
            tracing::warn!(%conversation_id, %message_id, "message vanished during review");
            return Err(ReviewError::NotFound {
                conversation_id,
                message_id,
            });
        };
        let current = Some(message.approval_state)
            .filter(ApprovalState::is_terminal)
            .unwrap_or(state);
        tracing::warn!(%message_id, %current, "lost review race, state unchanged");
        Err(ReviewError::AlreadyReviewed {
            message_id,
            state: current,
        })
    }

    fn claim(&self, message_id: MessageId) -> Result<Claim<'_>, ReviewError> {
        if !lock_set(&self.in_flight).insert(message_id) {
            return Err(ReviewError::ReviewInProgress(message_id));
        }
        Ok(Claim {
            in_flight: &self.in_flight,
            message_id,
        })
    }

    fn audit(&self, event: AuditEvent) {
        if let Some(log) = &self.audit_log {
            AuditLog::record(log, event);
        }
    }
}

/// Releases a message id from the in-flight set when dropped.
struct Claim<'a> {
    in_flight: &'a Mutex<HashSet<MessageId>>,
    message_id: MessageId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        lock_set(self.in_flight).remove(&self.message_id);
    }
}

fn lock_set(set: &Mutex<HashSet<MessageId>>) -> MutexGuard<'_, HashSet<MessageId>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
