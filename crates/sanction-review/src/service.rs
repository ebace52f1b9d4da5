// service.rs — ProposalService: the caller-facing review boundary.
//
// Nothing here returns an error. Lookups degrade to None and approve/reject
// report their outcome as a ReviewOutcome, so a UI or RPC layer can pass the
// values straight through as JSON.

use serde::{Deserialize, Serialize};

use sanction_proposal::{ConversationId, MessageId, Proposal};
use sanction_workspace::{AggregateResult, ProjectRoots};

use crate::review::Reviewer;
use crate::store::MessageStore;

/// The actionable proposal of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResult {
    pub proposal: Proposal,
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
}

/// Outcome of an approve or reject request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub success: bool,

    /// Why the request did not go through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Non-fatal problems, e.g. file actions that failed during an approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// Per-file outcomes of an approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AggregateResult>,
}

impl ReviewOutcome {
    fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Wraps a [`Reviewer`] for callers that want values, not errors.
pub struct ProposalService<S: MessageStore, R: ProjectRoots> {
    reviewer: Reviewer<S, R>,
}

impl<S: MessageStore, R: ProjectRoots> ProposalService<S, R> {
    pub fn new(reviewer: Reviewer<S, R>) -> Self {
        Self { reviewer }
    }

    pub fn reviewer(&self) -> &Reviewer<S, R> {
        &self.reviewer
    }

    /// The pending proposal of the conversation's latest assistant message.
    pub fn get_proposal(&self, conversation_id: ConversationId) -> Option<ProposalResult> {
        match self.reviewer.get_actionable_message(conversation_id) {
            Ok(found) => found.map(|(message, proposal)| ProposalResult {
                proposal,
                conversation_id,
                message_id: message.id,
            }),
            Err(e) => {
                tracing::error!(%conversation_id, "failed to load proposal: {}", e);
                None
            }
        }
    }

    pub fn approve_proposal(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> ReviewOutcome {
        match self.reviewer.approve(conversation_id, message_id) {
            Ok(approval) => ReviewOutcome {
                warning: approval.warning,
                result: Some(approval.result),
                ..ReviewOutcome::succeeded()
            },
            Err(e) => {
                tracing::warn!(%conversation_id, %message_id, "approve failed: {}", e);
                ReviewOutcome::failed(e)
            }
        }
    }

    pub fn reject_proposal(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> ReviewOutcome {
        match self.reviewer.reject(conversation_id, message_id) {
            Ok(()) => ReviewOutcome::succeeded(),
            Err(e) => {
                tracing::warn!(%conversation_id, %message_id, "reject failed: {}", e);
                ReviewOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sanction_workspace::{ActionProcessor, FixedProjectRoot};

    use super::*;
    use crate::store::InMemoryMessageStore;

    const CID: ConversationId = ConversationId(4);

    fn service(root: &std::path::Path) -> ProposalService<InMemoryMessageStore, FixedProjectRoot> {
        ProposalService::new(Reviewer::new(
            InMemoryMessageStore::new(),
            ActionProcessor::new(FixedProjectRoot::new(root)),
        ))
    }

    #[test]
    fn get_proposal_reports_message_and_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        assert!(service.get_proposal(CID).is_none());

        let id = service.reviewer().store().insert_assistant(
            CID,
            "<sanction-chat-summary>Add notes</sanction-chat-summary>",
        );
        let found = service.get_proposal(CID).unwrap();
        assert_eq!(found.message_id, id);
        assert_eq!(found.conversation_id, CID);
        assert_eq!(found.proposal.title, "Add notes");
        assert!(found.proposal.files_changed.is_empty());

        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["messageId"], id.0);
        assert_eq!(json["proposal"]["title"], "Add notes");
    }

    #[test]
    fn approve_outcome_carries_warning_on_partial_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "").unwrap();
        let service = service(dir.path());
        let id = service.reviewer().store().insert_assistant(
            CID,
            "<sanction-write path=\"a.txt\">a</sanction-write>\
             <sanction-write path=\"blocker/b.txt\">b</sanction-write>",
        );

        let outcome = service.approve_proposal(CID, id);
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert!(outcome.warning.unwrap().starts_with("1 of 2 file action(s) failed"));
        assert!(!outcome.result.unwrap().success);
    }

    #[test]
    fn second_review_fails_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let id = service
            .reviewer()
            .store()
            .insert_assistant(CID, "<sanction-chat-summary>x</sanction-chat-summary>");

        assert_eq!(service.reject_proposal(CID, id), ReviewOutcome::succeeded());
        let again = service.approve_proposal(CID, id);
        assert!(!again.success);
        assert_eq!(
            again.error.as_deref(),
            Some(format!("message {id} has already been rejected").as_str())
        );
    }

    #[test]
    fn outcome_omits_empty_fields() {
        let json = serde_json::to_string(&ReviewOutcome::succeeded()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}
