// review_flow.rs — End-to-end review of assistant messages.
//
// Exercises the whole pipeline against real storage:
//
//   1. Assistant replies are stored in a SQLite message database
//   2. The latest pending reply surfaces as a proposal
//   3. Approval writes the files into the project directory
//   4. The message is marked approved, the summary becomes the title
//   5. A later reply is rejected and leaves the project untouched
//   6. Every decision and write lands in the audit log, chain intact
//
// The database and audit log are reopened at the end to check that the
// state survived.

use std::fs;

use tempfile::tempdir;

use sanction_audit::{AuditAction, AuditLog};
use sanction_proposal::ConversationId;
use sanction_review::{
    ApprovalState, MessageStore, ProposalService, Reviewer, ReviewOutcome, Role,
    SqliteMessageStore,
};
use sanction_workspace::{ActionProcessor, ProjectRootMap};

const PROPOSAL: &str = r#"Sure, here is the rename.

<sanction-chat-summary>Rename util</sanction-chat-summary>
<sanction-write path="src/a.ts" description="Export a constant">
export const a=1;
</sanction-write>
<sanction-write path="README.md">
# Demo
</sanction-write>

Let me know if anything else should change."#;

#[test]
fn approve_then_reject_against_sqlite_and_audit() {
    let project = tempdir().unwrap();
    let state_dir = tempdir().unwrap();
    let db_path = state_dir.path().join("messages.db");
    let audit_path = state_dir.path().join("audit.jsonl");
    let cid = ConversationId(12);

    let store = SqliteMessageStore::open(&db_path).unwrap();
    store.insert_message(cid, Role::User, "rename util please").unwrap();
    let proposal_id = store.insert_message(cid, Role::Assistant, PROPOSAL).unwrap();

    let roots = ProjectRootMap::new().with_root(cid, project.path());
    let log = AuditLog::open(&audit_path).unwrap().shared();
    let service = ProposalService::new(
        Reviewer::new(store, ActionProcessor::new(roots)).with_audit_log(log, "reviewer@example"),
    );

    // Proposal surfaces with title, display names and summary fallback.
    let found = service.get_proposal(cid).unwrap();
    assert_eq!(found.message_id, proposal_id);
    assert_eq!(found.proposal.title, "Rename util");
    let names: Vec<_> = found
        .proposal
        .files_changed
        .iter()
        .map(|f| (f.display_name.as_str(), f.summary.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("a.ts", "Export a constant"),
            ("README.md", "(no change summary found)")
        ]
    );

    // Approve.
    let outcome = service.approve_proposal(cid, proposal_id);
    assert!(outcome.success, "{outcome:?}");
    assert!(outcome.warning.is_none());
    assert_eq!(
        fs::read_to_string(project.path().join("src/a.ts")).unwrap(),
        "export const a=1;"
    );
    assert_eq!(
        fs::read_to_string(project.path().join("README.md")).unwrap(),
        "# Demo"
    );
    assert!(service.get_proposal(cid).is_none());

    // Reject a follow-up reply.
    let store = service.reviewer().store();
    let followup = store
        .insert_message(
            cid,
            Role::Assistant,
            r#"<sanction-write path="src/b.ts">export const b=2;</sanction-write>"#,
        )
        .unwrap();
    assert_eq!(service.get_proposal(cid).unwrap().message_id, followup);
    assert_eq!(
        service.reject_proposal(cid, followup),
        ReviewOutcome {
            success: true,
            ..ReviewOutcome::default()
        }
    );
    assert!(!project.path().join("src/b.ts").exists());

    // Re-reviewing either message fails.
    assert!(!service.approve_proposal(cid, proposal_id).success);
    assert!(!service.approve_proposal(cid, followup).success);

    drop(service);

    // Reopen and check persisted state.
    let store = SqliteMessageStore::open(&db_path).unwrap();
    assert_eq!(
        store.find_message(cid, proposal_id).unwrap().unwrap().approval_state,
        ApprovalState::Approved
    );
    assert_eq!(
        store.find_message(cid, followup).unwrap().unwrap().approval_state,
        ApprovalState::Rejected
    );
    assert_eq!(
        store.conversation_title(cid).unwrap().as_deref(),
        Some("Rename util")
    );

    let events = AuditLog::read_all(&audit_path).unwrap();
    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::FileWritten,
            AuditAction::FileWritten,
            AuditAction::Approved,
            AuditAction::Rejected,
        ]
    );
    assert_eq!(events[0].target.as_deref(), Some("src/a.ts"));
    assert_eq!(
        events[0].content_hash.as_deref(),
        Some(sanction_audit::hasher::hash_str("export const a=1;").as_str())
    );
    assert_eq!(events[1].summary.as_deref(), Some("(no change summary found)"));
    assert_eq!(AuditLog::verify_chain(&audit_path).unwrap(), 4);
}

#[test]
fn unmapped_conversation_is_structural_and_stays_pending() {
    let state_dir = tempdir().unwrap();
    let cid = ConversationId(1);

    let store = SqliteMessageStore::open(state_dir.path().join("messages.db")).unwrap();
    let id = store.insert_message(cid, Role::Assistant, PROPOSAL).unwrap();

    let service = ProposalService::new(Reviewer::new(
        store,
        ActionProcessor::new(ProjectRootMap::new()),
    ));

    let outcome = service.approve_proposal(cid, id);
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("no project"));
    assert_eq!(service.get_proposal(cid).unwrap().message_id, id);
}
