// proposal.rs — Proposal subcommands: show, approve, reject.

use std::path::Path;

use clap::Subcommand;
use sanction_audit::AuditLog;
use sanction_proposal::{ConversationId, MessageId};
use sanction_review::{ProposalService, ReviewOutcome, Reviewer, SqliteMessageStore};
use sanction_workspace::{ActionProcessor, ProjectRootMap};

use crate::config::SanctionConfig;

#[derive(Subcommand)]
pub enum ProposalCommands {
    /// Show the pending proposal of a conversation.
    Show {
        /// Conversation id.
        #[arg(long)]
        conversation: ConversationId,
        /// Print JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Apply a proposal's file changes and mark its message approved.
    Approve {
        /// Conversation id.
        #[arg(long)]
        conversation: ConversationId,
        /// Assistant message id (see `proposal show`).
        #[arg(long)]
        message: MessageId,
        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Mark a proposal's message rejected without touching any file.
    Reject {
        /// Conversation id.
        #[arg(long)]
        conversation: ConversationId,
        /// Assistant message id (see `proposal show`).
        #[arg(long)]
        message: MessageId,
        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(
    cmd: &ProposalCommands,
    config: &SanctionConfig,
    project_root: &Path,
) -> anyhow::Result<()> {
    let service = open_service(config, project_root)?;

    match cmd {
        ProposalCommands::Show { conversation, json } => {
            let Some(found) = service.get_proposal(*conversation) else {
                if *json {
                    println!("null");
                } else {
                    println!("No pending proposal for conversation {}.", conversation);
                }
                return Ok(());
            };

            if *json {
                println!("{}", serde_json::to_string_pretty(&found)?);
                return Ok(());
            }

            println!(
                "Proposal from message {}: {}",
                found.message_id, found.proposal.title
            );
            println!(
                "  {} change(s) to {} file(s)",
                found.proposal.files_changed.len(),
                found.proposal.distinct_paths().len()
            );
            if found.proposal.files_changed.is_empty() {
                println!("  (no file changes)");
            }
            for change in &found.proposal.files_changed {
                println!(
                    "  {:<24} {:<40} {}",
                    change.display_name, change.path, change.summary
                );
            }
        }

        ProposalCommands::Approve {
            conversation,
            message,
            json,
        } => {
            let outcome = service.approve_proposal(*conversation, *message);
            report(&outcome, *json, "Approved", *message)?;
        }

        ProposalCommands::Reject {
            conversation,
            message,
            json,
        } => {
            let outcome = service.reject_proposal(*conversation, *message);
            report(&outcome, *json, "Rejected", *message)?;
        }
    }

    Ok(())
}

fn open_service(
    config: &SanctionConfig,
    project_root: &Path,
) -> anyhow::Result<ProposalService<SqliteMessageStore, ProjectRootMap>> {
    let store = SqliteMessageStore::open(&config.database)?;
    let roots = config.project_roots(project_root)?;
    let log = AuditLog::open(&config.audit_log)?.shared();
    let reviewer =
        Reviewer::new(store, ActionProcessor::new(roots)).with_audit_log(log, &config.reviewer);
    Ok(ProposalService::new(reviewer))
}

fn report(
    outcome: &ReviewOutcome,
    json: bool,
    verb: &str,
    message: MessageId,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if outcome.success {
        println!("{} message {}.", verb, message);
        if let Some(result) = &outcome.result {
            for action in &result.results {
                let status = if action.succeeded() { "ok" } else { "FAILED" };
                println!(
                    "  {:<7} {:<40} {}",
                    status,
                    action.path,
                    action.error.as_deref().unwrap_or(&action.summary)
                );
            }
        }
        if let Some(warning) = &outcome.warning {
            eprintln!("warning: {}", warning);
        }
    }

    if !outcome.success {
        anyhow::bail!(
            "{}",
            outcome.error.as_deref().unwrap_or("review did not go through")
        );
    }
    Ok(())
}
