// message.rs — Message subcommands: import, list.

use std::path::PathBuf;

use clap::Subcommand;
use sanction_proposal::ConversationId;
use sanction_review::{Role, SqliteMessageStore};

use crate::config::SanctionConfig;

#[derive(Subcommand)]
pub enum MessageCommands {
    /// Store a message; assistant messages start out pending review.
    Import {
        /// Conversation id. The conversation is created if needed.
        #[arg(long)]
        conversation: ConversationId,
        /// Author of the message: assistant or user.
        #[arg(long, default_value = "assistant")]
        role: Role,
        /// File holding the message text (defaults to stdin).
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List the messages of a conversation with their review state.
    List {
        /// Conversation id.
        #[arg(long)]
        conversation: ConversationId,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(cmd: &MessageCommands, config: &SanctionConfig) -> anyhow::Result<()> {
    match cmd {
        MessageCommands::Import {
            conversation,
            role,
            file,
        } => {
            let text = super::read_input(file.as_deref())?;
            let store = SqliteMessageStore::open(&config.database)?;
            let id = store.insert_message(*conversation, *role, &text)?;
            tracing::info!(%conversation, message_id = %id, %role, "message imported");
            println!("{}", id);
        }

        MessageCommands::List { conversation, json } => {
            let store = SqliteMessageStore::open(&config.database)?;
            let messages = store.list_messages(*conversation)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
                return Ok(());
            }
            if messages.is_empty() {
                println!("No messages in conversation {}.", conversation);
                return Ok(());
            }

            println!(
                "{:<8} {:<10} {:<9} {:<20} FIRST LINE",
                "ID", "ROLE", "STATE", "CREATED"
            );
            println!("{}", "-".repeat(80));
            for message in &messages {
                println!(
                    "{:<8} {:<10} {:<9} {:<20} {}",
                    message.id.to_string(),
                    message.role.as_str(),
                    message.approval_state.as_str(),
                    message.created_at.format("%Y-%m-%d %H:%M:%S"),
                    message.body.lines().next().unwrap_or(""),
                );
            }
        }
    }

    Ok(())
}
