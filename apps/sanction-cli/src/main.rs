//! # sanction
//!
//! Command-line interface for reviewing assistant change proposals.
//!
//! - `sanction proposal show/approve/reject` — inspect and decide on the
//!   pending proposal of a conversation
//! - `sanction message import` — store an assistant reply for review
//! - `sanction parse` — show the directives and anomalies found in a text
//! - `sanction audit verify/tail` — inspect the tamper-evident audit trail

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::SanctionConfig;

/// Sanction — review and approve assistant file changes.
#[derive(Parser)]
#[command(name = "sanction", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show, approve, or reject the pending proposal of a conversation.
    Proposal {
        #[command(subcommand)]
        command: commands::proposal::ProposalCommands,
    },
    /// Add messages to the message store.
    Message {
        #[command(subcommand)]
        command: commands::message::MessageCommands,
    },
    /// Parse a text and print the directives it carries.
    Parse(commands::parse::ParseArgs),
    /// Inspect the audit trail.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable. The `sanction`
    // directive covers every sanction_* target.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sanction=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = SanctionConfig::for_project(&project_root)?;

    match &cli.command {
        Commands::Proposal { command } => {
            commands::proposal::execute(command, &config, &project_root)
        }
        Commands::Message { command } => commands::message::execute(command, &config),
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}
