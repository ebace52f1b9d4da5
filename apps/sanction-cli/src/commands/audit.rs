// audit.rs — Audit subcommands: verify, tail.

use std::path::PathBuf;

use clap::Subcommand;
use sanction_audit::{AuditError, AuditLog};

use crate::config::SanctionConfig;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit log hash chain integrity.
    Verify {
        /// Path to audit log (defaults to the configured audit_log).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent audit events.
    Tail {
        /// Path to audit log (defaults to the configured audit_log).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &SanctionConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());

            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            match AuditLog::verify_chain(&path) {
                Ok(count) => {
                    println!("Audit log verified: {} event(s), hash chain intact.", count);
                }
                Err(AuditError::IntegrityViolation {
                    line,
                    expected,
                    actual,
                }) => {
                    println!("INTEGRITY VIOLATION at line {}:", line);
                    println!("  Expected previous_hash: {}", expected);
                    println!("  Actual previous_hash:   {}", actual);
                    println!();
                    println!("The audit log may have been tampered with.");
                    anyhow::bail!("Audit log integrity check failed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AuditCommands::Tail { log, n } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());

            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let events = AuditLog::read_all(&path)?;
            let start = events.len().saturating_sub(*n);
            let recent = &events[start..];

            if recent.is_empty() {
                println!("No audit events.");
                return Ok(());
            }

            println!(
                "{:<20} {:<12} {:<18} {:<8} TARGET",
                "TIMESTAMP", "ACTOR", "ACTION", "MESSAGE"
            );
            println!("{}", "-".repeat(80));

            for event in recent {
                println!(
                    "{:<20} {:<12} {:<18} {:<8} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.actor,
                    format!("{:?}", event.action),
                    event
                        .message_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    event.target.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(())
}
