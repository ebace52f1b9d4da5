//! # sanction-audit
//!
//! Append-only record of what a review did.
//!
//! Every approval, rejection, and file write performed on behalf of an
//! approved proposal is appended to a JSONL log as an [`AuditEvent`]. Each
//! line carries the SHA-256 of the previous line, so
//! [`AuditLog::verify_chain`] detects tampering with any line that still has
//! a successor. Cutting lines off the end leaves a valid shorter chain and is
//! not detected.
//!
//! ```rust,no_run
//! use sanction_audit::{AuditAction, AuditEvent, AuditLog};
//!
//! let mut log = AuditLog::open("/tmp/audit.jsonl").unwrap();
//! let mut event = AuditEvent::new("human", AuditAction::FileWritten).with_target("src/a.ts");
//! log.append(&mut event).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;

pub use error::AuditError;
pub use event::{AuditAction, AuditEvent};
pub use log::{AuditLog, SharedAuditLog};
