//! # sanction-proposal
//!
//! The reviewable view of one assistant message.
//!
//! A [`Proposal`] is derived on demand from a message's text and is never
//! stored: the message body is the single source of truth, so rebuilding is
//! always current. Each proposal names the message it came from, and approval
//! is keyed on that id.

pub mod builder;
pub mod ids;
pub mod proposal;

pub use builder::{build, build_from_report};
pub use ids::{ConversationId, MessageId};
pub use proposal::{FileChange, Proposal, FALLBACK_TITLE, NO_SUMMARY};
