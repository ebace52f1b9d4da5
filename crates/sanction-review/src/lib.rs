//! # sanction-review
//!
//! The approval lifecycle of assistant messages.
//!
//! Every assistant message starts `pending`. A reviewer either approves it,
//! which applies its file directives and then marks it `approved`, or
//! rejects it, which marks it `rejected` and touches nothing. Both end
//! states are terminal, and a reviewed message never surfaces a proposal
//! again.
//!
//! ## Key components
//!
//! - [`ApprovalState`] — `pending → approved | rejected`
//! - [`MessageStore`] — the injected message store contract, with
//!   [`InMemoryMessageStore`] and [`SqliteMessageStore`] implementations
//! - [`Reviewer`] — the state machine: actionable-message lookup, approve,
//!   reject, with typed [`ReviewError`]s
//! - [`ProposalService`] — the caller-facing boundary that never errors and
//!   returns structured [`ReviewOutcome`]s instead

pub mod error;
pub mod message;
pub mod review;
pub mod service;
pub mod sqlite;
pub mod store;

pub use error::{ReviewError, StoreError};
pub use message::{ApprovalState, Message, Role};
pub use review::{Approval, Reviewer};
pub use service::{ProposalResult, ProposalService, ReviewOutcome};
pub use sqlite::SqliteMessageStore;
pub use store::{InMemoryMessageStore, MessageStore};
