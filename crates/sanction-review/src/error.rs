// error.rs — Error types for the review lifecycle.

use sanction_proposal::{ConversationId, MessageId};
use sanction_workspace::ApplyError;
use thiserror::Error;

use crate::message::ApprovalState;

/// Errors raised by a message store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be interpreted.
    #[error("corrupt message record: {0}")]
    Corrupt(String),

    /// The requested state change is not a valid transition out of `pending`.
    #[error("invalid approval transition to {0}")]
    InvalidTransition(ApprovalState),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

/// Why an approve or reject request did not go through.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// No assistant message with this id exists in the conversation.
    #[error("assistant message {message_id} not found in conversation {conversation_id}")]
    NotFound {
        conversation_id: ConversationId,
        message_id: MessageId,
    },

    /// The message already left `pending`.
    #[error("message {message_id} has already been {state}")]
    AlreadyReviewed {
        message_id: MessageId,
        state: ApprovalState,
    },

    /// Another approve/reject for the same message is still running.
    #[error("message {0} is already being reviewed")]
    ReviewInProgress(MessageId),

    /// The file actions could not be processed at all; the message stays `pending`.
    #[error("action processing failed: {0}")]
    Structural(#[from] ApplyError),

    /// The message store failed.
    #[error("message store error: {0}")]
    Store(#[from] StoreError),
}
