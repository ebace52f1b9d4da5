// message.rs — Messages and their approval state.
//
// Only the approval state of a message is ever mutated here, and only once:
//   pending → approved
//   pending → rejected
// Both targets are terminal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sanction_proposal::{ConversationId, MessageId};

use crate::error::StoreError;

/// The review status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Not reviewed yet. Initial state.
    Pending,
    /// Approved; its file actions ran. Terminal.
    Approved,
    /// Rejected; nothing was applied. Terminal.
    Rejected,
}

impl ApprovalState {
    /// Whether moving from this state to `next` is a valid transition.
    pub fn can_transition_to(&self, next: ApprovalState) -> bool {
        matches!(
            (self, next),
            (ApprovalState::Pending, ApprovalState::Approved)
                | (ApprovalState::Pending, ApprovalState::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
            ApprovalState::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalState {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalState::Pending),
            "approved" => Ok(ApprovalState::Approved),
            "rejected" => Ok(ApprovalState::Rejected),
            other => Err(StoreError::Corrupt(format!("unknown approval state '{other}'"))),
        }
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(StoreError::Corrupt(format!("unknown role '{other}'"))),
        }
    }
}

/// A chat message as supplied by the message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: Role,
    /// Raw message text, directives included.
    pub body: String,
    pub approval_state: ApprovalState,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_can_transition() {
        use ApprovalState::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Approved, Rejected] {
            assert!(terminal.is_terminal());
            for next in [Pending, Approved, Rejected] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn state_string_round_trip() {
        for state in [
            ApprovalState::Pending,
            ApprovalState::Approved,
            ApprovalState::Rejected,
        ] {
            assert_eq!(state.to_string().parse::<ApprovalState>().unwrap(), state);
        }
        assert!(matches!(
            "archived".parse::<ApprovalState>(),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn role_parses_store_values() {
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!("system".parse::<Role>().is_err());
    }
}
