// store.rs — MessageStore trait and an in-memory implementation.
//
// The message store belongs to the surrounding chat system. The reviewer
// only needs four operations from it, and the approval update must be a
// conditional write keyed on the row still being `pending`, so two racing
// reviews can't both commit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use sanction_proposal::{ConversationId, MessageId};

use crate::error::StoreError;
use crate::message::{ApprovalState, Message, Role};

/// The message store contract consumed by the reviewer.
pub trait MessageStore: Send + Sync {
    /// The most recent assistant message in the conversation, in any state.
    fn find_latest_assistant_message(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Message>, StoreError>;

    /// The assistant message `message_id` if it belongs to `conversation_id`.
    fn find_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Option<Message>, StoreError>;

    /// Move a `pending` message to `state`.
    ///
    /// Returns `Ok(false)` without writing if the message is no longer
    /// `pending` (or doesn't exist). `state` must be terminal.
    fn set_approval_state(
        &self,
        message_id: MessageId,
        state: ApprovalState,
    ) -> Result<bool, StoreError>;

    /// Record a conversation title derived from an approved summary.
    fn record_conversation_title(
        &self,
        _conversation_id: ConversationId,
        _title: &str,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
struct Inner {
    messages: Vec<Message>,
    titles: HashMap<ConversationId, String>,
    next_id: i64,
}

/// A process-local message store.
#[derive(Default)]
pub struct InMemoryMessageStore {
    inner: Mutex<Inner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message and return its id. Assistant messages start `pending`.
    pub fn insert(&self, conversation_id: ConversationId, role: Role, body: &str) -> MessageId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = MessageId(inner.next_id);
        inner.messages.push(Message {
            id,
            conversation_id,
            role,
            body: body.to_string(),
            approval_state: ApprovalState::Pending,
            created_at: Utc::now(),
        });
        id
    }

    pub fn insert_assistant(&self, conversation_id: ConversationId, body: &str) -> MessageId {
        self.insert(conversation_id, Role::Assistant, body)
    }

    /// Any message by id, regardless of role or conversation.
    pub fn get(&self, message_id: MessageId) -> Option<Message> {
        self.lock()
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
    }

    pub fn conversation_title(&self, conversation_id: ConversationId) -> Option<String> {
        self.lock().titles.get(&conversation_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The data is plain values; a panic mid-update can't leave it torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageStore for InMemoryMessageStore {
    fn find_latest_assistant_message(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Message>, StoreError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.role == Role::Assistant)
            .max_by_key(|m| (m.created_at, m.id))
            .cloned())
    }

    fn find_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Option<Message>, StoreError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .find(|m| {
                m.id == message_id
                    && m.conversation_id == conversation_id
                    && m.role == Role::Assistant
            })
            .cloned())
    }

    fn set_approval_state(
        &self,
        message_id: MessageId,
        state: ApprovalState,
    ) -> Result<bool, StoreError> {
        if !ApprovalState::Pending.can_transition_to(state) {
            return Err(StoreError::InvalidTransition(state));
        }
        let mut inner = self.lock();
        match inner
            .messages
            .iter_mut()
            .find(|m| m.id == message_id && m.approval_state == ApprovalState::Pending)
        {
            Some(message) => {
                message.approval_state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn record_conversation_title(
        &self,
        conversation_id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError> {
        self.lock().titles.insert(conversation_id, title.to_string());
        Ok(())
    }
}
