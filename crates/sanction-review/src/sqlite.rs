// sqlite.rs — SQLite-backed MessageStore.
//
// Schema:
//   conversations(id, title, created_at)
//   messages(id, conversation_id, role, content, approval_state, created_at)
//
// A NULL approval_state reads as `pending`. Timestamps are RFC 3339 with
// microseconds so lexical order matches chronological order.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};

use sanction_proposal::{ConversationId, MessageId};

use crate::error::StoreError;
use crate::message::{ApprovalState, Message, Role};
use crate::store::MessageStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id          INTEGER PRIMARY KEY,
    title       TEXT,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id INTEGER NOT NULL REFERENCES conversations(id),
    role            TEXT NOT NULL,
    content         TEXT NOT NULL,
    approval_state  TEXT,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS messages_by_conversation
    ON messages (conversation_id, created_at);
";

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, role, content, approval_state, created_at";

type MessageRow = (i64, i64, String, String, Option<String>, String);

/// A [`MessageStore`] persisted in a single SQLite database.
pub struct SqliteMessageStore {
    conn: Mutex<Connection>,
}

impl SqliteMessageStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Backend(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened message database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append a message to a conversation, creating the conversation row if
    /// needed. Assistant messages start `pending`.
    pub fn insert_message(
        &self,
        conversation_id: ConversationId,
        role: Role,
        content: &str,
    ) -> Result<MessageId, StoreError> {
        let now = timestamp(Utc::now());
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO conversations (id, title, created_at) VALUES (?1, NULL, ?2)",
            rusqlite::params![conversation_id.0, &now],
        )?;
        let state = (role == Role::Assistant).then(|| ApprovalState::Pending.as_str());
        conn.execute(
            "INSERT INTO messages (conversation_id, role, content, approval_state, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![conversation_id.0, role.as_str(), content, state, &now],
        )?;
        Ok(MessageId(conn.last_insert_rowid()))
    }

    /// All messages of a conversation, oldest first.
    pub fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE conversation_id = ?1
             ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map([conversation_id.0], read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_message).collect()
    }

    pub fn conversation_title(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.lock()?;
        let title = conn
            .query_row(
                "SELECT title FROM conversations WHERE id = ?1",
                [conversation_id.0],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(title.flatten())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("message database lock poisoned".to_string()))
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<Message>, StoreError> {
        let conn = self.lock()?;
        let row = conn.query_row(sql, params, read_row).optional()?;
        row.map(into_message).transpose()
    }
}

impl MessageStore for SqliteMessageStore {
    fn find_latest_assistant_message(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Message>, StoreError> {
        self.query_one(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1 AND role = 'assistant'
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1"
            ),
            [conversation_id.0],
        )
    }

    fn find_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<Option<Message>, StoreError> {
        self.query_one(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE id = ?1 AND conversation_id = ?2 AND role = 'assistant'"
            ),
            [message_id.0, conversation_id.0],
        )
    }

    fn set_approval_state(
        &self,
        message_id: MessageId,
        state: ApprovalState,
    ) -> Result<bool, StoreError> {
        if !ApprovalState::Pending.can_transition_to(state) {
            return Err(StoreError::InvalidTransition(state));
        }
        let conn = self.lock()?;
        let rows = conn.execute(
            "UPDATE messages SET approval_state = ?1
             WHERE id = ?2 AND (approval_state IS NULL OR approval_state = 'pending')",
            rusqlite::params![state.as_str(), message_id.0],
        )?;
        Ok(rows == 1)
    }

    fn record_conversation_title(
        &self,
        conversation_id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO conversations (id, title, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title",
            rusqlite::params![conversation_id.0, title, timestamp(Utc::now())],
        )?;
        Ok(())
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_message(row: MessageRow) -> Result<Message, StoreError> {
    let (id, conversation_id, role, content, state, created_at) = row;
    let approval_state = match state {
        Some(s) => s.parse()?,
        None => ApprovalState::Pending,
    };
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StoreError::Corrupt(format!("invalid created_at for message {id}: {e}")))?
        .with_timezone(&Utc);
    Ok(Message {
        id: MessageId(id),
        conversation_id: ConversationId(conversation_id),
        role: role.parse()?,
        body: content,
        approval_state,
        created_at,
    })
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
