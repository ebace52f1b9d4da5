// roots.rs — Project root resolution.
//
// Which directory a conversation's changes land in is owned by whatever
// tracks apps/projects upstream. The processor only sees this trait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sanction_proposal::ConversationId;

/// Resolves the project directory for a conversation.
pub trait ProjectRoots: Send + Sync {
    /// The project root, or None if the conversation has no project.
    fn project_root(&self, conversation_id: ConversationId) -> Option<PathBuf>;
}

/// Every conversation shares one project root.
#[derive(Debug, Clone)]
pub struct FixedProjectRoot(pub PathBuf);

impl FixedProjectRoot {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self(root.as_ref().to_path_buf())
    }
}

impl ProjectRoots for FixedProjectRoot {
    fn project_root(&self, _conversation_id: ConversationId) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Per-conversation roots with an optional fallback.
#[derive(Debug, Clone, Default)]
pub struct ProjectRootMap {
    roots: HashMap<ConversationId, PathBuf>,
    fallback: Option<PathBuf>,
}

impl ProjectRootMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one conversation to a root and return self.
    pub fn with_root(mut self, conversation_id: ConversationId, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(conversation_id, root.into());
        self
    }

    /// Root used for conversations without an explicit mapping.
    pub fn with_fallback(mut self, root: impl Into<PathBuf>) -> Self {
        self.fallback = Some(root.into());
        self
    }
}

impl ProjectRoots for ProjectRootMap {
    fn project_root(&self, conversation_id: ConversationId) -> Option<PathBuf> {
        self.roots
            .get(&conversation_id)
            .or(self.fallback.as_ref())
            .cloned()
    }
}
