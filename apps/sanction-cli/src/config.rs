// config.rs — Project configuration from .sanction/config.toml.
//
// Every key is optional. Relative paths are resolved against the project
// root, so the same file works wherever the CLI is invoked from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use sanction_proposal::ConversationId;
use sanction_workspace::ProjectRootMap;

/// Location of the config file, relative to the project root.
pub const CONFIG_FILE: &str = ".sanction/config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionConfig {
    /// SQLite message database.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Hash-chained JSONL audit log.
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,

    /// Identity recorded on audit events.
    #[serde(default = "default_reviewer")]
    pub reviewer: String,

    /// Conversation id → project directory. Unlisted conversations apply to
    /// the project root.
    #[serde(default)]
    pub projects: BTreeMap<String, PathBuf>,
}

impl Default for SanctionConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            audit_log: default_audit_log(),
            reviewer: default_reviewer(),
            projects: BTreeMap::new(),
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from(".sanction/messages.db")
}

fn default_audit_log() -> PathBuf {
    PathBuf::from(".sanction/audit.jsonl")
}

fn default_reviewer() -> String {
    "human".to_string()
}

impl SanctionConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load the config if the file exists, defaults otherwise. A file that
    /// exists but doesn't parse is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load `<project_root>/.sanction/config.toml` and resolve its paths.
    pub fn for_project(project_root: &Path) -> anyhow::Result<Self> {
        Ok(Self::load_or_default(&project_root.join(CONFIG_FILE))?.resolved(project_root))
    }

    /// Rebase every relative path onto `project_root`.
    pub fn resolved(mut self, project_root: &Path) -> Self {
        self.database = project_root.join(&self.database);
        self.audit_log = project_root.join(&self.audit_log);
        for dir in self.projects.values_mut() {
            *dir = project_root.join(&*dir);
        }
        self
    }

    /// Project roots for the action processor, with `project_root` as the
    /// fallback for unlisted conversations.
    pub fn project_roots(&self, project_root: &Path) -> anyhow::Result<ProjectRootMap> {
        let mut roots = ProjectRootMap::new().with_fallback(project_root);
        for (key, dir) in &self.projects {
            let conversation_id: ConversationId = key
                .parse()
                .with_context(|| format!("[projects] key '{key}' is not a conversation id"))?;
            roots = roots.with_root(conversation_id, dir.clone());
        }
        Ok(roots)
    }
}
