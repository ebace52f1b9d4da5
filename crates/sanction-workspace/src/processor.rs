// processor.rs — ActionProcessor: apply approved file directives.
//
// Flow for one batch:
//   1. Resolve and canonicalize the conversation's project root. If that
//      fails the batch is structurally broken and nothing is written.
//   2. For each FileWrite, in order: confine the path to the root, create
//      parent directories, write the content verbatim.
//   3. Collect one FileActionResult per write. A failure is recorded and the
//      next write still runs.
//
// Summary directives produce no file action.

use std::fs;
use std::path::{Component, Path, PathBuf};

use sanction_audit::{hasher, AuditAction, AuditEvent, AuditLog, SharedAuditLog};
use sanction_directive::{Directive, FileWrite};
use sanction_proposal::{ConversationId, MessageId, NO_SUMMARY};

use crate::error::{ApplyError, WorkspaceError};
use crate::result::{ActionOutcome, AggregateResult, FileActionResult};
use crate::roots::ProjectRoots;

/// Applies file directives under the project root of a conversation.
///
/// Generic over `R: ProjectRoots` so callers decide how conversations map to
/// directories.
pub struct ActionProcessor<R: ProjectRoots> {
    roots: R,

    /// Optional audit log; every write and failure is recorded when set.
    audit_log: Option<SharedAuditLog>,

    /// Identity recorded on audit events.
    actor: String,
}

impl<R: ProjectRoots> ActionProcessor<R> {
    pub fn new(roots: R) -> Self {
        Self {
            roots,
            audit_log: None,
            actor: "sanction".to_string(),
        }
    }

    /// Record writes in `log`, attributed to `actor`.
    pub fn with_audit_log(mut self, log: SharedAuditLog, actor: impl Into<String>) -> Self {
        self.audit_log = Some(log);
        self.actor = actor.into();
        self
    }

    pub fn roots(&self) -> &R {
        &self.roots
    }

    /// Apply `directives` to the project of `conversation_id`.
    pub fn apply(
        &self,
        directives: &[Directive],
        conversation_id: ConversationId,
    ) -> Result<AggregateResult, ApplyError> {
        self.run(directives, conversation_id, None)
    }

    /// Like [`apply`](Self::apply), tagging audit events with the source message.
    pub fn apply_message(
        &self,
        directives: &[Directive],
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<AggregateResult, ApplyError> {
        self.run(directives, conversation_id, Some(message_id))
    }

    fn run(
        &self,
        directives: &[Directive],
        conversation_id: ConversationId,
        message_id: Option<MessageId>,
    ) -> Result<AggregateResult, ApplyError> {
        let root = match self.resolve_root(conversation_id) {
            Ok(root) => root,
            Err(e) => {
                tracing::error!(%conversation_id, "cannot apply file actions: {}", e);
                self.record(
                    AuditEvent::new(&self.actor, AuditAction::ApplyAborted)
                        .with_detail(e.to_string()),
                    conversation_id,
                    message_id,
                );
                return Err(e);
            }
        };

        let mut results = Vec::new();
        for write in directives.iter().filter_map(Directive::as_file_write) {
            results.push(self.apply_write(&root, write, conversation_id, message_id));
        }

        let aggregate = AggregateResult::from_results(results);
        tracing::info!(
            %conversation_id,
            root = %root.display(),
            succeeded = aggregate.success_count(),
            total = aggregate.results.len(),
            "file actions applied"
        );
        Ok(aggregate)
    }

    fn resolve_root(&self, conversation_id: ConversationId) -> Result<PathBuf, ApplyError> {
        let root = self
            .roots
            .project_root(conversation_id)
            .ok_or(ApplyError::ProjectNotFound(conversation_id))?;
        let canonical = root
            .canonicalize()
            .map_err(|e| ApplyError::RootUnavailable {
                path: root.clone(),
                reason: e.to_string(),
            })?;
        if !canonical.is_dir() {
            return Err(ApplyError::RootUnavailable {
                path: root,
                reason: "not a directory".to_string(),
            });
        }
        Ok(canonical)
    }

    fn apply_write(
        &self,
        root: &Path,
        write: &FileWrite,
        conversation_id: ConversationId,
        message_id: Option<MessageId>,
    ) -> FileActionResult {
        let summary = write
            .description
            .clone()
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        match write_file(root, &write.path, write.content.as_bytes()) {
            Ok(()) => {
                let content_hash = hasher::hash_str(&write.content);
                tracing::info!(path = %write.path, bytes = write.content.len(), "file written");
                self.record(
                    AuditEvent::new(&self.actor, AuditAction::FileWritten)
                        .with_target(&write.path)
                        .with_content_hash(&content_hash)
                        .with_summary(&summary),
                    conversation_id,
                    message_id,
                );
                FileActionResult {
                    path: write.path.clone(),
                    outcome: ActionOutcome::Success,
                    error: None,
                    summary,
                    content_hash: Some(content_hash),
                }
            }
            Err(e) => {
                tracing::warn!(path = %write.path, "file write failed: {}", e);
                self.record(
                    AuditEvent::new(&self.actor, AuditAction::FileWriteFailed)
                        .with_target(&write.path)
                        .with_summary(&summary)
                        .with_detail(e.to_string()),
                    conversation_id,
                    message_id,
                );
                FileActionResult {
                    path: write.path.clone(),
                    outcome: ActionOutcome::Failure,
                    error: Some(e.to_string()),
                    summary,
                    content_hash: None,
                }
            }
        }
    }

    fn record(
        &self,
        event: AuditEvent,
        conversation_id: ConversationId,
        message_id: Option<MessageId>,
    ) {
        let Some(log) = &self.audit_log else {
            return;
        };
        let event = match message_id {
            Some(message_id) => event.for_message(conversation_id, message_id),
            None => AuditEvent {
                conversation_id: Some(conversation_id),
                ..event
            },
        };
        AuditLog::record(log, event);
    }
}

/// Join `relative` onto `root`, rejecting anything that could leave it.
fn resolve_path(root: &Path, relative: &str) -> Result<PathBuf, WorkspaceError> {
    // Backslash is a separator on every platform, matching the display name.
    let normalized = relative.replace('\\', "/");
    let mut full = root.to_path_buf();
    let mut depth = 0;
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => {
                full.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(WorkspaceError::PathEscapesRoot {
                    path: relative.to_string(),
                });
            }
        }
    }
    if depth == 0 {
        return Err(WorkspaceError::InvalidPath {
            path: relative.to_string(),
        });
    }
    Ok(full)
}

/// Write `content` to `root/relative`, creating parent directories.
///
/// `root` must already be canonical. Symlinks along the way are followed
/// only if they stay inside it.
fn write_file(root: &Path, relative: &str, content: &[u8]) -> Result<(), WorkspaceError> {
    let full_path = resolve_path(root, relative)?;
    let escapes = || WorkspaceError::PathEscapesRoot {
        path: relative.to_string(),
    };
    let parent = full_path.parent().ok_or_else(escapes)?;

    // Check the deepest existing ancestor before creating anything below it.
    let mut existing = parent;
    while !existing.exists() {
        existing = existing.parent().ok_or_else(escapes)?;
    }
    let real = existing
        .canonicalize()
        .map_err(|source| WorkspaceError::IoError {
            path: existing.to_path_buf(),
            source,
        })?;
    if !real.starts_with(root) {
        return Err(escapes());
    }

    fs::create_dir_all(parent).map_err(|source| WorkspaceError::IoError {
        path: parent.to_path_buf(),
        source,
    })?;

    if full_path.is_symlink() {
        let target = full_path
            .canonicalize()
            .map_err(|source| WorkspaceError::IoError {
                path: full_path.clone(),
                source,
            })?;
        if !target.starts_with(root) {
            return Err(escapes());
        }
    }

    fs::write(&full_path, content).map_err(|source| WorkspaceError::IoError {
        path: full_path,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::{FixedProjectRoot, ProjectRootMap};
    use tempfile::tempdir;

    fn write(path: &str, content: &str) -> Directive {
        Directive::FileWrite(FileWrite::new(path, content))
    }

    #[test]
    fn writes_files_and_creates_parents() {
        let dir = tempdir().unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(dir.path()));

        let directives = vec![
            Directive::Summary {
                text: "ignored".to_string(),
            },
            write("src/deep/nested/a.ts", "export const a=1;"),
            Directive::FileWrite(
                FileWrite::new("README.md", "# hi\n").with_description("Add readme"),
            ),
        ];
        let aggregate = processor.apply(&directives, ConversationId(1)).unwrap();

        assert!(aggregate.success);
        assert_eq!(aggregate.results.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("src/deep/nested/a.ts")).unwrap(),
            "export const a=1;"
        );
        assert_eq!(aggregate.results[0].summary, NO_SUMMARY);
        assert_eq!(aggregate.results[1].summary, "Add readme");
        assert_eq!(
            aggregate.results[1].content_hash.as_deref(),
            Some(hasher::hash_str("# hi\n").as_str())
        );
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let dir = tempdir().unwrap();
        // A regular file where a directory is needed makes the first write fail.
        fs::write(dir.path().join("blocker"), "file").unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(dir.path()));

        let directives = vec![write("blocker/child.txt", "x"), write("ok.txt", "y")];
        let aggregate = processor.apply(&directives, ConversationId(1)).unwrap();

        assert!(!aggregate.success);
        assert_eq!(aggregate.results[0].outcome, ActionOutcome::Failure);
        assert!(aggregate.results[0].error.is_some());
        assert_eq!(aggregate.results[1].outcome, ActionOutcome::Success);
        assert_eq!(fs::read_to_string(dir.path().join("ok.txt")).unwrap(), "y");
    }

    #[test]
    fn escaping_paths_fail_individually() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("project");
        fs::create_dir(&root).unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(&root));

        let directives = vec![
            write("../outside.txt", "x"),
            write("/etc/absolute.txt", "x"),
            write("./", "x"),
            write("./inside.txt", "ok"),
        ];
        let aggregate = processor.apply(&directives, ConversationId(1)).unwrap();

        let outcomes: Vec<ActionOutcome> = aggregate.results.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                ActionOutcome::Failure,
                ActionOutcome::Failure,
                ActionOutcome::Failure,
                ActionOutcome::Success
            ]
        );
        assert!(aggregate.results[0]
            .error
            .as_deref()
            .unwrap()
            .contains("escapes project root"));
        assert!(!outer.path().join("outside.txt").exists());
        assert!(root.join("inside.txt").exists());
    }

    #[test]
    fn backslash_separates_path_segments() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("project");
        fs::create_dir(&root).unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(&root));

        let aggregate = processor
            .apply(
                &[write("src\\win\\a.ts", "x"), write("..\\outside.txt", "x")],
                ConversationId(1),
            )
            .unwrap();

        assert_eq!(aggregate.results[0].outcome, ActionOutcome::Success);
        assert_eq!(fs::read_to_string(root.join("src/win/a.ts")).unwrap(), "x");
        assert_eq!(aggregate.results[1].outcome, ActionOutcome::Failure);
        assert!(!outer.path().join("outside.txt").exists());
    }

    #[test]
    fn padded_tag_path_writes_to_trimmed_location() {
        let dir = tempdir().unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(dir.path()));
        let report =
            sanction_directive::scan("<sanction-write path=\" src/a.ts \">x</sanction-write>");

        let aggregate = processor.apply(&report.directives, ConversationId(1)).unwrap();

        assert!(aggregate.success);
        assert_eq!(aggregate.results[0].path, "src/a.ts");
        assert_eq!(fs::read_to_string(dir.path().join("src/a.ts")).unwrap(), "x");
        assert!(!dir.path().join(" src").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_cannot_leak_writes() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("project");
        let elsewhere = outer.path().join("elsewhere");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&elsewhere).unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("link")).unwrap();

        let processor = ActionProcessor::new(FixedProjectRoot::new(&root));
        let aggregate = processor
            .apply(&[write("link/new/file.txt", "x")], ConversationId(1))
            .unwrap();

        assert!(!aggregate.success);
        assert!(!elsewhere.join("new").exists());
    }

    #[test]
    fn duplicate_paths_run_in_order_and_last_write_wins() {
        let dir = tempdir().unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(dir.path()));

        let aggregate = processor
            .apply(&[write("a.txt", "first"), write("a.txt", "second")], ConversationId(1))
            .unwrap();

        assert_eq!(aggregate.results.len(), 2);
        assert!(aggregate.success);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "second");
    }

    #[test]
    fn unknown_project_is_structural() {
        let processor = ActionProcessor::new(ProjectRootMap::new());
        let err = processor
            .apply(&[write("a.txt", "x")], ConversationId(4))
            .unwrap_err();
        assert!(matches!(err, ApplyError::ProjectNotFound(ConversationId(4))));
    }

    #[test]
    fn missing_root_directory_is_structural() {
        let dir = tempdir().unwrap();
        let processor = ActionProcessor::new(FixedProjectRoot::new(dir.path().join("gone")));
        let err = processor
            .apply(&[write("a.txt", "x")], ConversationId(1))
            .unwrap_err();
        assert!(matches!(err, ApplyError::RootUnavailable { .. }));
    }

    #[test]
    fn writes_and_failures_are_audited() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        let audit_path = dir.path().join("audit.jsonl");
        let log = AuditLog::open(&audit_path).unwrap().shared();

        let processor = ActionProcessor::new(FixedProjectRoot::new(&project))
            .with_audit_log(log, "reviewer-1");
        processor
            .apply_message(
                &[
                    Directive::FileWrite(FileWrite::new("a.txt", "a").with_description("Add a")),
                    write("../b.txt", "b"),
                ],
                ConversationId(3),
                MessageId(8),
            )
            .unwrap();

        let events = AuditLog::read_all(&audit_path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AuditAction::FileWritten);
        assert_eq!(events[0].actor, "reviewer-1");
        assert_eq!(events[0].summary.as_deref(), Some("Add a"));
        assert_eq!(events[0].message_id, Some(MessageId(8)));
        assert_eq!(events[1].action, AuditAction::FileWriteFailed);
        assert_eq!(events[1].summary.as_deref(), Some(NO_SUMMARY));
        assert_eq!(AuditLog::verify_chain(&audit_path).unwrap(), 2);
    }
}
