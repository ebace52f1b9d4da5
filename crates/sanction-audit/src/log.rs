// log.rs — Append-only JSONL audit log with a hash chain.
//
// Each appended line records the SHA-256 of the line before it. Reopening an
// existing log recovers the last hash so the chain continues across runs.
// Verification hashes the raw lines as stored, never re-serialized events,
// so field order changes can't mask tampering.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::AuditError;
use crate::event::AuditEvent;
use crate::hasher;

/// An audit log shared between the components recording into it.
pub type SharedAuditLog = Arc<Mutex<AuditLog>>;

/// An append-only audit log backed by a JSONL file.
pub struct AuditLog {
    writer: BufWriter<File>,
    last_hash: Option<String>,
}

impl AuditLog {
    /// Open (or create) the log at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        }

        let last_hash = if path.exists() {
            Self::read_last_hash(&path)?
        } else {
            None
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            last_hash,
        })
    }

    /// Append an event, linking it to the previous one. Flushes before returning.
    pub fn append(&mut self, event: &mut AuditEvent) -> Result<(), AuditError> {
        event.previous_hash = self.last_hash.clone();
        let json = serde_json::to_string(event)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        // Only advance the chain once the line is actually on disk.
        self.last_hash = Some(hasher::hash_str(&json));
        tracing::debug!(action = ?event.action, target = ?event.target, "audit event recorded");
        Ok(())
    }

    /// Read every event, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Vec::new();
        for line in Self::lines(path.as_ref())? {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }

    /// Check every link of the hash chain.
    ///
    /// Returns the number of events on success, or `IntegrityViolation` at the
    /// first broken link. A log with lines cut off its end still verifies.
    pub fn verify_chain(path: impl AsRef<Path>) -> Result<usize, AuditError> {
        let mut previous_hash: Option<String> = None;
        let mut count = 0;

        for (index, line) in Self::lines(path.as_ref())?.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: AuditEvent = serde_json::from_str(&line)?;
            if event.previous_hash != previous_hash {
                return Err(AuditError::IntegrityViolation {
                    line: index + 1,
                    expected: previous_hash.unwrap_or_else(|| "None".to_string()),
                    actual: event.previous_hash.unwrap_or_else(|| "None".to_string()),
                });
            }

            previous_hash = Some(hasher::hash_str(&line));
            count += 1;
        }

        Ok(count)
    }

    /// Wrap the log for sharing across components.
    pub fn shared(self) -> SharedAuditLog {
        Arc::new(Mutex::new(self))
    }

    /// Append to a shared log. Failures, including a poisoned lock, are
    /// logged at warn level and otherwise ignored.
    pub fn record(log: &SharedAuditLog, mut event: AuditEvent) {
        match log.lock() {
            Ok(mut guard) => {
                if let Err(e) = guard.append(&mut event) {
                    tracing::warn!(action = ?event.action, "failed to record audit event: {}", e);
                }
            }
            Err(_) => tracing::warn!(action = ?event.action, "audit log lock poisoned, event dropped"),
        }
    }

    fn lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>, AuditError> {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::new(file).lines())
    }

    fn read_last_hash(path: &Path) -> Result<Option<String>, AuditError> {
        let mut last_line = None;
        for line in Self::lines(path)? {
            let line = line?;
            if !line.trim().is_empty() {
                last_line = Some(line);
            }
        }
        Ok(last_line.map(|line| hasher::hash_str(&line)))
    }
}
