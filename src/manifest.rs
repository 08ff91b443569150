//! Append-only run manifest.
//!
//! Every completed apply run adds one [`RunRecord`] to a pair of documents
//! in the working directory:
//!
//! - `_fylum_index.json` — the structured log the undo engine reads back:
//!   an ordered JSON array of `{timestamp, actions: [{source, destination}]}`;
//! - `_fylum_index.md` — a human-readable audit trailer, one appended
//!   section per run, never read programmatically.
//!
//! The JSON document is the single source of truth for what can still be
//! undone. An absent or unparseable document reads as empty history and is
//! overwritten on the next write; availability wins over strict durability
//! here. The two writes per append are not transactional.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Structured manifest file name, relative to the working directory.
pub const MANIFEST_JSON_NAME: &str = "_fylum_index.json";
/// Audit trailer file name, relative to the working directory.
pub const MANIFEST_LOG_NAME: &str = "_fylum_index.md";

/// Errors raised by manifest persistence.
#[derive(Debug)]
pub enum ManifestError {
    /// Failed to read the structured document.
    ReadFailed { source: std::io::Error },
    /// Failed to write the structured document or the audit trailer.
    WriteFailed { source: std::io::Error },
    /// Failed to serialize run records to JSON.
    SerializeFailed { reason: String },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::ReadFailed { source } => {
                write!(f, "Failed to read manifest: {}", source)
            }
            ManifestError::WriteFailed { source } => {
                write!(f, "Failed to write manifest: {}", source)
            }
            ManifestError::SerializeFailed { reason } => {
                write!(f, "Failed to serialize manifest: {}", reason)
            }
        }
    }
}

impl std::error::Error for ManifestError {}

/// The historical record of one completed move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedAction {
    /// Absolute path before the move.
    pub source: PathBuf,
    /// Absolute path after rename and collision resolution.
    pub destination: PathBuf,
    /// When the move was applied. In-memory only; the on-disk record
    /// carries the run-level timestamp instead.
    #[serde(skip, default = "Local::now")]
    pub applied_at: DateTime<Local>,
}

impl AppliedAction {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            applied_at: Local::now(),
        }
    }
}

/// One completed processing pass: its completion time and every move it
/// applied, oldest first. Undo replays `actions` in reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Local>,
    pub actions: Vec<AppliedAction>,
}

impl RunRecord {
    pub fn new(actions: Vec<AppliedAction>) -> Self {
        Self {
            timestamp: Local::now(),
            actions,
        }
    }
}

/// Durable append-only log of [`RunRecord`]s.
///
/// The whole document is loaded and rewritten on every mutation; callers
/// are expected to serialize invocations (no internal locking).
pub struct ManifestStore {
    json_path: PathBuf,
    log_path: PathBuf,
}

impl ManifestStore {
    /// Store at the well-known locations in the working directory.
    pub fn new() -> Self {
        Self {
            json_path: PathBuf::from(MANIFEST_JSON_NAME),
            log_path: PathBuf::from(MANIFEST_LOG_NAME),
        }
    }

    /// Store rooted in a specific directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            json_path: dir.join(MANIFEST_JSON_NAME),
            log_path: dir.join(MANIFEST_LOG_NAME),
        }
    }

    /// All recorded runs, oldest first. Absent or corrupt documents read
    /// as empty history.
    pub fn runs(&self) -> Vec<RunRecord> {
        let Ok(content) = fs::read_to_string(&self.json_path) else {
            return Vec::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// The most recent run, if any, without mutating the log.
    pub fn peek_tail(&self) -> Option<RunRecord> {
        self.runs().pop()
    }

    /// Appends a run record: structured document first, audit trailer
    /// second.
    pub fn append(&self, record: &RunRecord) -> Result<(), ManifestError> {
        let mut records = self.runs();
        records.push(record.clone());
        self.persist(&records)?;
        self.append_log_section(record)
    }

    /// Detaches and returns the most recent run record.
    ///
    /// The shortened document is persisted before this returns, so by the
    /// time the caller starts reversing moves the manifest already
    /// considers the run undone. A pop can therefore not be retried.
    pub fn pop_tail(&self) -> Result<Option<RunRecord>, ManifestError> {
        let mut records = self.runs();
        let Some(record) = records.pop() else {
            return Ok(None);
        };
        self.persist(&records)?;
        Ok(Some(record))
    }

    fn persist(&self, records: &[RunRecord]) -> Result<(), ManifestError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| ManifestError::SerializeFailed {
                reason: e.to_string(),
            })?;
        fs::write(&self.json_path, json).map_err(|e| ManifestError::WriteFailed { source: e })
    }

    fn append_log_section(&self, record: &RunRecord) -> Result<(), ManifestError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| ManifestError::WriteFailed { source: e })?;

        let mut section = String::new();
        section.push_str(&format!(
            "\n## Fylum Run - {}\n\n",
            record.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        section.push_str("| Original Path | New Path |\n");
        section.push_str("|---------------|----------|\n");
        for action in &record.actions {
            section.push_str(&format!(
                "| {} | {} |\n",
                action.source.display(),
                action.destination.display()
            ));
        }
        section.push('\n');

        file.write_all(section.as_bytes())
            .map_err(|e| ManifestError::WriteFailed { source: e })
    }
}

impl Default for ManifestStore {
    fn default() -> Self {
        Self::new()
    }
}
