//! Reversal of the most recent run.
//!
//! Undo pops the tail run record from the manifest and moves each file
//! back, last-applied first. The manifest is already shortened when
//! reversal starts (see [`ManifestStore::pop_tail`]); a run that has been
//! popped can never be re-undone, even if some of its files could not be
//! moved back.

use crate::manifest::{ManifestError, ManifestStore};
use crate::output::OutputFormatter;
use crate::processor::move_file;
use std::fs;
use std::path::PathBuf;

/// Tallies for one reversal pass.
#[derive(Debug)]
pub struct UndoOutcome {
    /// Files moved back to their original locations.
    pub reverted: usize,
    /// Files whose recorded destination no longer existed.
    pub skipped: Vec<(PathBuf, String)>,
    /// Files that could not be moved back, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl UndoOutcome {
    fn new() -> Self {
        Self {
            reverted: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// True when every recorded action was reverted.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Reverts the most recently recorded run.
pub struct UndoEngine;

impl UndoEngine {
    /// Pops the tail run record and reverses its moves in LIFO order.
    ///
    /// Returns `Ok(None)` when there is no recorded run — a normal
    /// outcome, not an error. Per-file problems (destination vanished,
    /// permission denied) are collected in the outcome; only a manifest
    /// persistence failure is a hard error.
    pub fn revert_last(store: &ManifestStore) -> Result<Option<UndoOutcome>, ManifestError> {
        let Some(record) = store.pop_tail()? else {
            return Ok(None);
        };

        let mut outcome = UndoOutcome::new();

        for action in record.actions.iter().rev() {
            if !action.destination.exists() {
                OutputFormatter::warning(&format!(
                    "File not found at {}, skipping...",
                    action.destination.display()
                ));
                outcome.skipped.push((
                    action.destination.clone(),
                    "File not found at recorded destination".to_string(),
                ));
                continue;
            }

            if let Some(parent) = action.source.parent()
                && let Err(e) = fs::create_dir_all(parent)
            {
                outcome.failed.push((
                    action.destination.clone(),
                    format!("Cannot recreate {}: {}", parent.display(), e),
                ));
                continue;
            }

            match move_file(&action.destination, &action.source) {
                Ok(()) => outcome.reverted += 1,
                Err(e) => outcome.failed.push((
                    action.destination.clone(),
                    format!("Failed to restore file: {}", e),
                )),
            }
        }

        Ok(Some(outcome))
    }
}
