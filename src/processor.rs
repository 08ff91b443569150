//! Action processing: rename, collision resolution, and the move itself.
//!
//! The processor consumes the scanner's pending actions. In simulate mode
//! it only records what would happen; in apply mode it creates destination
//! directories, resolves name collisions, moves files, appends one run
//! record to the manifest, and emits a success notification through the
//! optional sink. Per-file failures are reported and skipped; they never
//! abort the batch.

use crate::manifest::{AppliedAction, ManifestStore, RunRecord};
use crate::notify::{NotificationKind, NotificationSink};
use crate::output::OutputFormatter;
use crate::scanner::PendingAction;
use crate::template::RenameTemplate;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a processing pass mutates the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Preview only: no directories created, no files moved, no manifest
    /// write, no notification.
    Simulate,
    /// Perform the moves and record the run.
    Apply,
}

/// Outcome of one processing pass.
#[derive(Debug)]
pub struct CleanReport {
    /// Number of actions processed (applied, or counted in simulate mode).
    pub processed: usize,
    /// The moves performed, in application order. Populated in simulate
    /// mode too, as a preview of what an apply run would do.
    pub applied: Vec<AppliedAction>,
    /// Files skipped with the reason, e.g. vanished mid-scan or a failed
    /// move.
    pub skipped: Vec<(PathBuf, String)>,
}

impl CleanReport {
    fn new() -> Self {
        Self {
            processed: 0,
            applied: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Applies pending actions and records the run.
pub struct ActionProcessor<'a> {
    template: &'a RenameTemplate,
    mode: RunMode,
    store: &'a ManifestStore,
    notifier: Option<&'a mut dyn NotificationSink>,
}

impl<'a> ActionProcessor<'a> {
    pub fn new(template: &'a RenameTemplate, mode: RunMode, store: &'a ManifestStore) -> Self {
        Self {
            template,
            mode,
            store,
            notifier: None,
        }
    }

    /// Injects the optional notification sink.
    pub fn with_notifier(mut self, notifier: &'a mut dyn NotificationSink) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Processes the batch, returning counts and the applied actions.
    ///
    /// After an apply run with at least one successful move, exactly one
    /// run record is appended to the manifest; a manifest write failure
    /// downgrades to a warning since the moves themselves already
    /// happened. Simulate runs never touch the manifest.
    pub fn process(mut self, actions: &[PendingAction]) -> CleanReport {
        let mut report = CleanReport::new();

        let bar = match self.mode {
            RunMode::Apply if !actions.is_empty() => {
                Some(OutputFormatter::progress_bar(actions.len() as u64))
            }
            _ => None,
        };

        for action in actions {
            let destination = match self.plan_destination(action) {
                Ok(destination) => destination,
                Err(reason) => {
                    report.skipped.push((action.source.clone(), reason));
                    if let Some(bar) = &bar {
                        bar.inc(1);
                    }
                    continue;
                }
            };

            match self.mode {
                RunMode::Simulate => {
                    report
                        .applied
                        .push(AppliedAction::new(action.source.clone(), destination));
                    report.processed += 1;
                }
                RunMode::Apply => {
                    match self.apply_move(&action.source, destination) {
                        Ok(final_destination) => {
                            if let Some(bar) = &bar {
                                bar.println(format!(
                                    "Moved: {} -> {}",
                                    action.source.display(),
                                    final_destination.display()
                                ));
                            }
                            report.applied.push(AppliedAction::new(
                                action.source.clone(),
                                final_destination,
                            ));
                            report.processed += 1;
                        }
                        Err(reason) => {
                            if let Some(bar) = &bar {
                                bar.println(format!(
                                    "Error moving {}: {}",
                                    action.source.display(),
                                    reason
                                ));
                            }
                            report.skipped.push((action.source.clone(), reason));
                        }
                    }
                    if let Some(bar) = &bar {
                        bar.inc(1);
                    }
                }
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        if self.mode == RunMode::Apply && !report.applied.is_empty() {
            let record = RunRecord::new(report.applied.clone());
            if let Err(e) = self.store.append(&record) {
                OutputFormatter::warning(&format!("Could not save run manifest: {}", e));
            }

            if report.processed > 0
                && let Some(notifier) = self.notifier.as_mut()
            {
                notifier.notify(
                    "Files Organized",
                    &format!("Successfully processed {} file(s)", report.processed),
                    NotificationKind::Success,
                );
            }
        }

        report
    }

    /// Computes the renamed destination path for one action, before any
    /// collision check. The only filesystem access is the metadata read.
    fn plan_destination(&self, action: &PendingAction) -> Result<PathBuf, String> {
        let metadata = fs::metadata(&action.source)
            .map_err(|e| format!("Cannot read file metadata: {}", e))?;
        let modified: DateTime<Local> = metadata
            .modified()
            .map_err(|e| format!("Cannot read modification time: {}", e))?
            .into();

        let stem = action
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = action
            .source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let file_name = format!("{}{}", self.template.render(&stem, modified), extension);
        Ok(action.destination_dir.join(file_name))
    }

    /// Creates the destination's parent chain, resolves collisions, and
    /// moves the file. Returns the path actually written.
    fn apply_move(&self, source: &Path, destination: PathBuf) -> Result<PathBuf, String> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Cannot create {}: {}", parent.display(), e))?;
        }

        let destination = resolve_collision(destination);
        move_file(source, &destination).map_err(|e| e.to_string())?;
        Ok(destination)
    }
}

/// Appends `_1`, `_2`, … to the stem until the path does not exist.
///
/// The suffix always derives from the original stem, so a crowded
/// destination yields `name_1`, `name_2`, never `name_1_2`. The
/// check-then-move window against concurrent external writers is an
/// accepted limitation.
pub(crate) fn resolve_collision(destination: PathBuf) -> PathBuf {
    if !destination.exists() {
        return destination;
    }

    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = destination
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let parent = destination
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{}_{}{}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Moves a file, falling back to copy + remove when a plain rename fails
/// (cross-device destinations).
pub(crate) fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}
