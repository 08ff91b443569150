//! Directory scanning and rule matching.
//!
//! Walks every configured target directory, filters out ignored files,
//! and pairs each remaining file with the destination of the first rule
//! whose extension set matches. The scan is read-only; it only describes
//! the moves a processing pass would perform.

use crate::config::CompiledConfig;
use crate::output::OutputFormatter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A move the processor has not yet performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingAction {
    /// The file as found during the scan.
    pub source: PathBuf,
    /// The matching rule's destination directory.
    pub destination_dir: PathBuf,
}

/// Scans target directories and applies rules to find files to move.
pub struct RuleScanner<'a> {
    config: &'a CompiledConfig,
}

impl<'a> RuleScanner<'a> {
    pub fn new(config: &'a CompiledConfig) -> Self {
        Self { config }
    }

    /// Walks all configured roots and returns every pending action.
    ///
    /// Roots that are missing or not directories are skipped with a
    /// warning. Output order follows the filesystem walk and is not
    /// stable across platforms; callers must only rely on membership.
    pub fn scan(&self) -> Vec<PendingAction> {
        let mut actions = Vec::new();

        for target in &self.config.targets {
            if !target.is_dir() {
                OutputFormatter::warning(&format!(
                    "Target directory '{}' does not exist or is not a directory.",
                    target.display()
                ));
                continue;
            }

            for entry in WalkDir::new(target).into_iter().filter_map(Result::ok) {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(action) = self.match_file(path) {
                    actions.push(action);
                }
            }
        }

        actions
    }

    /// Applies ignore patterns and rule matching to a single file.
    fn match_file(&self, path: &Path) -> Option<PendingAction> {
        let file_name = path.file_name()?.to_string_lossy();
        if self.config.is_ignored(&file_name) {
            return None;
        }

        let extension = normalized_extension(path)?;
        let rule = self.config.match_rule(&extension)?;

        Some(PendingAction {
            source: path.to_path_buf(),
            destination_dir: rule.destination.clone(),
        })
    }
}

/// The file's extension, lower-cased with the leading dot, or `None` for
/// extension-less files (which can never match a rule).
fn normalized_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}
