//! Command-line interface.
//!
//! Two operations are exposed: `clean` runs a scan-and-process pass
//! (optionally as a dry run) and `undo` reverts the most recent pass.
//! This layer only loads configuration, wires the core components
//! together, and relays their counts and messages.

use crate::config::{CONFIG_FILE_NAME, Config, ConfigError};
use crate::manifest::ManifestStore;
use crate::notify::NotificationCenter;
use crate::output::OutputFormatter;
use crate::processor::{ActionProcessor, CleanReport, RunMode};
use crate::scanner::RuleScanner;
use crate::undo::UndoEngine;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fylum: a smart file organizer.
#[derive(Debug, Parser)]
#[command(name = "fylum", version, about = "Organize files by rules, with a reversible manifest")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Organize files in the target directories based on the configured rules.
    Clean {
        /// Preview the file operations without making any changes.
        #[arg(long)]
        dry_run: bool,

        /// Read configuration from a specific file instead of fylum.toml.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Revert the last cleaning operation.
    Undo,
}

/// Entry point used by `main`; dispatches the parsed command.
pub fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Clean { dry_run, config } => run_clean(dry_run, config.as_deref()),
        Command::Undo => run_undo(),
    }
}

fn run_clean(dry_run: bool, config_path: Option<&Path>) -> Result<(), String> {
    let config = match Config::load(config_path) {
        Ok(config) => config,
        // First run without an explicit --config: write the commented
        // default file and stop so the user can review it.
        Err(ConfigError::ConfigNotFound(path)) if config_path.is_none() => {
            OutputFormatter::info(&format!("Configuration file not found at '{}'.", path.display()));
            OutputFormatter::info(&format!("Creating a default {} for you...", CONFIG_FILE_NAME));
            Config::write_default(&path).map_err(|e| e.to_string())?;
            OutputFormatter::plain(&format!(
                "Please review the default settings in {} before running a clean operation.",
                CONFIG_FILE_NAME
            ));
            return Ok(());
        }
        Err(e) => return Err(e.to_string()),
    };

    let compiled = config.compile().map_err(|e| e.to_string())?;
    OutputFormatter::info("Configuration loaded successfully.");

    if dry_run {
        OutputFormatter::dry_run_notice("No files will be moved or renamed.");
    }

    let actions = RuleScanner::new(&compiled).scan();
    if actions.is_empty() {
        OutputFormatter::plain("No files found that match the rules. Everything is already organized.");
        return Ok(());
    }
    OutputFormatter::plain(&format!("Found {} actions to perform.", actions.len()));

    let mode = if dry_run { RunMode::Simulate } else { RunMode::Apply };
    let store = ManifestStore::new();
    let mut notifier = NotificationCenter::new();
    let report = ActionProcessor::new(&compiled.template, mode, &store)
        .with_notifier(&mut notifier)
        .process(&actions);

    if dry_run {
        for action in &report.applied {
            OutputFormatter::dry_run_notice(&format!(
                "Would move: {} -> {}",
                action.source.display(),
                action.destination.display()
            ));
        }
    }

    for (path, reason) in &report.skipped {
        OutputFormatter::error(&format!("Skipped {}: {}", path.display(), reason));
    }

    print_summary(&report);

    if dry_run {
        OutputFormatter::plain(&format!(
            "\n[DRY RUN] Would have processed {} files.",
            report.processed
        ));
    } else {
        OutputFormatter::success(&format!(
            "\nSuccessfully processed {} files.",
            report.processed
        ));
        OutputFormatter::plain("Index manifest updated: _fylum_index.md");
    }

    OutputFormatter::plain("Done.");
    Ok(())
}

/// Tabulates processed files per destination directory.
fn print_summary(report: &CleanReport) {
    if report.applied.is_empty() {
        return;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for action in &report.applied {
        let destination = action
            .destination
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        *counts.entry(destination).or_insert(0) += 1;
    }
    OutputFormatter::summary_table(&counts, report.processed);
}

fn run_undo() -> Result<(), String> {
    OutputFormatter::plain("Looking for the index manifest to undo the last operation...");

    let store = ManifestStore::new();
    if let Some(last) = store.peek_tail() {
        OutputFormatter::info(&format!(
            "Reverting run from {}",
            last.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    match UndoEngine::revert_last(&store) {
        Ok(None) => {
            OutputFormatter::plain("No previous run found to undo.");
            Ok(())
        }
        Ok(Some(outcome)) => {
            if outcome.reverted > 0 {
                OutputFormatter::success(&format!(
                    "Successfully reverted {} files to their original locations.",
                    outcome.reverted
                ));
            } else {
                OutputFormatter::plain("No files were reverted.");
            }

            for (path, reason) in &outcome.skipped {
                OutputFormatter::warning(&format!("{}: {}", path.display(), reason));
            }
            for (path, reason) in &outcome.failed {
                OutputFormatter::error(&format!("{}: {}", path.display(), reason));
            }

            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}
