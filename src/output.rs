//! Terminal output and styling.
//!
//! Centralizes colored messages, the apply-mode progress bar, and the
//! per-destination summary table so the rest of the crate never formats
//! terminal output on its own.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Consistent styling for everything fylum prints.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Progress bar used while applying a batch of moves.
    pub fn progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary table of processed files per destination directory.
    pub fn summary_table(destination_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        // Sort destinations for stable output
        let mut destinations: Vec<_> = destination_counts.iter().collect();
        destinations.sort_by_key(|&(name, _)| name);

        let width = destinations
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(11); // at least "Destination"

        println!(
            "{:<width$} | {}",
            "Destination".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (destination, count) in &destinations {
            let file_word = if **count == 1 { "file" } else { "files" };
            println!(
                "{:<width$} | {} {}",
                destination,
                count.to_string().green(),
                file_word,
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            if total_files == 1 { "file" } else { "files" },
            width = width
        );
    }
}
