//! Desktop-style notifications.
//!
//! The processor announces a completed run through an optional
//! [`NotificationSink`] injected at construction time. The default
//! implementation, [`NotificationCenter`], keeps a history of everything it
//! was asked to send and prints a prefixed console line when enabled; a
//! platform toast backend would implement the same trait.

use chrono::{DateTime, Local};
use colored::*;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    /// Short prefix used for visual distinction, matching the severity.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::Success => "[OK]",
            NotificationKind::Error => "[ERROR]",
            NotificationKind::Info => "[INFO]",
            NotificationKind::Warning => "[WARN]",
        }
    }
}

/// Record of one sent notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub sent_at: DateTime<Local>,
}

/// Receiver for run notifications.
///
/// The processor calls this at most once per apply run, with the processed
/// count, and never during dry runs or undo.
pub trait NotificationSink {
    fn notify(&mut self, title: &str, message: &str, kind: NotificationKind);
}

/// History-keeping notification sink with a console backend.
pub struct NotificationCenter {
    enabled: bool,
    history: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            enabled: true,
            history: Vec::new(),
        }
    }

    /// Enable or disable delivery. History is recorded either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// All notifications recorded so far, oldest first.
    pub fn history(&self) -> &[Notification] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(&mut self, title: &str, message: &str, kind: NotificationKind) {
        self.history.push(Notification {
            title: title.to_string(),
            message: message.to_string(),
            kind,
            sent_at: Local::now(),
        });

        if !self.enabled {
            return;
        }

        let line = format!("{} {}: {}", kind.label(), title, message);
        match kind {
            NotificationKind::Success => println!("{}", line.green()),
            NotificationKind::Error => eprintln!("{}", line.red()),
            NotificationKind::Info => println!("{}", line.cyan()),
            NotificationKind::Warning => println!("{}", line.yellow()),
        }
    }
}
