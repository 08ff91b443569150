//! fylum - a rule-driven file organizer with reversible runs
//!
//! This library scans configured directories, matches files against an
//! ordered rule list, moves them into classified destinations with
//! collision-safe renaming, records every completed pass in an
//! append-only manifest, and can fully revert the most recent pass.

pub mod cli;
pub mod config;
pub mod manifest;
pub mod notify;
pub mod output;
pub mod processor;
pub mod scanner;
pub mod template;
pub mod undo;

pub use config::{CompiledConfig, CompiledRule, Config, ConfigError, Rule};
pub use manifest::{AppliedAction, ManifestError, ManifestStore, RunRecord};
pub use notify::{Notification, NotificationCenter, NotificationKind, NotificationSink};
pub use processor::{ActionProcessor, CleanReport, RunMode};
pub use scanner::{PendingAction, RuleScanner};
pub use template::{RenameTemplate, TemplateError};
pub use undo::{UndoEngine, UndoOutcome};

pub use cli::{Cli, run};
