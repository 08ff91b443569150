//! Rule-set configuration.
//!
//! Configuration is stored in TOML and describes which directories to
//! scan, which files to leave alone, how moved files are renamed, and the
//! ordered classification rules:
//!
//! ```toml
//! target_directories = ["~/Downloads", "~/Desktop"]
//! ignore_patterns = [".DS_Store", "*.tmp", "~$*"]
//! rename_format = "{date:%Y-%m-%d}_{original_filename}"
//!
//! [[rules]]
//! name = "Images"
//! extensions = [".jpg", ".png"]
//! destination = "~/Pictures/Fylum/Images"
//! ```
//!
//! Rules are evaluated in file order; the first rule whose extension set
//! contains a file's extension wins. `Config` is the raw deserialized
//! form; `CompiledConfig` is the validated, immutable value the scanner
//! and processor borrow.

use crate::template::RenameTemplate;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Well-known config file name, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "fylum.toml";

/// Contents written on first run when no config file exists yet.
const DEFAULT_CONFIG_TOML: &str = r#"# fylum configuration
#
# Files found under target_directories are matched against the rules below
# (first match wins) and moved into the matching destination. Review these
# defaults before running `fylum clean`.

target_directories = ["~/Downloads", "~/Desktop"]

# Shell globs matched against file names; matching files are never touched.
ignore_patterns = [".DS_Store", "*.tmp", "~$*"]

# Tokens: {date:...} (strftime, from the file's modification time) and
# {original_filename} (the stem; the extension is kept automatically).
rename_format = "{date:%Y-%m-%d}_{original_filename}"

[[rules]]
name = "Images"
extensions = [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"]
destination = "~/Pictures/Fylum/Images"

[[rules]]
name = "Documents"
extensions = [".pdf", ".docx", ".xlsx", ".pptx", ".txt", ".md", ".csv"]
destination = "~/Documents/Fylum/Documents"

[[rules]]
name = "Archives"
extensions = [".zip", ".rar", ".7z", ".tar", ".gz"]
destination = "~/Documents/Fylum/Archives"

[[rules]]
name = "Installers"
extensions = [".exe", ".msi", ".dmg"]
destination = "~/Documents/Fylum/Installers"
"#;

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid ignore glob pattern.
    InvalidIgnorePattern(String),
    /// Invalid rename format string, with the reason.
    InvalidRenameFormat {
        format: String,
        reason: String,
    },
    /// IO error while reading or writing configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidIgnorePattern(pattern) => {
                write!(f, "Invalid ignore pattern '{}'", pattern)
            }
            ConfigError::InvalidRenameFormat { format, reason } => {
                write!(f, "Invalid rename format '{}': {}", format, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// One classification rule: extensions mapped to a destination directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub extensions: Vec<String>,
    pub destination: String,
}

/// Raw configuration as deserialized from `fylum.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target_directories: Vec<String>,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default = "default_rename_format")]
    pub rename_format: String,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_rename_format() -> String {
    "{date:%Y-%m-%d}_{original_filename}".to_string()
}

impl Config {
    /// Load configuration from an explicit path, or `fylum.toml` in the
    /// working directory when none is given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist;
    /// callers decide whether that means "create a default" (see
    /// [`Config::write_default`]) or is fatal.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path));
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Write the commented default configuration to `path`.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Validate and compile into the immutable form used by the scanner
    /// and processor.
    ///
    /// # Errors
    ///
    /// Returns an error if an ignore pattern is not a valid glob or the
    /// rename format has an unknown token or bad date format.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        CompiledConfig::new(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default configuration is valid TOML")
    }
}

/// A rule with normalized extensions and an expanded destination path.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    /// Lower-case extensions including the leading dot.
    pub extensions: HashSet<String>,
    pub destination: PathBuf,
}

impl CompiledRule {
    /// Whether this rule claims a file with the given extension
    /// (lower-case, leading dot).
    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }
}

/// Validated, immutable configuration.
///
/// All patterns are pre-compiled and all paths tilde-expanded, so matching
/// never reparses anything per file.
pub struct CompiledConfig {
    pub targets: Vec<PathBuf>,
    pub ignore_patterns: Vec<Pattern>,
    pub template: RenameTemplate,
    pub rules: Vec<CompiledRule>,
}

impl CompiledConfig {
    fn new(config: Config) -> Result<Self, ConfigError> {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .map_err(|_| ConfigError::InvalidIgnorePattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let template = RenameTemplate::parse(&config.rename_format).map_err(|e| {
            ConfigError::InvalidRenameFormat {
                format: config.rename_format.clone(),
                reason: e.to_string(),
            }
        })?;

        let rules = config
            .rules
            .into_iter()
            .map(|rule| CompiledRule {
                name: rule.name,
                extensions: rule
                    .extensions
                    .iter()
                    .map(|ext| normalize_extension(ext))
                    .collect(),
                destination: expand_tilde(&rule.destination),
            })
            .collect();

        Ok(Self {
            targets: config
                .target_directories
                .iter()
                .map(|dir| expand_tilde(dir))
                .collect(),
            ignore_patterns,
            template,
            rules,
        })
    }

    /// Whether a file name matches any ignore pattern.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches(file_name))
    }

    /// First rule matching the given extension (lower-case, leading dot).
    pub fn match_rule(&self, extension: &str) -> Option<&CompiledRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches_extension(extension))
    }
}

/// Lower-cases an extension and guarantees the leading dot.
fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Expands a leading `~` against the HOME environment variable.
fn expand_tilde(path: &str) -> PathBuf {
    expand_tilde_with(path, std::env::var("HOME").ok().as_deref())
}

fn expand_tilde_with(path: &str, home: Option<&str>) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~")
        && let Some(home) = home
    {
        if rest.is_empty() {
            return PathBuf::from(home);
        }
        if let Some(relative) = rest.strip_prefix('/') {
            return Path::new(home).join(relative);
        }
    }
    PathBuf::from(path)
}
