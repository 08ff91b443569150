//! Rename template parsing and rendering.
//!
//! A rename format is a string with two substitution tokens:
//!
//! - `{date}` or `{date:%Y-%m-%d}` — the file's last-modification date,
//!   formatted with a strftime-style format string (defaults to `%Y-%m-%d`);
//! - `{original_filename}` — the original file stem, extension excluded.
//!
//! Templates are parsed once when the configuration is compiled, so a bad
//! token or date format is rejected before any file is touched. The
//! extension is appended by the caller, never by the template.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use regex::Regex;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while parsing a rename format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{...}` token other than `date` or `original_filename`.
    UnknownToken(String),
    /// The format string of a `{date:...}` token is not valid strftime.
    InvalidDateFormat(String),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::UnknownToken(token) => {
                write!(f, "Unknown template token '{{{}}}'", token)
            }
            TemplateError::InvalidDateFormat(format) => {
                write!(f, "Invalid date format '{}'", format)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Date(String),
    Stem,
}

/// A parsed rename format, ready to render file names.
#[derive(Debug, Clone)]
pub struct RenameTemplate {
    segments: Vec<Segment>,
}

impl RenameTemplate {
    /// Parses a rename format string, validating every token.
    pub fn parse(format: &str) -> Result<Self, TemplateError> {
        let token_re = Regex::new(r"\{([^{}]*)\}").expect("token regex is valid");

        let mut segments = Vec::new();
        let mut cursor = 0;

        for captures in token_re.captures_iter(format) {
            let whole = captures.get(0).expect("capture 0 always present");
            let token = &captures[1];

            if whole.start() > cursor {
                segments.push(Segment::Literal(format[cursor..whole.start()].to_string()));
            }
            cursor = whole.end();

            if token == "original_filename" {
                segments.push(Segment::Stem);
            } else if token == "date" {
                segments.push(Segment::Date(DEFAULT_DATE_FORMAT.to_string()));
            } else if let Some(date_format) = token.strip_prefix("date:") {
                validate_date_format(date_format)?;
                segments.push(Segment::Date(date_format.to_string()));
            } else {
                return Err(TemplateError::UnknownToken(token.to_string()));
            }
        }

        if cursor < format.len() {
            segments.push(Segment::Literal(format[cursor..].to_string()));
        }

        Ok(Self { segments })
    }

    /// Renders the new file stem for one file.
    ///
    /// `stem` is the original file name without extension, `modified` the
    /// file's last-modification time.
    pub fn render(&self, stem: &str, modified: DateTime<Local>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Date(format) => {
                    out.push_str(&modified.format(format).to_string());
                }
                Segment::Stem => out.push_str(stem),
            }
        }
        out
    }
}

/// Rejects strftime strings chrono cannot format.
fn validate_date_format(format: &str) -> Result<(), TemplateError> {
    let has_error = StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if has_error {
        return Err(TemplateError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_render_date_and_stem() {
        let template = RenameTemplate::parse("{date:%Y-%m-%d}_{original_filename}").unwrap();
        assert_eq!(template.render("report", sample_time()), "2024-03-15_report");
    }

    #[test]
    fn test_render_stem_only() {
        let template = RenameTemplate::parse("{original_filename}").unwrap();
        assert_eq!(template.render("photo", sample_time()), "photo");
    }

    #[test]
    fn test_render_literal_text_preserved() {
        let template = RenameTemplate::parse("sorted-{original_filename}-v2").unwrap();
        assert_eq!(template.render("notes", sample_time()), "sorted-notes-v2");
    }

    #[test]
    fn test_bare_date_token_uses_default_format() {
        let template = RenameTemplate::parse("{date}_{original_filename}").unwrap();
        assert_eq!(template.render("a", sample_time()), "2024-03-15_a");
    }

    #[test]
    fn test_custom_date_format() {
        let template = RenameTemplate::parse("{date:%Y%m%d-%H%M}-{original_filename}").unwrap();
        assert_eq!(template.render("scan", sample_time()), "20240315-1030-scan");
    }

    #[test]
    fn test_unknown_token_rejected() {
        let result = RenameTemplate::parse("{nope}_{original_filename}");
        assert_eq!(result.unwrap_err(), TemplateError::UnknownToken("nope".to_string()));
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let result = RenameTemplate::parse("{date:%Q}");
        assert!(matches!(result, Err(TemplateError::InvalidDateFormat(_))));
    }

    #[test]
    fn test_plain_string_is_all_literal() {
        let template = RenameTemplate::parse("fixed_name").unwrap();
        assert_eq!(template.render("ignored", sample_time()), "fixed_name");
    }
}
