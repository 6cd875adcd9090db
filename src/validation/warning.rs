//! Diagnostic types for non-fatal extraction problems.

use std::fmt;

use serde::Serialize;

use crate::error::CharexError;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic about one container entry.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Machine-readable code (e.g. "charex::texture::decode").
    pub code: String,
    /// The entry concerned, e.g. "tex#12" or "#40".
    pub subject: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Optional help text suggesting how to fix the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            subject: None,
            message: message.into(),
            help: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            subject: None,
            message: message.into(),
            help: None,
        }
    }

    /// Attach the entry this diagnostic is about.
    pub fn about(mut self, subject: impl fmt::Display) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Add help text to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<&CharexError> for Diagnostic {
    /// Record a recovered per-entry failure.
    fn from(err: &CharexError) -> Self {
        let diagnostic = Diagnostic::error(error_code(err), err.to_string());
        match err {
            CharexError::TextureDecode { texture, .. } => diagnostic.about(texture),
            _ => diagnostic,
        }
    }
}

fn error_code(err: &CharexError) -> String {
    use miette::Diagnostic as _;
    err.code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "charex::error".to_string())
}

/// Collects diagnostics produced while building a catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a warning diagnostic.
    pub fn warning(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.push(Diagnostic::warning(code, message));
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Count errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Count warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are no diagnostics at all.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Iterate over diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics with a given code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::TextureId;

    #[test]
    fn test_empty_result() {
        let result = ValidationResult::new();
        assert!(result.is_ok());
        assert!(!result.has_errors());
        assert_eq!(result.error_count(), 0);
        assert_eq!(result.warning_count(), 0);
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationResult::new();
        a.push(Diagnostic::error("charex::a", "error a"));

        let mut b = ValidationResult::new();
        b.warning("charex::b", "warning b");

        a.merge(b);
        assert_eq!(a.error_count(), 1);
        assert_eq!(a.warning_count(), 1);
    }

    #[test]
    fn test_from_texture_decode_error() {
        let err = CharexError::TextureDecode {
            texture: TextureId(5),
            name: "atlas".to_string(),
            message: "bad".to_string(),
        };
        let d = Diagnostic::from(&err);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.code, "charex::texture::decode");
        assert_eq!(d.subject.as_deref(), Some("tex#5"));
    }

    #[test]
    fn test_diagnostic_with_help() {
        let d = Diagnostic::warning("charex::test", "odd record")
            .about("#4")
            .with_help("Rename the record");
        assert_eq!(d.subject.as_deref(), Some("#4"));
        assert_eq!(d.help.as_deref(), Some("Rename the record"));
    }
}
