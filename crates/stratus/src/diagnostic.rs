//! Source-located diagnostics for manifest errors.
//!
//! A [`Diagnostic`] is a single problem found in a manifest, with an
//! [`ErrorCode`], one or more labeled byte spans and optional help text.
//! [`ManifestError`] collects every diagnostic found in one manifest so that
//! all of them can be reported at once.

use std::{fmt, ops::Range};

/// Stable codes for manifest problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The manifest is not valid TOML or does not match the manifest schema.
    E100,
    /// An id is declared more than once.
    E200,
    /// A reference names an undeclared node or cluster.
    E201,
    /// Cluster nesting forms a cycle.
    E202,
    /// A value (category, color) cannot be parsed.
    E300,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A labeled byte range in the manifest source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Range<usize>,
    message: String,
    primary: bool,
}

impl Label {
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

/// A single manifest problem.
///
/// # Example
///
/// ```
/// use stratus::diagnostic::{Diagnostic, ErrorCode};
///
/// let diag = Diagnostic::error("edge references undeclared node `db`")
///     .with_code(ErrorCode::E201)
///     .with_label(42..46, "not declared")
///     .with_help("declare it in a [[node]] table");
///
/// assert_eq!(diag.labels().len(), 1);
/// assert_eq!(diag.code(), Some(ErrorCode::E201));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Range<usize>, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
            primary: true,
        });
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Range<usize>, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            message: message.into(),
            primary: false,
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "error[{code}]: {}", self.message),
            None => write!(f, "error: {}", self.message),
        }
    }
}

/// Every diagnostic found while loading one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestError {
    diagnostics: Vec<Diagnostic>,
}

impl ManifestError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl From<Diagnostic> for ManifestError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ManifestError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diagnostics.as_slice() {
            [] => write!(f, "invalid manifest"),
            [single] => write!(f, "{single}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for ManifestError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_code() {
        let diag = Diagnostic::error("duplicate node `aad`").with_code(ErrorCode::E200);
        assert_eq!(diag.to_string(), "error[E200]: duplicate node `aad`");
    }

    #[test]
    fn test_labels_keep_order_and_primacy() {
        let diag = Diagnostic::error("duplicate")
            .with_label(10..13, "declared again here")
            .with_secondary_label(0..3, "first declared here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(!diag.labels()[1].is_primary());
        assert_eq!(diag.labels()[1].span(), 0..3);
    }

    #[test]
    fn test_manifest_error_display() {
        let single = ManifestError::from(Diagnostic::error("bad"));
        assert_eq!(single.to_string(), "error: bad");

        let many = ManifestError::from(vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
            Diagnostic::error("third"),
        ]);
        assert_eq!(many.to_string(), "error: first (and 2 more)");
        assert_eq!(many.diagnostics().len(), 3);
    }
}
