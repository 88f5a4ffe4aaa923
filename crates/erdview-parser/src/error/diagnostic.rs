//! Diagnostics reported while reading an `erDiagram` description.

use std::fmt;

use crate::{error::ErrorCode, span::Span};

/// Whether a diagnostic stops rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The description cannot be rendered.
    Error,
    /// Rendering proceeds; the diagnostic is only logged.
    Warning,
}

impl Severity {
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// How a [`Label`] is drawn relative to the rest of the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Points at the offending text.
    Primary,
    /// Points at related text, e.g. an earlier definition of the same entity.
    Secondary,
}

/// A message attached to a region of the description.
#[derive(Debug, Clone)]
pub struct Label {
    style: LabelStyle,
    span: Span,
    message: String,
}

impl Label {
    pub fn new(style: LabelStyle, span: Span, message: impl Into<String>) -> Self {
        Self {
            style,
            span,
            message: message.into(),
        }
    }

    pub fn style(&self) -> LabelStyle {
        self.style
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.style == LabelStyle::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.style == LabelStyle::Secondary
    }
}

/// A single problem found in a description, with its source locations.
///
/// ```text
/// error[E200]: entity `USERS` is defined multiple times
///   --> schema.mmd:9:5
///    |
///  9 |     USERS {
///    |     ^^^^^ duplicate definition
///    |
///   --> schema.mmd:2:5
///    |
///  2 |     USERS {
///    |     ----- first defined here
///    |
///    = help: merge the attribute blocks into one
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, message)
    }

    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(self, code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            ..self
        }
    }

    /// Marks the offending text.
    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labelled(Label::new(LabelStyle::Primary, span, message))
    }

    /// Points at related text elsewhere in the description.
    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labelled(Label::new(LabelStyle::Secondary, span, message))
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..self
        }
    }

    fn labelled(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
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

    /// Span of the first primary label.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary())
            .map(Label::span)
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{}[{code}]: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_error() {
        let diag = Diagnostic::error("unexpected `}`");

        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), None);
        assert!(diag.labels().is_empty());
        assert_eq!(diag.primary_span(), None);
    }

    #[test]
    fn test_duplicate_definition_labels() {
        let diag = Diagnostic::error("entity `USERS` is defined multiple times")
            .with_code(ErrorCode::E200)
            .with_secondary_label(Span::new(10..15), "first defined here")
            .with_label(Span::new(100..105), "duplicate definition")
            .with_help("merge the attribute blocks into one");

        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.labels()[0].style(), LabelStyle::Secondary);
        assert!(diag.labels()[1].is_primary());
        // The primary label wins even when it was attached second.
        assert_eq!(diag.primary_span(), Some(Span::new(100..105)));
        assert_eq!(diag.help(), Some("merge the attribute blocks into one"));
    }

    #[test]
    fn test_display() {
        let coded = Diagnostic::error("missing header").with_code(ErrorCode::E101);
        assert_eq!(coded.to_string(), "error[E101]: missing header");

        let warning = Diagnostic::warning("entity has no attributes");
        assert_eq!(warning.to_string(), "warning: entity has no attributes");
        assert!(!warning.severity().is_error());
    }
}
