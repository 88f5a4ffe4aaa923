//! Turns [`ErdViewError`] into miette reports for the terminal.
//!
//! A parse failure carries several diagnostics with source spans; each one
//! becomes its own [`Reportable`]. Every other error becomes a single report
//! without source code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use erdview::{ErdViewError, adapter::RenderError};
use erdview_parser::{
    Span,
    error::{Diagnostic, Severity},
};

/// One renderable report, flattened from a parser diagnostic or a library error.
#[derive(Debug)]
pub struct Reportable<'a> {
    message: String,
    code: String,
    severity: miette::Severity,
    help: Option<&'a str>,
    source_code: Option<&'a str>,
    labels: Vec<LabeledSpan>,
    cause: Option<&'a ErdViewError>,
}

impl<'a> Reportable<'a> {
    /// Report for a single parser diagnostic, pointing into `src`.
    pub fn from_diagnostic(diag: &'a Diagnostic, src: &'a str) -> Self {
        let labels = diag
            .labels()
            .iter()
            .map(|label| {
                let text = Some(label.message().to_string());
                let span = span_to_miette(label.span());
                if label.is_primary() {
                    LabeledSpan::new_primary_with_span(text, span)
                } else {
                    LabeledSpan::new_with_span(text, span)
                }
            })
            .collect();

        Self {
            message: diag.message().to_string(),
            code: diag.code().map(|c| c.to_string()).unwrap_or_default(),
            severity: match diag.severity() {
                Severity::Error => miette::Severity::Error,
                Severity::Warning => miette::Severity::Warning,
            },
            help: diag.help(),
            source_code: Some(src),
            labels,
            cause: None,
        }
    }

    /// Report for an error that has no source location.
    pub fn from_error(err: &'a ErdViewError) -> Self {
        let code = match err {
            ErdViewError::Io(_) => "erdview::io",
            ErdViewError::Render(_) => "erdview::render",
            ErdViewError::Export(_) => "erdview::export",
            ErdViewError::Config(_) => "erdview::config",
        };
        let help = match err {
            ErdViewError::Render(RenderError::EmptyDiagram) => {
                Some("declare at least one entity or relationship after `erDiagram`")
            }
            _ => None,
        };

        Self {
            message: err.to_string(),
            code: code.to_string(),
            severity: miette::Severity::Error,
            help,
            source_code: None,
            labels: Vec::new(),
            cause: Some(err),
        }
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.and_then(std::error::Error::source)
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        if self.code.is_empty() {
            None
        } else {
            Some(Box::new(&self.code))
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.help.map(|h| Box::new(h) as Box<dyn fmt::Display + 'b>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.source_code
            .as_ref()
            .map(|src| src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.iter().cloned()))
        }
    }
}

fn span_to_miette(span: Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Splits an error into the reports the CLI prints, one per parser diagnostic.
pub fn to_reportables(err: &ErdViewError) -> Vec<Reportable<'_>> {
    match err {
        ErdViewError::Render(RenderError::Parse { err: parse_err, src }) => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Reportable::from_diagnostic(diag, src))
            .collect(),
        _ => vec![Reportable::from_error(err)],
    }
}

#[cfg(test)]
mod tests {
    use erdview_parser::{ParseError, error::ErrorCode};

    use super::*;

    fn parse_failure(diagnostics: Vec<Diagnostic>, src: &str) -> ErdViewError {
        ErdViewError::Render(RenderError::new_parse_error(
            ParseError::new(diagnostics),
            src,
        ))
    }

    #[test]
    fn test_parse_diagnostic_keeps_code_and_help() {
        let err = parse_failure(
            vec![
                Diagnostic::error("missing relationship label")
                    .with_code(ErrorCode::E104)
                    .with_label(Span::new(0..5), "here")
                    .with_help("add `: label`"),
            ],
            "USERS ||--o{ ORDERS",
        );

        let reports = to_reportables(&err);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.to_string(), "missing relationship label");
        assert_eq!(report.code().unwrap().to_string(), "E104");
        assert_eq!(report.help().unwrap().to_string(), "add `: label`");
        assert!(report.source_code().is_some());
    }

    #[test]
    fn test_one_report_per_diagnostic() {
        let err = parse_failure(
            vec![
                Diagnostic::error("unterminated entity block"),
                Diagnostic::warning("entity has no attributes"),
            ],
            "erDiagram\nUSERS {\n",
        );

        let reports = to_reportables(&err);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "unterminated entity block");
        assert!(reports[0].code().is_none());
        assert_eq!(reports[1].severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn test_library_error_has_code_and_no_source() {
        let err = ErdViewError::Config("bad color".to_string());

        let reports = to_reportables(&err);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].to_string(), "Configuration error: bad color");
        assert_eq!(reports[0].code().unwrap().to_string(), "erdview::config");
        assert!(reports[0].source_code().is_none());
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_empty_diagram_has_help() {
        let err = ErdViewError::Render(RenderError::EmptyDiagram);
        assert!(to_reportables(&err)[0].help().is_some());
    }

    #[test]
    fn test_secondary_labels_stay_secondary() {
        let diag = Diagnostic::error("entity `USERS` is defined multiple times")
            .with_label(Span::new(20..25), "duplicate definition")
            .with_secondary_label(Span::new(10..15), "first defined here");

        let report = Reportable::from_diagnostic(&diag, "erDiagram\nUSERS {}\nUSERS {}\n");
        let labels: Vec<_> = report.labels().unwrap().collect();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("duplicate definition"));
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
        assert_eq!(labels[1].offset(), 10);
    }
}
