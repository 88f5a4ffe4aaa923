//! Accumulating diagnostics into a [`ParseError`].

use std::fmt;

use crate::error::Diagnostic;

/// Every diagnostic produced by a failed parse, in source order.
#[derive(Debug, Clone)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity().is_error())
            .count()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.diagnostics.first() else {
            return f.write_str("description could not be parsed");
        };
        first.fmt(f)?;
        match self.diagnostics.len() {
            1 => Ok(()),
            n => write!(f, " (+{} more)", n - 1),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

/// Diagnostics gathered while the parser recovers line by line.
#[derive(Debug, Default)]
pub(crate) struct DiagnosticCollector(Vec<Diagnostic>);

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Fails when any error was emitted; otherwise yields the warnings.
    pub fn into_result(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.0.iter().any(|d| d.severity().is_error()) {
            Err(ParseError::new(self.0))
        } else {
            Ok(self.0)
        }
    }
}
