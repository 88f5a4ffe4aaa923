//! Error and diagnostic system for the erDiagram parser.
//!
//! Each problem becomes a [`Diagnostic`] carrying an [`ErrorCode`] and
//! labelled spans. The parser keeps going after a broken line, so a
//! [`ParseError`] may hold several of them.
//!
//! # Example
//!
//! ```
//! # use erdview_parser::error::{Diagnostic, ErrorCode};
//! # use erdview_parser::Span;
//!
//! let diag = Diagnostic::error("entity `USERS` is defined multiple times")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(100..105), "duplicate definition")
//!     .with_secondary_label(Span::new(10..15), "first defined here")
//!     .with_help("merge the attribute blocks into one");
//! ```

mod diagnostic;
mod error_code;
mod parse_error;

pub(crate) use parse_error::DiagnosticCollector;

pub use diagnostic::{Diagnostic, Label, LabelStyle, Severity};
pub use error_code::ErrorCode;
pub use parse_error::ParseError;
