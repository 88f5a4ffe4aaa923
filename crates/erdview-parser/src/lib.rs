//! # erdview Parser
//!
//! Parser for the `erDiagram` description language rendered by erdview.
//!
//! ## Usage
//!
//! ```
//! # use erdview_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//! erDiagram
//!     CUSTOMER ||--o{ ORDER : places
//!     CUSTOMER {
//!         string name PK
//!     }
//! "#;
//!
//!     let diagram = parse(source)?;
//!     assert_eq!(diagram.entity_count(), 2);
//!     Ok(())
//! }
//! ```
//!
//! Errors carry every [`Diagnostic`](error::Diagnostic) found in the
//! description, each with an [`ErrorCode`](error::ErrorCode) and labelled
//! source [`Span`]s.

pub mod error;
pub mod model;
mod parser;
mod span;

pub use error::ParseError;
pub use model::{Attribute, Cardinality, EntityDecl, ErDiagram, KeyKind, Relationship};
pub use span::Span;

/// Parse source text into an [`ErDiagram`].
///
/// Parsing recovers after each broken statement, so a failing description
/// reports all of its problems at once.
pub fn parse(source: &str) -> Result<ErDiagram, ParseError> {
    parser::parse_diagram(source)
}
