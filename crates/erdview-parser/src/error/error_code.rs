//! Error codes for the erdview diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Syntax errors
//! - `E2xx` - Validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Unexpected input.
    ///
    /// A line could not be read as an entity block, relationship or entity name.
    E100,

    /// Missing diagram header.
    ///
    /// The description does not start with the `erDiagram` keyword.
    E101,

    /// Unterminated entity block.
    ///
    /// An entity block was opened with `{` but never closed with `}`.
    E102,

    /// Invalid attribute.
    ///
    /// An attribute line inside an entity block is not `type name [keys] ["comment"]`.
    E103,

    /// Invalid relationship.
    ///
    /// A relationship is missing its cardinality, target entity or label.
    E104,

    /// Unterminated string literal.
    ///
    /// A quoted label or comment was opened but never closed on the same line.
    E105,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Duplicate entity definition.
    ///
    /// Two attribute blocks were given for the same entity.
    E200,

    /// Duplicate attribute.
    ///
    /// The same attribute name appears twice in one entity block.
    E201,
}

impl ErrorCode {
    /// Short description of the error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::E100 => "unexpected input",
            Self::E101 => "missing diagram header",
            Self::E102 => "unterminated entity block",
            Self::E103 => "invalid attribute",
            Self::E104 => "invalid relationship",
            Self::E105 => "unterminated string literal",
            Self::E200 => "duplicate entity definition",
            Self::E201 => "duplicate attribute",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::E100 => "E100",
            Self::E101 => "E101",
            Self::E102 => "E102",
            Self::E103 => "E103",
            Self::E104 => "E104",
            Self::E105 => "E105",
            Self::E200 => "E200",
            Self::E201 => "E201",
        };
        f.write_str(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E201.to_string(), "E201");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E102.description(), "unterminated entity block");
    }
}
