//! Parsed form of an `erDiagram` description.
//!
//! The model keeps names as written in the source. Entity order is the
//! order in which names first appear, which is also the order the layout
//! places them in.

use std::fmt;

use indexmap::IndexMap;

use crate::span::Span;

/// Cardinality on one end of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `|o` / `o|`
    ZeroOrOne,
    /// `||`
    ExactlyOne,
    /// `}o` / `o{`
    ZeroOrMore,
    /// `}|` / `|{`
    OneOrMore,
}

impl Cardinality {
    /// Returns true if this end admits more than one row.
    pub fn is_many(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    /// Returns true if this end admits zero rows.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::ZeroOrOne | Self::ZeroOrMore)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ZeroOrOne => "0..1",
            Self::ExactlyOne => "1",
            Self::ZeroOrMore => "0..*",
            Self::OneOrMore => "1..*",
        };
        f.write_str(text)
    }
}

/// Key marker on an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Primary,
    Foreign,
    Unique,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Primary => "PK",
            Self::Foreign => "FK",
            Self::Unique => "UK",
        };
        f.write_str(text)
    }
}

/// A column inside an entity block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    data_type: String,
    name: String,
    keys: Vec<KeyKind>,
    comment: Option<String>,
    span: Span,
}

impl Attribute {
    pub fn new(
        data_type: impl Into<String>,
        name: impl Into<String>,
        keys: Vec<KeyKind>,
        comment: Option<String>,
        span: Span,
    ) -> Self {
        Self {
            data_type: data_type.into(),
            name: name.into(),
            keys,
            comment,
            span,
        }
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[KeyKind] {
        &self.keys
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Span of the attribute name.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// An entity, either declared with a block or implied by a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDecl {
    name: String,
    span: Span,
    attributes: Vec<Attribute>,
}

impl EntityDecl {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span of the first occurrence of the name.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub(crate) fn set_attributes(&mut self, attributes: Vec<Attribute>) {
        self.attributes = attributes;
    }
}

/// A relationship line between two entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    left: String,
    right: String,
    left_cardinality: Cardinality,
    right_cardinality: Cardinality,
    identifying: bool,
    label: String,
    span: Span,
}

impl Relationship {
    pub fn new(
        left: impl Into<String>,
        left_cardinality: Cardinality,
        right: impl Into<String>,
        right_cardinality: Cardinality,
        label: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            left_cardinality,
            right_cardinality,
            identifying: true,
            label: label.into(),
            span,
        }
    }

    /// Marks the relationship as non-identifying (`..` line).
    pub fn non_identifying(mut self) -> Self {
        self.identifying = false;
        self
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn left_cardinality(&self) -> Cardinality {
        self.left_cardinality
    }

    pub fn right_cardinality(&self) -> Cardinality {
        self.right_cardinality
    }

    /// `--` lines are identifying, `..` lines are not.
    pub fn is_identifying(&self) -> bool {
        self.identifying
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// A parsed `erDiagram` description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErDiagram {
    entities: IndexMap<String, EntityDecl>,
    relationships: Vec<Relationship>,
}

impl ErDiagram {
    pub(crate) fn new(
        entities: IndexMap<String, EntityDecl>,
        relationships: Vec<Relationship>,
    ) -> Self {
        Self {
            entities,
            relationships,
        }
    }

    /// Entities in order of first appearance.
    pub fn entities(&self) -> impl Iterator<Item = &EntityDecl> {
        self.entities.values()
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDecl> {
        self.entities.get(name)
    }

    /// Position of an entity in appearance order.
    pub fn entity_index(&self, name: &str) -> Option<usize> {
        self.entities.get_index_of(name)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
