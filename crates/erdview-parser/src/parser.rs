//! winnow parser for `erDiagram` descriptions.
//!
//! The grammar is line oriented:
//!
//! ```text
//! erDiagram
//!     %% comment
//!     CUSTOMER ||--o{ ORDER : places
//!     CUSTOMER {
//!         string name PK "display name"
//!         string email UK
//!     }
//!     ORDER }|..|{ LINE-ITEM : "ordered in"
//!     AUDIT
//! ```
//!
//! Statements are parsed one at a time. A broken statement produces a
//! diagnostic and the parser resumes on the next line (or on the next
//! attribute line inside an entity block), so one pass reports every
//! problem in the description.

use std::{collections::HashMap, ops::Range};

use indexmap::IndexMap;
use log::{debug, warn};
use winnow::{
    Parser as _,
    ascii::{line_ending, space0, space1, till_line_ending},
    combinator::{alt, cut_err, eof, not, opt, peek, preceded, separated, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_till, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    model::{Attribute, Cardinality, EntityDecl, ErDiagram, KeyKind, Relationship},
    span::Span,
};

/// Rich diagnostic information for parser errors.
///
/// Attached to winnow errors via `.context()`; the innermost context wins.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParserDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<ParserDiagnostic>>;

const STATEMENT_HELP: &str =
    "statements are `NAME`, `NAME { ... }` or `LEFT ||--o{ RIGHT : label`";
const CARDINALITY_HELP: &str = "use `|o`, `||`, `}o` or `}|` before the line and `o|`, `||`, `o{` or `|{` after it, joined by `--` or `..`";
const ATTRIBUTE_HELP: &str = "attributes are written `type name [PK|FK|UK] [\"comment\"]`";

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Spaces and tabs on the current line.
fn inline_space<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    space0.parse_next(input)
}

/// Trailing spaces, an optional `%%` comment, then a newline or end of input.
fn line_end(input: &mut Input<'_>) -> IResult<()> {
    (
        space0,
        opt(("%%", till_line_ending)),
        alt((line_ending.void(), eof.void())),
    )
        .void()
        .parse_next(input)
}

fn entity_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (one_of(is_name_start), take_while(0.., is_name_char))
        .take()
        .parse_next(input)
}

/// A double-quoted string on a single line; returns the text between quotes.
fn quoted_string<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    let start = input.current_token_start();
    preceded(
        '"',
        cut_err(terminated(take_till(0.., ['"', '\n']), '"')).context(ParserDiagnostic {
            code: ErrorCode::E105,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        }),
    )
    .parse_next(input)
}

fn header(input: &mut Input<'_>) -> IResult<()> {
    (terminated("erDiagram", not(one_of(is_name_char))), line_end)
        .void()
        .parse_next(input)
}

fn left_cardinality(input: &mut Input<'_>) -> IResult<Cardinality> {
    alt((
        "|o".value(Cardinality::ZeroOrOne),
        "||".value(Cardinality::ExactlyOne),
        "}o".value(Cardinality::ZeroOrMore),
        "}|".value(Cardinality::OneOrMore),
    ))
    .parse_next(input)
}

fn right_cardinality(input: &mut Input<'_>) -> IResult<Cardinality> {
    alt((
        "o|".value(Cardinality::ZeroOrOne),
        "||".value(Cardinality::ExactlyOne),
        "o{".value(Cardinality::ZeroOrMore),
        "|{".value(Cardinality::OneOrMore),
    ))
    .parse_next(input)
}

/// `--` is identifying, `..` is not.
fn line_style(input: &mut Input<'_>) -> IResult<bool> {
    alt(("--".value(true), "..".value(false))).parse_next(input)
}

fn bare_label<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '%' && c != '"').parse_next(input)
}

struct RelationshipTail<'a> {
    left_cardinality: Cardinality,
    identifying: bool,
    right_cardinality: Cardinality,
    right: &'a str,
    right_range: Range<usize>,
    label: &'a str,
    end: usize,
}

/// Everything after the left entity name of a relationship line.
fn relationship_tail<'a>(input: &mut Input<'a>, start: usize) -> IResult<RelationshipTail<'a>> {
    let diag = |message: &'static str, help: Option<&'static str>| ParserDiagnostic {
        code: ErrorCode::E104,
        message,
        help,
        start,
    };
    (
        cut_err((left_cardinality, line_style, right_cardinality))
            .context(diag("invalid relationship cardinality", Some(CARDINALITY_HELP))),
        inline_space,
        cut_err(entity_name.with_span()).context(diag(
            "expected the related entity name",
            Some("name the entity on the right side of the relationship"),
        )),
        inline_space,
        cut_err(':').context(diag(
            "missing relationship label",
            Some("add `: label` after the related entity"),
        )),
        inline_space,
        cut_err(alt((quoted_string, bare_label)).with_span()).context(diag(
            "missing relationship label",
            Some("add `: label` after the related entity"),
        )),
        cut_err(line_end).context(diag(
            "unexpected input after relationship label",
            Some("quote labels that contain spaces"),
        )),
    )
        .map(
            |(
                (left_cardinality, identifying, right_cardinality),
                _,
                (right, right_range),
                _,
                _,
                _,
                (label, label_range),
                (),
            )| RelationshipTail {
                left_cardinality,
                identifying,
                right_cardinality,
                right,
                right_range,
                label,
                end: label_range.end,
            },
        )
        .parse_next(input)
}

/// A bare entity mention must end its line.
fn mention_tail(input: &mut Input<'_>, start: usize) -> IResult<()> {
    cut_err(line_end)
        .context(ParserDiagnostic {
            code: ErrorCode::E100,
            message: "unexpected input after entity name",
            help: Some(STATEMENT_HELP),
            start,
        })
        .parse_next(input)
}

fn statement_head<'a>(input: &mut Input<'a>) -> IResult<(&'a str, Range<usize>)> {
    let start = input.current_token_start();
    entity_name
        .with_span()
        .context(ParserDiagnostic {
            code: ErrorCode::E100,
            message: "unexpected input",
            help: Some(STATEMENT_HELP),
            start,
        })
        .parse_next(input)
}

fn attribute_type<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(is_name_start),
        take_while(0.., |c: char| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '(' | ')' | '[' | ']' | ',' | '.')
        }),
    )
        .take()
        .parse_next(input)
}

fn attribute_name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (
        one_of(|c: char| is_name_start(c) || c == '*'),
        take_while(0.., |c: char| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '(' | ')' | '[' | ']')
        }),
    )
        .take()
        .parse_next(input)
}

fn key(input: &mut Input<'_>) -> IResult<KeyKind> {
    terminated(
        alt((
            "PK".value(KeyKind::Primary),
            "FK".value(KeyKind::Foreign),
            "UK".value(KeyKind::Unique),
        )),
        not(one_of(is_name_char)),
    )
    .parse_next(input)
}

fn key_list(input: &mut Input<'_>) -> IResult<Vec<KeyKind>> {
    separated(1.., key, (space0, ',', space0)).parse_next(input)
}

/// End of an attribute: end of line, or a closing brace on the same line.
fn attribute_end(input: &mut Input<'_>) -> IResult<()> {
    alt((line_end, (space0, peek('}')).void())).parse_next(input)
}

struct RawAttribute<'a> {
    data_type: &'a str,
    name: &'a str,
    name_range: Range<usize>,
    keys: Vec<KeyKind>,
    comment: Option<&'a str>,
}

fn attribute<'a>(input: &mut Input<'a>) -> IResult<RawAttribute<'a>> {
    let start = input.current_token_start();
    (
        attribute_type,
        preceded(space1, attribute_name.with_span()),
        opt(preceded(space1, key_list)),
        opt(preceded(space1, quoted_string)),
        attribute_end,
    )
        .map(
            |(data_type, (name, name_range), keys, comment, ())| RawAttribute {
                data_type,
                name,
                name_range,
                keys: keys.unwrap_or_default(),
                comment,
            },
        )
        .context(ParserDiagnostic {
            code: ErrorCode::E103,
            message: "invalid attribute",
            help: Some(ATTRIBUTE_HELP),
            start,
        })
        .parse_next(input)
}

/// Skip whitespace (including newlines) and `%%` comment lines.
fn skip_trivia(input: &mut Input<'_>) {
    loop {
        let offset = input
            .offset_for(|c: char| !c.is_whitespace())
            .unwrap_or_else(|| input.eof_offset());
        input.next_slice(offset);
        if input.starts_with("%%") {
            skip_line(input);
        } else {
            break;
        }
    }
}

/// Skip the rest of the current line, including its newline.
fn skip_line(input: &mut Input<'_>) {
    let offset = input
        .offset_for(|c: char| c == '\n')
        .map_or_else(|| input.eof_offset(), |offset| offset + 1);
    input.next_slice(offset);
}

/// Statement-level driver that accumulates the diagram and diagnostics.
struct ErParser<'a> {
    source: &'a str,
    diagnostics: DiagnosticCollector,
    entities: IndexMap<String, EntityDecl>,
    blocks: HashMap<String, Span>,
    relationships: Vec<Relationship>,
}

impl<'a> ErParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            diagnostics: DiagnosticCollector::new(),
            entities: IndexMap::new(),
            blocks: HashMap::new(),
            relationships: Vec::new(),
        }
    }

    fn parse(&mut self, mut input: Input<'a>) {
        skip_trivia(&mut input);
        let start = input.current_token_start();
        if header(&mut input).is_err() {
            let span = Span::new(start..self.line_end_offset(start));
            self.diagnostics.emit(
                Diagnostic::error("missing `erDiagram` header")
                    .with_code(ErrorCode::E101)
                    .with_label(span, ErrorCode::E101.description())
                    .with_help("start the description with `erDiagram`"),
            );
            return;
        }

        loop {
            skip_trivia(&mut input);
            if input.is_empty() {
                break;
            }
            self.statement(&mut input);
        }
    }

    fn statement(&mut self, input: &mut Input<'a>) {
        let start = input.current_token_start();
        let (name, name_range) = match statement_head(input) {
            Ok(head) => head,
            Err(err) => {
                self.report(err, input.current_token_start());
                skip_line(input);
                return;
            }
        };
        let name_span = Span::new(name_range);

        let offset = input
            .offset_for(|c: char| c != ' ' && c != '\t')
            .unwrap_or_else(|| input.eof_offset());
        input.next_slice(offset);

        if input.starts_with('{') {
            input.next_token();
            let open = Span::new(start..input.current_token_start());
            self.entity_block(input, name, name_span, open);
        } else if input.starts_with('|') || input.starts_with('}') {
            match relationship_tail(input, start) {
                Ok(tail) => self.add_relationship(name, name_span, tail, start),
                Err(err) => {
                    self.report(err, input.current_token_start());
                    skip_line(input);
                }
            }
        } else {
            match mention_tail(input, start) {
                Ok(()) => {
                    self.ensure_entity(name, name_span);
                }
                Err(err) => {
                    self.report(err, input.current_token_start());
                    skip_line(input);
                }
            }
        }
    }

    fn entity_block(&mut self, input: &mut Input<'a>, name: &str, name_span: Span, open: Span) {
        let duplicate = match self.blocks.get(name) {
            Some(first) => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("entity `{name}` is defined multiple times"))
                        .with_code(ErrorCode::E200)
                        .with_label(name_span, "duplicate definition")
                        .with_secondary_label(*first, "first defined here")
                        .with_help("merge the attribute blocks into one"),
                );
                true
            }
            None => {
                self.blocks.insert(name.to_string(), name_span);
                false
            }
        };

        let mut attributes: Vec<Attribute> = Vec::new();
        let mut has_lines = false;
        loop {
            skip_trivia(input);
            if input.is_empty() {
                self.diagnostics.emit(
                    Diagnostic::error(format!("entity block `{name}` is never closed"))
                        .with_code(ErrorCode::E102)
                        .with_label(open, "block opened here")
                        .with_help("add a closing `}`"),
                );
                break;
            }

            if input.starts_with('}') {
                let close = input.current_token_start();
                input.next_token();
                if let Err(err) = mention_tail(input, close) {
                    self.report(err, input.current_token_start());
                    skip_line(input);
                }
                break;
            }

            has_lines = true;
            match attribute(input) {
                Ok(raw) => {
                    let span = Span::new(raw.name_range);
                    if let Some(first) = attributes.iter().find(|attr| attr.name() == raw.name) {
                        self.diagnostics.emit(
                            Diagnostic::error(format!(
                                "attribute `{}` is declared twice in entity `{name}`",
                                raw.name
                            ))
                            .with_code(ErrorCode::E201)
                            .with_label(span, "duplicate attribute")
                            .with_secondary_label(first.span(), "first declared here"),
                        );
                        continue;
                    }
                    attributes.push(Attribute::new(
                        raw.data_type,
                        raw.name,
                        raw.keys,
                        raw.comment.map(str::to_string),
                        span,
                    ));
                }
                Err(err) => {
                    self.report(err, input.current_token_start());
                    skip_line(input);
                }
            }
        }

        if !has_lines && !duplicate {
            self.diagnostics.emit(
                Diagnostic::warning(format!("entity `{name}` has an empty attribute block"))
                    .with_label(open, "no attributes")
                    .with_help("remove the braces or add attributes"),
            );
        }

        let entity = self.ensure_entity(name, name_span);
        if !duplicate {
            entity.set_attributes(attributes);
        }
    }

    fn add_relationship(
        &mut self,
        left: &str,
        left_span: Span,
        tail: RelationshipTail<'_>,
        start: usize,
    ) {
        self.ensure_entity(left, left_span);
        self.ensure_entity(tail.right, Span::new(tail.right_range));

        let relationship = Relationship::new(
            left,
            tail.left_cardinality,
            tail.right,
            tail.right_cardinality,
            tail.label,
            Span::new(start..tail.end),
        );
        self.relationships.push(if tail.identifying {
            relationship
        } else {
            relationship.non_identifying()
        });
    }

    fn ensure_entity(&mut self, name: &str, span: Span) -> &mut EntityDecl {
        self.entities
            .entry(name.to_string())
            .or_insert_with(|| EntityDecl::new(name, span))
    }

    /// Convert a winnow error into a diagnostic and emit it.
    ///
    /// Uses the innermost `ParserDiagnostic` context when present and falls
    /// back to E100 otherwise. Zero-width spans are widened to the rest of
    /// the line.
    fn report(&mut self, err: ErrMode<ContextError<ParserDiagnostic>>, error_pos: usize) {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        let diagnostic = if let Some(ParserDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(self.error_span(*start, error_pos), code.description());
            if let Some(help) = help {
                diag = diag.with_help(*help);
            }
            diag
        } else {
            Diagnostic::error("unexpected input")
                .with_code(ErrorCode::E100)
                .with_label(
                    self.error_span(error_pos, error_pos),
                    ErrorCode::E100.description(),
                )
        };
        self.diagnostics.emit(diagnostic);
    }

    fn error_span(&self, start: usize, error_pos: usize) -> Span {
        if error_pos > start {
            Span::new(start..error_pos)
        } else {
            Span::new(start..self.line_end_offset(start).max(start + 1))
        }
    }

    fn line_end_offset(&self, from: usize) -> usize {
        let rest = self.source.get(from..).unwrap_or_default();
        let line = rest.split('\n').next().unwrap_or_default();
        (from + line.trim_end().len()).min(self.source.len())
    }

    fn finish(self) -> Result<ErDiagram, ParseError> {
        let warnings = self.diagnostics.into_result()?;
        for warning in &warnings {
            warn!(diagnostic:% = warning; "Description parsed with warning");
        }
        debug!(
            entities = self.entities.len(),
            relationships = self.relationships.len();
            "Description parsed"
        );
        Ok(ErDiagram::new(self.entities, self.relationships))
    }
}

/// Parse an `erDiagram` description, collecting every diagnostic.
pub fn parse_diagram(source: &str) -> Result<ErDiagram, ParseError> {
    let mut parser = ErParser::new(source);
    parser.parse(LocatingSlice::new(source));
    parser.finish()
}
