//! `TemplateParser` — template text → [`CompiledTemplate`].
//!
//! Parsing is two-layered. Syntax errors stop the parse at the first problem.
//! Schema problems (unknown fields, undeclared arguments, leaf/composite
//! mismatches) are recorded and parsing continues, so one template reports
//! every schema mistake it contains.

use apollo_compiler::Schema;

use super::{
    Comparison, CompiledTemplate, Constraint, TemplateArgument, TemplateField, TemplateFragment,
    TemplateSelection,
};
use crate::schema::{FieldInfo, SchemaIndex};
use crate::syntax::cursor::Cursor;
use crate::syntax::{lex, OperationKind, TokenKind};
use crate::{ErrorReport, SyntaxError, MAX_DEPTH, MAX_SOURCE_LENGTH};

/// Field every composite type answers without declaring it.
const TYPENAME: &str = "__typename";

/// Parses templates, checking them against a schema when one is given.
#[derive(Debug, Clone, Default)]
pub struct TemplateParser {
    index: Option<SchemaIndex>,
}

impl TemplateParser {
    /// Create a parser bound to `schema`, or a syntax-only parser for `None`.
    ///
    /// # Errors
    ///
    /// Returns an `INIT_GQT_PARSER` report when the schema defines no query
    /// root type.
    pub fn new(schema: Option<&Schema>) -> Result<Self, ErrorReport> {
        let Some(schema) = schema else {
            return Ok(Self::schemaless());
        };
        let index = SchemaIndex::from_schema(schema);
        if index.root(OperationKind::Query).is_none() {
            return Err(ErrorReport::init_parser("schema defines no query root type"));
        }
        Ok(Self { index: Some(index) })
    }

    /// A parser that checks syntax only.
    #[must_use]
    pub fn schemaless() -> Self {
        Self { index: None }
    }

    #[must_use]
    pub fn is_schemaless(&self) -> bool {
        self.index.is_none()
    }

    /// Parse one template.
    ///
    /// # Errors
    ///
    /// Returns every diagnostic found, ordered by position. A syntax error is
    /// always the last entry, since it ends the parse.
    pub fn parse(&self, source: &str) -> Result<CompiledTemplate, Vec<SyntaxError>> {
        if source.len() > MAX_SOURCE_LENGTH {
            return Err(vec![SyntaxError::at(
                source,
                0,
                format!(
                    "template source is {} bytes, but maximum allowed is {MAX_SOURCE_LENGTH}",
                    source.len()
                ),
            )]);
        }

        let tokens = lex(source).map_err(|e| vec![e])?;
        let mut reader = TemplateReader {
            cursor: Cursor::new(source, &tokens),
            index: self.index.as_ref(),
            errors: Vec::new(),
            depth: 0,
        };

        match reader.template() {
            Ok(template) if reader.errors.is_empty() => Ok(template),
            Ok(_) => Err(reader.errors),
            Err(fatal) => {
                reader.errors.push(fatal);
                Err(reader.errors)
            }
        }
    }
}

struct TemplateReader<'s, 'i> {
    cursor: Cursor<'s>,
    index: Option<&'i SchemaIndex>,
    errors: Vec<SyntaxError>,
    depth: usize,
}

impl<'i> TemplateReader<'_, 'i> {
    fn report(&mut self, offset: usize, message: String) {
        self.errors
            .push(SyntaxError::at(self.cursor.source(), offset, message));
    }

    fn template(&mut self) -> Result<CompiledTemplate, SyntaxError> {
        let expected = "operation type (query, mutation or subscription)";
        let Some(token) = self.cursor.peek() else {
            return Err(self.cursor.unexpected(expected));
        };
        let kind = (token.kind == TokenKind::Name)
            .then(|| OperationKind::from_keyword(token.text(self.cursor.source())))
            .flatten()
            .ok_or_else(|| self.cursor.unexpected(expected))?;
        self.cursor.bump();

        let root = match self.index {
            Some(index) => {
                let root = index.root(kind);
                if root.is_none() {
                    self.report(token.start, format!("schema defines no {} type", kind.keyword()));
                }
                root
            }
            None => None,
        };

        let selection_set = self.selection_set(root)?;
        if !self.cursor.is_eof() {
            return Err(self.cursor.unexpected("end of template"));
        }

        Ok(CompiledTemplate {
            kind,
            selection_set,
        })
    }

    /// Parse `{ ... }`. `parent` is the enclosing type when it is known.
    fn selection_set(&mut self, parent: Option<&'i str>) -> Result<Vec<TemplateSelection>, SyntaxError> {
        self.cursor.expect(TokenKind::BraceOpen)?;
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.cursor.error_here(format!(
                "selection set nesting exceeds maximum depth of {MAX_DEPTH}"
            )));
        }

        let mut selections: Vec<TemplateSelection> = Vec::new();
        while self.cursor.eat(TokenKind::BraceClose).is_none() {
            let offset = self.cursor.offset();
            let selection = self.selection(parent)?;
            let duplicate = match &selection {
                TemplateSelection::Field(field) => selections
                    .iter()
                    .any(|s| s.is_field(&field.name))
                    .then(|| format!("duplicate field {:?}", field.name)),
                TemplateSelection::InlineFragment(fragment) => selections
                    .iter()
                    .any(|s| s.is_fragment_on(&fragment.type_condition))
                    .then(|| format!("duplicate fragment on {:?}", fragment.type_condition)),
            };
            if let Some(message) = duplicate {
                return Err(SyntaxError::at(self.cursor.source(), offset, message));
            }
            selections.push(selection);
        }
        if selections.is_empty() {
            return Err(self.cursor.error_here("selection set must not be empty"));
        }

        self.depth -= 1;
        Ok(selections)
    }

    fn selection(&mut self, parent: Option<&'i str>) -> Result<TemplateSelection, SyntaxError> {
        if self.cursor.eat(TokenKind::Spread).is_some() {
            return self.inline_fragment().map(TemplateSelection::InlineFragment);
        }
        self.field(parent).map(TemplateSelection::Field)
    }

    fn inline_fragment(&mut self) -> Result<TemplateFragment, SyntaxError> {
        if !self.cursor.at_keyword("on") {
            return Err(self.cursor.unexpected("\"on\""));
        }
        self.cursor.bump();
        let (type_condition, token) = self.cursor.expect_name()?;

        let parent = match self.index {
            Some(index) => match index.type_info(type_condition) {
                Some(info) if info.composite => index.type_name(type_condition),
                Some(_) => {
                    self.report(
                        token.start,
                        format!("type condition {type_condition:?} is not a composite type"),
                    );
                    None
                }
                None => {
                    self.report(token.start, format!("unknown type {type_condition:?}"));
                    None
                }
            },
            None => None,
        };

        let selection_set = self.selection_set(parent)?;
        Ok(TemplateFragment {
            type_condition: type_condition.to_string(),
            selection_set,
        })
    }

    fn field(&mut self, parent: Option<&'i str>) -> Result<TemplateField, SyntaxError> {
        let (name, token) = self
            .cursor
            .expect_name()
            .map_err(|_| self.cursor.unexpected("field or inline fragment"))?;

        let info: Option<&'i FieldInfo> = match (self.index, parent) {
            (Some(index), Some(parent)) if name != TYPENAME => {
                let info = index.field(parent, name);
                if info.is_none() {
                    self.report(
                        token.start,
                        format!("field {name:?} is not defined on type {parent:?}"),
                    );
                }
                info
            }
            _ => None,
        };

        let arguments = if self.cursor.at(TokenKind::ParenOpen) {
            self.arguments(name, info)?
        } else {
            Vec::new()
        };

        let composite = match (self.index, info) {
            (Some(index), Some(info)) => Some(index.is_composite(&info.type_name)),
            _ => None,
        };

        let selection_set = if self.cursor.at(TokenKind::BraceOpen) {
            let brace = self.cursor.offset();
            let mut child = None;
            if name == TYPENAME {
                self.report(brace, format!("field {TYPENAME:?} must not have a selection set"));
            } else if let (Some(false), Some(info)) = (composite, info) {
                self.report(
                    brace,
                    format!(
                        "field {name:?} of type {:?} must not have a selection set",
                        info.type_name
                    ),
                );
            } else {
                child = info.map(|i| i.type_name.as_str());
            }
            self.selection_set(child)?
        } else {
            if let (Some(true), Some(info)) = (composite, info) {
                self.report(
                    token.start,
                    format!(
                        "field {name:?} of type {:?} must have a selection of subfields",
                        info.type_name
                    ),
                );
            }
            Vec::new()
        };

        Ok(TemplateField {
            name: name.to_string(),
            arguments,
            selection_set,
        })
    }

    fn arguments(
        &mut self,
        field: &str,
        info: Option<&'i FieldInfo>,
    ) -> Result<Vec<TemplateArgument>, SyntaxError> {
        self.cursor.expect(TokenKind::ParenOpen)?;
        let mut arguments: Vec<TemplateArgument> = Vec::new();
        loop {
            let (name, token) = self.cursor.expect_name()?;
            if arguments.iter().any(|a| a.name == name) {
                return Err(SyntaxError::at(
                    self.cursor.source(),
                    token.start,
                    format!("duplicate argument {name:?}"),
                ));
            }
            if let Some(info) = info {
                if !info.arguments.iter().any(|a| a == name) {
                    self.report(
                        token.start,
                        format!("argument {name:?} is not defined on field {field:?}"),
                    );
                }
            }
            self.cursor.expect(TokenKind::Colon)?;
            let constraint = self.constraint()?;
            arguments.push(TemplateArgument {
                name: name.to_string(),
                constraint,
            });
            if self.cursor.eat(TokenKind::ParenClose).is_some() {
                return Ok(arguments);
            }
        }
    }

    fn constraint(&mut self) -> Result<Constraint, SyntaxError> {
        let mut alternatives = vec![self.conjunction()?];
        while self.cursor.eat(TokenKind::OrOr).is_some() {
            alternatives.push(self.conjunction()?);
        }
        Ok(if alternatives.len() == 1 {
            alternatives.swap_remove(0)
        } else {
            Constraint::Either(alternatives)
        })
    }

    fn conjunction(&mut self) -> Result<Constraint, SyntaxError> {
        let mut terms = vec![self.comparison()?];
        while self.cursor.eat(TokenKind::AndAnd).is_some() {
            terms.push(self.comparison()?);
        }
        Ok(if terms.len() == 1 {
            terms.swap_remove(0)
        } else {
            Constraint::All(terms)
        })
    }

    fn comparison(&mut self) -> Result<Constraint, SyntaxError> {
        if self.cursor.eat(TokenKind::Star).is_some() {
            return Ok(Constraint::Any);
        }

        let op = match self.cursor.peek_kind() {
            Some(TokenKind::Equal) => Some(Comparison::Equal),
            Some(TokenKind::NotEqual) => Some(Comparison::NotEqual),
            Some(TokenKind::Less) => Some(Comparison::Less),
            Some(TokenKind::LessEqual) => Some(Comparison::LessEqual),
            Some(TokenKind::Greater) => Some(Comparison::Greater),
            Some(TokenKind::GreaterEqual) => Some(Comparison::GreaterEqual),
            _ => None,
        };
        if op.is_some() {
            self.cursor.bump();
        }
        let op = op.unwrap_or(Comparison::Equal);

        let offset = self.cursor.offset();
        let value = self.cursor.parse_value(false)?;
        if op.is_ordering() && !value.is_number() {
            self.report(offset, format!("operator {op} requires a number, found {value}"));
        }
        Ok(Constraint::Compare(op, value))
    }
}
