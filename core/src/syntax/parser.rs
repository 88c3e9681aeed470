//! Recursive-descent parser for executable GraphQL documents.

use super::ast::{
    Argument, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationKind, Selection, VariableDefinition,
};
use super::cursor::Cursor;
use super::lexer::{lex, TokenKind};
use crate::{SyntaxError, MAX_DEPTH, MAX_SOURCE_LENGTH};

/// Parse an executable document (operations and fragments).
///
/// Parsing stops at the first error.
///
/// # Errors
///
/// Returns a positioned [`SyntaxError`] for lexical or syntactic problems,
/// duplicate operation/fragment names, selection sets nested deeper than
/// [`MAX_DEPTH`], and sources longer than [`MAX_SOURCE_LENGTH`].
pub fn parse_document(source: &str) -> Result<Document, SyntaxError> {
    if source.len() > MAX_SOURCE_LENGTH {
        return Err(SyntaxError::at(
            source,
            0,
            format!(
                "operation source is {} bytes, but maximum allowed is {MAX_SOURCE_LENGTH}",
                source.len()
            ),
        ));
    }

    let tokens = lex(source)?;
    let (operations, fragments) = {
        let mut parser = DocumentParser {
            cursor: Cursor::new(source, &tokens),
            depth: 0,
        };
        parser.document()?
    };

    Ok(Document {
        operations,
        fragments,
        tokens,
    })
}

struct DocumentParser<'s> {
    cursor: Cursor<'s>,
    depth: usize,
}

impl DocumentParser<'_> {
    fn document(
        &mut self,
    ) -> Result<(Vec<OperationDefinition>, Vec<FragmentDefinition>), SyntaxError> {
        let mut operations: Vec<OperationDefinition> = Vec::new();
        let mut fragments: Vec<FragmentDefinition> = Vec::new();

        if self.cursor.is_eof() {
            return Err(self.cursor.unexpected("definition"));
        }

        while let Some(token) = self.cursor.peek() {
            if token.kind == TokenKind::BraceOpen {
                operations.push(self.shorthand_query()?);
                continue;
            }
            let keyword = if token.kind == TokenKind::Name {
                token.text(self.cursor.source())
            } else {
                ""
            };
            if keyword == "fragment" {
                let fragment = self.fragment_definition()?;
                if fragments.iter().any(|f| f.name == fragment.name) {
                    return Err(SyntaxError::at(
                        self.cursor.source(),
                        token.start,
                        format!("duplicate fragment {:?}", fragment.name),
                    ));
                }
                fragments.push(fragment);
            } else if let Some(kind) = OperationKind::from_keyword(keyword) {
                let operation = self.operation_definition(kind)?;
                if operation.name.is_some()
                    && operations.iter().any(|o| o.name == operation.name)
                {
                    return Err(SyntaxError::at(
                        self.cursor.source(),
                        token.start,
                        format!(
                            "duplicate operation {:?}",
                            operation.name.unwrap_or_default()
                        ),
                    ));
                }
                operations.push(operation);
            } else {
                return Err(self.cursor.unexpected("definition"));
            }
        }

        Ok((operations, fragments))
    }

    fn shorthand_query(&mut self) -> Result<OperationDefinition, SyntaxError> {
        let start = self.cursor.position();
        let offset = self.cursor.offset();
        let selection_set = self.selection_set()?;
        let end = self.cursor.position();
        Ok(OperationDefinition {
            kind: OperationKind::Query,
            name: None,
            offset,
            variables: Vec::new(),
            selection_set,
            tokens: start..end,
            selection_tokens: start..end,
        })
    }

    fn operation_definition(
        &mut self,
        kind: OperationKind,
    ) -> Result<OperationDefinition, SyntaxError> {
        let start = self.cursor.position();
        let offset = self.cursor.offset();
        self.cursor.bump();

        let name = if self.cursor.at(TokenKind::Name) {
            let (name, _) = self.cursor.expect_name()?;
            Some(name.to_string())
        } else {
            None
        };

        let variables = if self.cursor.at(TokenKind::ParenOpen) {
            self.variable_definitions()?
        } else {
            Vec::new()
        };
        self.directives()?;

        let selection_start = self.cursor.position();
        let selection_set = self.selection_set()?;
        let end = self.cursor.position();

        Ok(OperationDefinition {
            kind,
            name,
            offset,
            variables,
            selection_set,
            tokens: start..end,
            selection_tokens: selection_start..end,
        })
    }

    fn fragment_definition(&mut self) -> Result<FragmentDefinition, SyntaxError> {
        self.cursor.bump();
        if self.cursor.at_keyword("on") {
            return Err(self.cursor.error_here("fragment name must not be \"on\""));
        }
        let (name, _) = self.cursor.expect_name()?;
        if !self.cursor.at_keyword("on") {
            return Err(self.cursor.unexpected("\"on\""));
        }
        self.cursor.bump();
        let (type_condition, _) = self.cursor.expect_name()?;
        self.directives()?;
        let selection_set = self.selection_set()?;

        Ok(FragmentDefinition {
            name: name.to_string(),
            type_condition: type_condition.to_string(),
            selection_set,
        })
    }

    fn variable_definitions(&mut self) -> Result<Vec<VariableDefinition>, SyntaxError> {
        self.cursor.expect(TokenKind::ParenOpen)?;
        let mut variables: Vec<VariableDefinition> = Vec::new();
        loop {
            let dollar = self.cursor.expect(TokenKind::Dollar)?;
            let (name, _) = self.cursor.expect_name()?;
            if variables.iter().any(|v| v.name == name) {
                return Err(SyntaxError::at(
                    self.cursor.source(),
                    dollar.start,
                    format!("duplicate variable ${name}"),
                ));
            }
            self.cursor.expect(TokenKind::Colon)?;
            let non_null = self.type_reference()?;
            let default = if self.cursor.eat(TokenKind::Equal).is_some() {
                Some(self.cursor.parse_value(false)?)
            } else {
                None
            };
            self.directives()?;
            variables.push(VariableDefinition {
                name: name.to_string(),
                non_null,
                default,
            });
            if self.cursor.eat(TokenKind::ParenClose).is_some() {
                return Ok(variables);
            }
        }
    }

    /// Parse a type reference, returning whether the outermost type is non-null.
    ///
    /// List wrappers may nest at most [`MAX_DEPTH`] levels.
    fn type_reference(&mut self) -> Result<bool, SyntaxError> {
        let mut lists = 0;
        while self.cursor.at(TokenKind::BracketOpen) {
            if lists == MAX_DEPTH {
                return Err(self.cursor.error_here(format!(
                    "list type nesting exceeds maximum depth of {MAX_DEPTH}"
                )));
            }
            self.cursor.bump();
            lists += 1;
        }

        self.cursor.expect_name()?;
        let mut non_null = self.cursor.eat(TokenKind::Bang).is_some();
        for _ in 0..lists {
            self.cursor.expect(TokenKind::BracketClose)?;
            non_null = self.cursor.eat(TokenKind::Bang).is_some();
        }
        Ok(non_null)
    }

    fn directives(&mut self) -> Result<(), SyntaxError> {
        while self.cursor.eat(TokenKind::At).is_some() {
            self.cursor.expect_name()?;
            if self.cursor.at(TokenKind::ParenOpen) {
                self.arguments()?;
            }
        }
        Ok(())
    }

    fn selection_set(&mut self) -> Result<Vec<Selection>, SyntaxError> {
        self.cursor.expect(TokenKind::BraceOpen)?;
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.cursor.error_here(format!(
                "selection set nesting exceeds maximum depth of {MAX_DEPTH}"
            )));
        }

        let mut selections = Vec::new();
        while self.cursor.eat(TokenKind::BraceClose).is_none() {
            selections.push(self.selection()?);
        }
        if selections.is_empty() {
            return Err(self.cursor.error_here("selection set must not be empty"));
        }

        self.depth -= 1;
        Ok(selections)
    }

    fn selection(&mut self) -> Result<Selection, SyntaxError> {
        let Some(spread) = self.cursor.eat(TokenKind::Spread) else {
            return self.field().map(Selection::Field);
        };

        if self.cursor.at_keyword("on") {
            self.cursor.bump();
            let (type_condition, _) = self.cursor.expect_name()?;
            self.directives()?;
            let selection_set = self.selection_set()?;
            return Ok(Selection::InlineFragment(InlineFragment {
                type_condition: Some(type_condition.to_string()),
                selection_set,
            }));
        }

        if self.cursor.at(TokenKind::Name) {
            let (name, _) = self.cursor.expect_name()?;
            self.directives()?;
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name: name.to_string(),
                offset: spread.start,
            }));
        }

        self.directives()?;
        let selection_set = self.selection_set()?;
        Ok(Selection::InlineFragment(InlineFragment {
            type_condition: None,
            selection_set,
        }))
    }

    fn field(&mut self) -> Result<Field, SyntaxError> {
        let (first, _) = self
            .cursor
            .expect_name()
            .map_err(|_| self.cursor.unexpected("selection"))?;
        let (alias, name) = if self.cursor.eat(TokenKind::Colon).is_some() {
            let (name, _) = self.cursor.expect_name()?;
            (Some(first.to_string()), name.to_string())
        } else {
            (None, first.to_string())
        };

        let arguments = if self.cursor.at(TokenKind::ParenOpen) {
            self.arguments()?
        } else {
            Vec::new()
        };
        self.directives()?;

        let selection_set = if self.cursor.at(TokenKind::BraceOpen) {
            self.selection_set()?
        } else {
            Vec::new()
        };

        Ok(Field {
            alias,
            name,
            arguments,
            selection_set,
        })
    }

    fn arguments(&mut self) -> Result<Vec<Argument>, SyntaxError> {
        self.cursor.expect(TokenKind::ParenOpen)?;
        let mut arguments: Vec<Argument> = Vec::new();
        loop {
            let (name, token) = self.cursor.expect_name()?;
            if arguments.iter().any(|a| a.name == name) {
                return Err(SyntaxError::at(
                    self.cursor.source(),
                    token.start,
                    format!("duplicate argument {name:?}"),
                ));
            }
            self.cursor.expect(TokenKind::Colon)?;
            let value = self.cursor.parse_value(true)?;
            arguments.push(Argument {
                name: name.to_string(),
                value,
            });
            if self.cursor.eat(TokenKind::ParenClose).is_some() {
                return Ok(arguments);
            }
        }
    }
}
