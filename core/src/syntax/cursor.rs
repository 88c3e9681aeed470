//! Token cursor shared by the operation and template parsers.

use super::lexer::{Token, TokenKind};
use super::value::{block_string_value, unescape_string, Value};
use crate::{SyntaxError, MAX_DEPTH};

/// A position in a token stream over `source`.
pub(crate) struct Cursor<'s> {
    source: &'s str,
    tokens: &'s [Token],
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub(crate) fn new(source: &'s str, tokens: &'s [Token]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    pub(crate) fn source(&self) -> &'s str {
        self.source
    }

    /// Index of the next token.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Whether the next token is the name `keyword`.
    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Name && t.text(self.source) == keyword)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the next token, or the end of the source.
    pub(crate) fn offset(&self) -> usize {
        self.peek().map_or(self.source.len(), |t| t.start)
    }

    pub(crate) fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the next token if it has `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            self.bump()
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        self.eat(kind)
            .ok_or_else(|| self.unexpected(kind.describe()))
    }

    /// Consume a name token and return its text.
    pub(crate) fn expect_name(&mut self) -> Result<(&'s str, Token), SyntaxError> {
        let token = self.expect(TokenKind::Name)?;
        Ok((token.text(self.source), token))
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.source, self.offset(), message)
    }

    /// Error describing the next token (or end of input) as unexpected.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(token) => self.error_here(format!(
                "unexpected {} {:?}, expected {expected}",
                token.kind.describe(),
                token.text(self.source)
            )),
            None => self.error_here(format!("unexpected end of input, expected {expected}")),
        }
    }

    /// Parse a value. Variables are accepted only when `allow_variables` is set.
    ///
    /// Lists and objects may nest at most [`MAX_DEPTH`] levels.
    pub(crate) fn parse_value(&mut self, allow_variables: bool) -> Result<Value, SyntaxError> {
        self.value_at(allow_variables, 0)
    }

    fn value_at(&mut self, allow_variables: bool, depth: usize) -> Result<Value, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("value"));
        };
        let text = token.text(self.source);
        match token.kind {
            TokenKind::Dollar if allow_variables => {
                self.bump();
                let (name, _) = self.expect_name()?;
                Ok(Value::Variable(name.to_string()))
            }
            TokenKind::Int => {
                let value = text
                    .parse::<i64>()
                    .map_err(|_| self.error_here(format!("integer {text} is out of range")))?;
                self.bump();
                Ok(Value::Int(value))
            }
            TokenKind::Float => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| self.error_here(format!("invalid float {text}")))?;
                self.bump();
                Ok(Value::Float(value))
            }
            TokenKind::String => {
                let body = &text[1..text.len() - 1];
                let value = unescape_string(body).map_err(|seq| {
                    self.error_here(format!("invalid escape sequence {seq} in string"))
                })?;
                self.bump();
                Ok(Value::String(value))
            }
            TokenKind::BlockString => {
                self.bump();
                Ok(Value::String(block_string_value(&text[3..text.len() - 3])))
            }
            TokenKind::Name => {
                self.bump();
                Ok(match text {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "null" => Value::Null,
                    other => Value::Enum(other.to_string()),
                })
            }
            TokenKind::BracketOpen | TokenKind::BraceOpen if depth >= MAX_DEPTH => Err(self
                .error_here(format!("value nesting exceeds maximum depth of {MAX_DEPTH}"))),
            TokenKind::BracketOpen => {
                self.bump();
                let mut items = Vec::new();
                while self.eat(TokenKind::BracketClose).is_none() {
                    if self.is_eof() {
                        return Err(self.unexpected("']'"));
                    }
                    items.push(self.value_at(allow_variables, depth + 1)?);
                }
                Ok(Value::List(items))
            }
            TokenKind::BraceOpen => {
                self.bump();
                let mut fields: Vec<(String, Value)> = Vec::new();
                while self.eat(TokenKind::BraceClose).is_none() {
                    let (name, _) = self.expect_name()?;
                    if fields.iter().any(|(k, _)| k == name) {
                        return Err(self.error_here(format!("duplicate object field {name:?}")));
                    }
                    self.expect(TokenKind::Colon)?;
                    let value = self.value_at(allow_variables, depth + 1)?;
                    fields.push((name.to_string(), value));
                }
                Ok(Value::Object(fields))
            }
            _ => Err(self.unexpected("value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::lex;

    fn value(source: &str, allow_variables: bool) -> Result<Value, SyntaxError> {
        let tokens = lex(source).unwrap();
        Cursor::new(source, &tokens).parse_value(allow_variables)
    }

    #[test]
    fn scalars() {
        assert_eq!(value("42", false).unwrap(), Value::Int(42));
        assert_eq!(value("-1.5", false).unwrap(), Value::Float(-1.5));
        assert_eq!(value(r#""hi\n""#, false).unwrap(), Value::String("hi\n".into()));
        assert_eq!(value("true", false).unwrap(), Value::Bool(true));
        assert_eq!(value("null", false).unwrap(), Value::Null);
        assert_eq!(value("RED", false).unwrap(), Value::Enum("RED".into()));
    }

    #[test]
    fn compound_values() {
        assert_eq!(
            value("{a: [1 2], b: {c: null}}", false).unwrap(),
            Value::Object(vec![
                ("a".into(), Value::List(vec![Value::Int(1), Value::Int(2)])),
                ("b".into(), Value::Object(vec![("c".into(), Value::Null)])),
            ])
        );
    }

    #[test]
    fn variables_only_where_allowed() {
        assert_eq!(value("$id", true).unwrap(), Value::Variable("id".into()));
        let err = value("$id", false).unwrap_err();
        assert_eq!(err.message, "unexpected '$' \"$\", expected value");
    }

    #[test]
    fn integer_overflow_is_reported() {
        let err = value("99999999999999999999", false).unwrap_err();
        assert_eq!(err.message, "integer 99999999999999999999 is out of range");
    }

    #[test]
    fn unclosed_list_reports_end_of_input() {
        let err = value("[1, 2", false).unwrap_err();
        assert_eq!(err.message, "unexpected end of input, expected ']'");
        assert_eq!(err.column, 6);
    }

    #[test]
    fn duplicate_object_field() {
        let err = value("{a: 1, a: 2}", false).unwrap_err();
        assert_eq!(err.message, "duplicate object field \"a\"");
    }

    #[test]
    fn nesting_is_bounded() {
        let at_limit = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(value(&at_limit, false).is_ok());

        let lists = format!("{}{}", "[".repeat(200_000), "]".repeat(200_000));
        let err = value(&lists, false).unwrap_err();
        assert_eq!(
            err.message,
            format!("value nesting exceeds maximum depth of {MAX_DEPTH}")
        );
        assert_eq!(err.column, MAX_DEPTH + 1);

        let objects = format!("{}1{}", "{a: ".repeat(100), "}".repeat(100));
        assert!(value(&objects, true).is_err());
    }
}
