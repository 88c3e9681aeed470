//! Lexer for GraphQL operations and templates.
//!
//! Produces span-based tokens; text is sliced from the source only when needed.
//! Whitespace, commas and `#` comments are insignificant and never emitted.
//! The template operators (`= != < <= > >= * || &&`) share the token set so a
//! single lexer serves both grammars; the operation parser rejects them.

use logos::Logos;
use std::ops::Range;

use crate::SyntaxError;

/// Token kinds.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"([ \t\r\n\f,]|#[^\r\n]*)+")]
pub enum TokenKind {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(":")]
    Colon,
    #[token("!")]
    Bang,
    #[token("$")]
    Dollar,
    #[token("@")]
    At,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("...")]
    Spread,
    #[token("=")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("*")]
    Star,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[regex("[_A-Za-z][_0-9A-Za-z]*")]
    Name,
    #[regex(r"-?(0|[1-9][0-9]*)")]
    Int,
    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+([eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)")]
    Float,
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    String,
    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#)]
    BlockString,
}

impl TokenKind {
    /// Human-readable description used in error messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::BraceOpen => "'{'",
            Self::BraceClose => "'}'",
            Self::ParenOpen => "'('",
            Self::ParenClose => "')'",
            Self::BracketOpen => "'['",
            Self::BracketClose => "']'",
            Self::Colon => "':'",
            Self::Bang => "'!'",
            Self::Dollar => "'$'",
            Self::At => "'@'",
            Self::Amp => "'&'",
            Self::Pipe => "'|'",
            Self::Spread => "'...'",
            Self::Equal => "'='",
            Self::NotEqual => "'!='",
            Self::Less => "'<'",
            Self::LessEqual => "'<='",
            Self::Greater => "'>'",
            Self::GreaterEqual => "'>='",
            Self::Star => "'*'",
            Self::AndAnd => "'&&'",
            Self::OrOr => "'||'",
            Self::Name => "name",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String | Self::BlockString => "string",
        }
    }
}

/// Zero-copy token: kind + byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[inline]
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The token's text within `source`.
    #[inline]
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span()]
    }
}

/// Tokenizes `source`, failing on the first character that starts no token.
///
/// # Errors
///
/// Returns a positioned [`SyntaxError`] for unrecognized input such as an
/// unterminated string.
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                start: span.start,
                end: span.end,
            }),
            Err(()) => {
                let message = if source[span.start..].starts_with('"') {
                    "unterminated string".to_string()
                } else {
                    let ch = source[span.start..].chars().next().unwrap_or('\u{FFFD}');
                    format!("unexpected character {ch:?}")
                };
                return Err(SyntaxError::at(source, span.start, message));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn punctuators_and_names() {
        assert_eq!(
            kinds("query Q($id: ID!) { user(id: $id) { ...F } }"),
            vec![
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::ParenOpen,
                TokenKind::Dollar,
                TokenKind::Name,
                TokenKind::Colon,
                TokenKind::Name,
                TokenKind::Bang,
                TokenKind::ParenClose,
                TokenKind::BraceOpen,
                TokenKind::Name,
                TokenKind::ParenOpen,
                TokenKind::Name,
                TokenKind::Colon,
                TokenKind::Dollar,
                TokenKind::Name,
                TokenKind::ParenClose,
                TokenKind::BraceOpen,
                TokenKind::Spread,
                TokenKind::Name,
                TokenKind::BraceClose,
                TokenKind::BraceClose,
            ]
        );
    }

    #[test]
    fn commas_and_comments_are_skipped() {
        assert_eq!(
            kinds("a, b # trailing comment\n c"),
            vec![TokenKind::Name, TokenKind::Name, TokenKind::Name]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("0 -12 3.5 1e10 -2.5E-3"),
            vec![
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
            ]
        );
    }

    #[test]
    fn template_operators() {
        assert_eq!(
            kinds("= != < <= > >= * && ||"),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Star,
                TokenKind::AndAnd,
                TokenKind::OrOr,
            ]
        );
    }

    #[test]
    fn strings() {
        let source = r#""a\"b" """block "quoted" text""""#;
        let tokens = lex(source).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text(source), r#""a\"b""#);
        assert_eq!(tokens[1].kind, TokenKind::BlockString);
    }

    #[test]
    fn spans_point_into_source() {
        let source = "  query   Q";
        let tokens = lex(source).unwrap();
        assert_eq!(tokens[0].span(), 2..7);
        assert_eq!(tokens[1].text(source), "Q");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = lex("query { a(x: \"open) }").unwrap_err();
        assert_eq!(err.message, "unterminated string");
        assert_eq!((err.line, err.column), (1, 14));
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = lex("query { a % }").unwrap_err();
        assert_eq!(err.message, "unexpected character '%'");
        assert_eq!(err.offset, 10);
    }
}
