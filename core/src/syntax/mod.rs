//! GraphQL source handling: lexer, values, and the executable-document parser.
//!
//! The template grammar in [`crate::template`] reuses the same lexer and
//! value syntax through the shared cursor.

pub mod ast;
pub(crate) mod cursor;
pub mod lexer;
mod parser;
mod value;

pub use ast::{
    Argument, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationKind, Selection, VariableDefinition,
};
pub use lexer::{lex, Token, TokenKind};
pub use parser::parse_document;
pub use value::Value;
