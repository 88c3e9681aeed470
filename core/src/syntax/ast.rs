//! Operation document AST.
//!
//! Only what matching and inspection need is kept: directives are parsed and
//! dropped, variable types are reduced to their non-null flag.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

use super::lexer::Token;
use super::value::Value;

/// Kind of an operation definition (or of a template).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Parse the keyword that introduces a definition.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "query" => Some(Self::Query),
            "mutation" => Some(Self::Mutation),
            "subscription" => Some(Self::Subscription),
            _ => None,
        }
    }

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "Query",
            Self::Mutation => "Mutation",
            Self::Subscription => "Subscription",
        })
    }
}

/// A parsed executable document.
#[derive(Debug, Clone)]
pub struct Document {
    pub operations: Vec<OperationDefinition>,
    pub fragments: Vec<FragmentDefinition>,
    pub tokens: Vec<Token>,
}

impl Document {
    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    pub name: Option<String>,
    /// Byte offset of the introducing keyword (or `{` for shorthand queries).
    pub offset: usize,
    pub variables: Vec<VariableDefinition>,
    pub selection_set: Vec<Selection>,
    /// Token index range of the whole definition.
    pub tokens: Range<usize>,
    /// Token index range of the top-level selection set, braces included.
    pub selection_tokens: Range<usize>,
}

impl OperationDefinition {
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct VariableDefinition {
    pub name: String,
    pub non_null: bool,
    pub default: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub enum Selection {
    Field(Field),
    InlineFragment(InlineFragment),
    FragmentSpread(FragmentSpread),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<Argument>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub struct FragmentSpread {
    pub name: String,
    pub offset: usize,
}
