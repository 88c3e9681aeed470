//! GraphQL templates: the selection patterns operations are matched against.
//!
//! A template is written in the same lexical syntax as a GraphQL operation,
//! with argument values replaced by constraints:
//!
//! ```text
//! query {
//!     user(id: *) {
//!         name
//!         posts(first: > 0 && <= 100) { title }
//!         ... on Admin { permissions }
//!     }
//! }
//! ```
//!
//! | Constraint        | Accepts                                      |
//! |-------------------|----------------------------------------------|
//! | `*`               | any value, including an absent argument      |
//! | `v` or `= v`      | values loosely equal to `v`                  |
//! | `!= v`            | values not equal to `v`                      |
//! | `< <= > >= n`     | numbers ordered against `n`                  |
//! | `a && b`          | values accepted by both                      |
//! | `a \|\| b`        | values accepted by either (`&&` binds tighter) |
//!
//! [`TemplateParser`] parses and schema-checks one template;
//! [`TemplateCompiler`] compiles a whole batch, all or nothing.

mod compiler;
mod constraint;
mod parser;

pub use compiler::{CompiledBatch, TemplateCompiler, TemplateSource};
pub use constraint::{Comparison, Constraint};
pub use parser::TemplateParser;

use crate::syntax::OperationKind;

/// A parsed, schema-checked template.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    pub kind: OperationKind,
    pub selection_set: Vec<TemplateSelection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSelection {
    Field(TemplateField),
    InlineFragment(TemplateFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateField {
    pub name: String,
    pub arguments: Vec<TemplateArgument>,
    pub selection_set: Vec<TemplateSelection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateArgument {
    pub name: String,
    pub constraint: Constraint,
}

/// `... on Type { ... }` inside a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFragment {
    pub type_condition: String,
    pub selection_set: Vec<TemplateSelection>,
}

impl TemplateSelection {
    /// Whether this is the field `name`.
    #[must_use]
    pub fn is_field(&self, name: &str) -> bool {
        matches!(self, Self::Field(field) if field.name == name)
    }

    /// Whether this is an inline fragment on `type_condition`.
    #[must_use]
    pub fn is_fragment_on(&self, type_condition: &str) -> bool {
        matches!(self, Self::InlineFragment(fragment) if fragment.type_condition == type_condition)
    }
}
