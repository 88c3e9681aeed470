//! Structural comparison of one operation against one template.
//!
//! An operation matches a template when:
//!
//! - both have the same kind;
//! - every selected field has a template counterpart whose argument
//!   constraints accept the supplied values and whose sub-selection matches;
//! - every template selection is covered by the operation.
//!
//! Fragment spreads and inline fragments are flattened into their parent,
//! except an inline fragment (or a spread of a fragment) whose type condition
//! the template also spells out as `... on Type`; those are compared
//! fragment-to-fragment.

use std::cell::Cell;

use crate::syntax::{Argument, Document, Field, OperationDefinition, Selection, Value};
use crate::template::{CompiledTemplate, TemplateArgument, TemplateSelection};
use crate::MAX_EXPANDED_SELECTIONS;

use super::MatchError;

type Variables = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy)]
enum Item<'d> {
    Field(&'d Field),
    Fragment(&'d str, &'d [Selection]),
}

pub(crate) struct Evaluator<'d> {
    document: &'d Document,
    operation: &'d OperationDefinition,
    variables: &'d Variables,
    /// Selections flattened so far, across the whole evaluation.
    expanded: Cell<usize>,
}

impl<'d> Evaluator<'d> {
    pub(crate) fn new(
        document: &'d Document,
        operation: &'d OperationDefinition,
        variables: &'d Variables,
    ) -> Self {
        Self {
            document,
            operation,
            variables,
            expanded: Cell::new(0),
        }
    }

    pub(crate) fn matches(&self, template: &CompiledTemplate) -> Result<bool, MatchError> {
        if template.kind != self.operation.kind {
            return Ok(false);
        }
        self.selection_set(&template.selection_set, &self.operation.selection_set)
    }

    fn selection_set(
        &self,
        template: &[TemplateSelection],
        selections: &'d [Selection],
    ) -> Result<bool, MatchError> {
        let mut items = Vec::new();
        self.flatten(template, selections, &mut items)?;

        let mut covered = vec![false; template.len()];
        for item in items {
            let counterpart = match item {
                Item::Field(field) => template.iter().position(|t| t.is_field(&field.name)),
                Item::Fragment(condition, _) => {
                    template.iter().position(|t| t.is_fragment_on(condition))
                }
            };
            let Some(index) = counterpart else {
                return Ok(false);
            };

            let matched = match (&template[index], item) {
                (TemplateSelection::Field(expected), Item::Field(field)) => {
                    self.arguments(&expected.arguments, &field.arguments)?
                        && self.selection_set(&expected.selection_set, &field.selection_set)?
                }
                (TemplateSelection::InlineFragment(expected), Item::Fragment(_, selections)) => {
                    self.selection_set(&expected.selection_set, selections)?
                }
                _ => false,
            };
            if !matched {
                return Ok(false);
            }
            covered[index] = true;
        }

        Ok(covered.into_iter().all(|c| c))
    }

    fn flatten(
        &self,
        template: &[TemplateSelection],
        selections: &'d [Selection],
        out: &mut Vec<Item<'d>>,
    ) -> Result<(), MatchError> {
        for selection in selections {
            let expanded = self.expanded.get() + 1;
            if expanded > MAX_EXPANDED_SELECTIONS {
                return Err(MatchError::TooManySelections);
            }
            self.expanded.set(expanded);

            match selection {
                Selection::Field(field) => out.push(Item::Field(field)),
                Selection::InlineFragment(fragment) => self.fragment(
                    template,
                    fragment.type_condition.as_deref(),
                    &fragment.selection_set,
                    out,
                )?,
                Selection::FragmentSpread(spread) => {
                    let fragment = self
                        .document
                        .fragment(&spread.name)
                        .ok_or_else(|| MatchError::UnknownFragment(spread.name.clone()))?;
                    self.fragment(
                        template,
                        Some(&fragment.type_condition),
                        &fragment.selection_set,
                        out,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn fragment(
        &self,
        template: &[TemplateSelection],
        condition: Option<&'d str>,
        selections: &'d [Selection],
        out: &mut Vec<Item<'d>>,
    ) -> Result<(), MatchError> {
        match condition {
            Some(condition) if template.iter().any(|t| t.is_fragment_on(condition)) => {
                out.push(Item::Fragment(condition, selections));
                Ok(())
            }
            _ => self.flatten(template, selections, out),
        }
    }

    fn arguments(
        &self,
        template: &[TemplateArgument],
        arguments: &'d [Argument],
    ) -> Result<bool, MatchError> {
        for argument in arguments {
            let Some(expected) = template.iter().find(|t| t.name == argument.name) else {
                return Ok(false);
            };
            let value = self.resolve(&argument.value)?;
            if !expected.constraint.accepts(Some(&value)) {
                return Ok(false);
            }
        }

        Ok(template.iter().all(|expected| {
            arguments.iter().any(|a| a.name == expected.name) || expected.constraint.accepts(None)
        }))
    }

    /// Replace variables in `value` with their runtime values.
    ///
    /// Resolution order: supplied variables, then the declared default, then
    /// `null` for nullable variables.
    fn resolve(&self, value: &Value) -> Result<Value, MatchError> {
        match value {
            Value::Variable(name) => {
                let definition = self
                    .operation
                    .variable(name)
                    .ok_or_else(|| MatchError::UndefinedVariable(name.clone()))?;
                if let Some(supplied) = self.variables.get(name) {
                    return Ok(Value::from_json(supplied));
                }
                if let Some(default) = &definition.default {
                    return Ok(default.clone());
                }
                if definition.non_null {
                    return Err(MatchError::MissingVariable(name.clone()));
                }
                Ok(Value::Null)
            }
            Value::List(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Value::Object(fields) => fields
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.resolve(item)?)))
                .collect::<Result<_, MatchError>>()
                .map(Value::Object),
            constant => Ok(constant.clone()),
        }
    }
}
