//! Matching engine: one operation against every enabled template.
//!
//! [`Matches`] is a lazy iterator. Preparation (parsing the operation,
//! selecting it, decoding variables) happens on the first `next()`, then:
//!
//! ```text
//! next() ─► Tokens(stream) ─► Matched(t1) ─► Matched(t4) ─► ... ─► None
//!              │
//!              └─ any failure ─► Err(e) ─► None   (fused)
//! ```
//!
//! Dropping the iterator early stops evaluation; nothing runs ahead of the
//! consumer.

mod evaluate;
mod state;

pub use state::{compile_service, EngineState};

use std::collections::HashMap;
use std::iter::FusedIterator;

use self::evaluate::Evaluator;
use crate::syntax::{parse_document, Document, Selection, Token};
use crate::{MatchService, SyntaxError, Template, MAX_DEPTH, MAX_EXPANDED_SELECTIONS};

/// One match request. Absent name or variables are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchRequest<'a> {
    pub operation: &'a str,
    pub operation_name: Option<&'a str>,
    pub variables_json: Option<&'a str>,
}

impl<'a> MatchRequest<'a> {
    #[must_use]
    pub fn new(operation: &'a str) -> Self {
        Self {
            operation,
            operation_name: None,
            variables_json: None,
        }
    }

    /// Build a request from host strings, where empty means absent.
    #[must_use]
    pub fn from_host(operation: &'a str, operation_name: &'a str, variables_json: &'a str) -> Self {
        Self {
            operation,
            operation_name: (!operation_name.is_empty()).then_some(operation_name),
            variables_json: (!variables_json.is_empty()).then_some(variables_json),
        }
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: &'a str) -> Self {
        self.operation_name = Some(name);
        self
    }

    #[must_use]
    pub fn with_variables(mut self, json: &'a str) -> Self {
        self.variables_json = Some(json);
        self
    }
}

/// Tokens of the selected operation, reported before any match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    /// Every token of the selected operation definition.
    pub operation: Vec<Token>,
    /// Tokens of its top-level selection set, braces included.
    pub selection_set: Vec<Token>,
}

impl TokenStream {
    #[must_use]
    pub fn len(&self) -> usize {
        self.operation.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operation.is_empty()
    }
}

/// An event produced while matching.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent<'s> {
    Tokens(TokenStream),
    Matched(&'s Template),
}

/// Why a match run stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("parsing operation: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("document contains no operation")]
    NoOperation,

    #[error("operation name is required when the document contains multiple operations")]
    AmbiguousOperation,

    #[error("operation {0:?} not found")]
    OperationNotFound(String),

    #[error("fragment {0:?} is not defined")]
    UnknownFragment(String),

    #[error("fragment {0:?} spreads itself")]
    FragmentCycle(String),

    #[error("operation nests deeper than {MAX_DEPTH} levels once fragments are expanded")]
    NestingTooDeep,

    #[error("operation expands to more than {MAX_EXPANDED_SELECTIONS} selections")]
    TooManySelections,

    #[error("invalid variables: {0}")]
    InvalidVariables(String),

    #[error("variable ${0} is not defined by the operation")]
    UndefinedVariable(String),

    #[error("missing value for non-null variable ${0}")]
    MissingVariable(String),
}

struct Prepared {
    document: Document,
    operation: usize,
    variables: serde_json::Map<String, serde_json::Value>,
}

enum Stage {
    Prepare,
    Evaluate(usize),
    Done,
}

/// Lazy stream of [`MatchEvent`]s for one request.
pub struct Matches<'s, 'r> {
    service: &'s MatchService,
    request: MatchRequest<'r>,
    prepared: Option<Prepared>,
    stage: Stage,
}

impl<'s, 'r> Matches<'s, 'r> {
    pub(crate) fn new(service: &'s MatchService, request: MatchRequest<'r>) -> Self {
        Self {
            service,
            request,
            prepared: None,
            stage: Stage::Prepare,
        }
    }

    fn prepare(&self) -> Result<Prepared, MatchError> {
        let document = parse_document(self.request.operation)?;
        let operation = select_operation(&document, self.request.operation_name)?;
        check_spreads(&document, &document.operations[operation].selection_set)?;
        let variables = decode_variables(self.request.variables_json)?;
        Ok(Prepared {
            document,
            operation,
            variables,
        })
    }

    fn fail(&mut self, error: MatchError) -> Option<Result<MatchEvent<'s>, MatchError>> {
        tracing::debug!(%error, "match run failed");
        self.stage = Stage::Done;
        self.prepared = None;
        Some(Err(error))
    }
}

impl<'s> Iterator for Matches<'s, '_> {
    type Item = Result<MatchEvent<'s>, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stage {
                Stage::Done => return None,
                Stage::Prepare => {
                    let prepared = match self.prepare() {
                        Ok(prepared) => prepared,
                        Err(error) => return self.fail(error),
                    };
                    let operation = &prepared.document.operations[prepared.operation];
                    let tokens = TokenStream {
                        operation: prepared.document.tokens[operation.tokens.clone()].to_vec(),
                        selection_set: prepared.document.tokens[operation.selection_tokens.clone()]
                            .to_vec(),
                    };
                    self.prepared = Some(prepared);
                    self.stage = Stage::Evaluate(0);
                    return Some(Ok(MatchEvent::Tokens(tokens)));
                }
                Stage::Evaluate(index) => {
                    let service = self.service;
                    let Some(template) = service.template_at(index) else {
                        self.stage = Stage::Done;
                        self.prepared = None;
                        return None;
                    };
                    self.stage = Stage::Evaluate(index + 1);

                    let Some(prepared) = &self.prepared else {
                        self.stage = Stage::Done;
                        return None;
                    };
                    let evaluator = Evaluator::new(
                        &prepared.document,
                        &prepared.document.operations[prepared.operation],
                        &prepared.variables,
                    );
                    match evaluator.matches(template.compiled()) {
                        Ok(true) => return Some(Ok(MatchEvent::Matched(template))),
                        Ok(false) => {}
                        Err(error) => return self.fail(error),
                    }
                }
            }
        }
    }
}

impl FusedIterator for Matches<'_, '_> {}

fn select_operation(document: &Document, name: Option<&str>) -> Result<usize, MatchError> {
    match name {
        Some(name) => document
            .operations
            .iter()
            .position(|o| o.name.as_deref() == Some(name))
            .ok_or_else(|| MatchError::OperationNotFound(name.to_string())),
        None => match document.operations.len() {
            0 => Err(MatchError::NoOperation),
            1 => Ok(0),
            _ => Err(MatchError::AmbiguousOperation),
        },
    }
}

/// Verify every fragment spread reachable from `selections` resolves and that
/// no fragment reaches itself. With every spread expanded in place, the
/// selections must nest at most [`MAX_DEPTH`] levels and hold at most
/// [`MAX_EXPANDED_SELECTIONS`] selections.
fn check_spreads(document: &Document, selections: &[Selection]) -> Result<(), MatchError> {
    let mut checker = SpreadChecker {
        document,
        extents: HashMap::new(),
        path: Vec::new(),
    };
    checker.extent(selections)?;
    Ok(())
}

/// Size of a selection set once its spreads are expanded.
#[derive(Clone, Copy, Default)]
struct Extent {
    depth: usize,
    selections: usize,
}

struct SpreadChecker<'d> {
    document: &'d Document,
    /// Fragments already checked.
    extents: HashMap<&'d str, Extent>,
    path: Vec<&'d str>,
}

impl<'d> SpreadChecker<'d> {
    fn extent(&mut self, selections: &'d [Selection]) -> Result<Extent, MatchError> {
        let mut extent = Extent::default();
        for selection in selections {
            let inner = match selection {
                Selection::Field(field) => self.extent(&field.selection_set)?,
                Selection::InlineFragment(fragment) => self.extent(&fragment.selection_set)?,
                Selection::FragmentSpread(spread) => self.fragment(&spread.name)?,
            };
            extent.depth = extent.depth.max(inner.depth + 1);
            extent.selections = extent
                .selections
                .saturating_add(inner.selections)
                .saturating_add(1);
        }

        if extent.depth > MAX_DEPTH {
            return Err(MatchError::NestingTooDeep);
        }
        if extent.selections > MAX_EXPANDED_SELECTIONS {
            return Err(MatchError::TooManySelections);
        }
        Ok(extent)
    }

    fn fragment(&mut self, name: &'d str) -> Result<Extent, MatchError> {
        if let Some(&extent) = self.extents.get(name) {
            return Ok(extent);
        }
        if self.path.contains(&name) {
            return Err(MatchError::FragmentCycle(name.to_string()));
        }
        if self.path.len() >= MAX_DEPTH {
            return Err(MatchError::NestingTooDeep);
        }
        let fragment = self
            .document
            .fragment(name)
            .ok_or_else(|| MatchError::UnknownFragment(name.to_string()))?;

        self.path.push(name);
        let extent = self.extent(&fragment.selection_set)?;
        self.path.pop();

        self.extents.insert(name, extent);
        Ok(extent)
    }
}

fn decode_variables(
    json: Option<&str>,
) -> Result<serde_json::Map<String, serde_json::Value>, MatchError> {
    let Some(json) = json.filter(|j| !j.trim().is_empty()) else {
        return Ok(serde_json::Map::new());
    };
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(serde_json::Value::Null) => Ok(serde_json::Map::new()),
        Ok(_) => Err(MatchError::InvalidVariables(
            "expected a JSON object".to_string(),
        )),
        Err(e) => Err(MatchError::InvalidVariables(e.to_string())),
    }
}
