//! `MatchService` — the immutable product of a successful init.
//!
//! A service owns the validated schema (if any) and the compiled templates.
//! It is never mutated after construction; re-initialization builds a new one
//! and swaps it in whole.

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::{MatchRequest, Matches};
use crate::schema::SharedSchema;
use crate::syntax::OperationKind;
use crate::template::{CompiledBatch, CompiledTemplate};

/// One compiled template with its host-facing identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    id: String,
    source: String,
    compiled: CompiledTemplate,
    enabled: bool,
}

impl Template {
    pub(crate) fn new(id: &str, source: &str, compiled: CompiledTemplate) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            compiled,
            enabled: true,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn compiled(&self) -> &CompiledTemplate {
        &self.compiled
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.compiled.kind
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// The active matching service.
pub struct MatchService {
    id: String,
    schema: Option<SharedSchema>,
    templates: HashMap<String, Arc<Template>>,
    enabled: Vec<Arc<Template>>,
}

impl MatchService {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The validated schema, or `None` in schema-less mode.
    #[must_use]
    pub fn schema(&self) -> Option<&Valid<Schema>> {
        self.schema.as_deref()
    }

    #[must_use]
    pub fn is_schemaless(&self) -> bool {
        self.schema.is_none()
    }

    /// Look up a template by id.
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.get(id).map(Arc::as_ref)
    }

    /// Enabled templates in evaluation order.
    pub fn templates(&self) -> impl ExactSizeIterator<Item = &Template> + '_ {
        self.enabled.iter().map(Arc::as_ref)
    }

    pub(crate) fn template_at(&self, index: usize) -> Option<&Template> {
        self.enabled.get(index).map(Arc::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Start matching `request` against this service's templates.
    #[must_use]
    pub fn matches<'s, 'r>(&'s self, request: MatchRequest<'r>) -> Matches<'s, 'r> {
        Matches::new(self, request)
    }
}

impl fmt::Debug for MatchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchService")
            .field("id", &self.id)
            .field("schemaless", &self.schema.is_none())
            .field("templates", &self.enabled.len())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`MatchService`] from a compiled batch.
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    id: String,
    schema: Option<SharedSchema>,
}

impl ServiceBuilder {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            schema: None,
        }
    }

    #[must_use]
    pub fn schema(mut self, schema: Option<SharedSchema>) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn build(self, batch: CompiledBatch) -> MatchService {
        MatchService {
            id: self.id,
            schema: self.schema,
            templates: batch.definitions,
            enabled: batch
                .enabled
                .into_iter()
                .filter(|t| t.is_enabled())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateCompiler, TemplateParser, TemplateSource};
    use crate::SERVICE_ID;

    #[test]
    fn builds_from_batch() {
        let parser = TemplateParser::schemaless();
        let batch = TemplateCompiler::new(&parser)
            .compile(&[
                TemplateSource::new("q", "query { a }"),
                TemplateSource::new("m", "mutation { b }"),
            ])
            .unwrap();
        let service = ServiceBuilder::new(SERVICE_ID).build(batch);

        assert_eq!(service.id(), "playground");
        assert!(service.is_schemaless());
        assert_eq!(service.len(), 2);
        assert_eq!(service.template("m").unwrap().kind(), OperationKind::Mutation);
        assert!(service.template("x").is_none());
        assert_eq!(
            format!("{service:?}"),
            "MatchService { id: \"playground\", schemaless: true, templates: 2, .. }"
        );
    }
}
