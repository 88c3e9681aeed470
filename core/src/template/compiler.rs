//! `TemplateCompiler` — a batch of template sources → [`CompiledBatch`].
//!
//! Compilation is all-or-nothing: every template is parsed, every failure is
//! collected under its id, and only a fully clean batch is returned.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::TemplateParser;
use crate::{ErrorReport, Template, TemplateErrors};

/// A template as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    /// Key used in error reports and match results.
    pub id: String,
    /// Template text.
    pub source: String,
}

impl TemplateSource {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

/// A successfully compiled batch, ready to build a service from.
#[derive(Debug, Clone, Default)]
pub struct CompiledBatch {
    pub(crate) definitions: HashMap<String, Arc<Template>>,
    pub(crate) enabled: Vec<Arc<Template>>,
}

impl CompiledBatch {
    /// Number of enabled templates, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Templates in input order.
    #[must_use]
    pub fn templates(&self) -> &[Arc<Template>] {
        &self.enabled
    }
}

/// Compiles template batches with a shared parser.
#[derive(Debug, Clone, Copy)]
pub struct TemplateCompiler<'p> {
    parser: &'p TemplateParser,
}

impl<'p> TemplateCompiler<'p> {
    #[must_use]
    pub fn new(parser: &'p TemplateParser) -> Self {
        Self { parser }
    }

    /// Compile every source in `sources`.
    ///
    /// When two sources share an id, the later one owns the id in the lookup
    /// map; both stay enabled at their input positions.
    ///
    /// # Errors
    ///
    /// Returns a `TEMPLATE_ERR` report listing the diagnostics of every
    /// template that failed. No partial batch is produced.
    pub fn compile(&self, sources: &[TemplateSource]) -> Result<CompiledBatch, ErrorReport> {
        let mut definitions = HashMap::with_capacity(sources.len());
        let mut enabled = Vec::with_capacity(sources.len());
        let mut errors = TemplateErrors::new();

        for source in sources {
            match self.parser.parse(&source.source) {
                Ok(compiled) => {
                    let template = Arc::new(Template::new(&source.id, &source.source, compiled));
                    if definitions
                        .insert(source.id.clone(), Arc::clone(&template))
                        .is_some()
                    {
                        tracing::warn!(id = %source.id, "duplicate template id, later definition wins");
                    }
                    enabled.push(template);
                }
                Err(diagnostics) => {
                    tracing::debug!(id = %source.id, errors = diagnostics.len(), "template rejected");
                    errors.entry(source.id.clone()).or_default().extend(diagnostics);
                }
            }
        }

        if !errors.is_empty() {
            tracing::warn!(
                failed = errors.len(),
                total = sources.len(),
                "template batch rejected"
            );
            return Err(ErrorReport::templates(errors));
        }

        tracing::debug!(templates = enabled.len(), "template batch compiled");
        Ok(CompiledBatch {
            definitions,
            enabled,
        })
    }
}
