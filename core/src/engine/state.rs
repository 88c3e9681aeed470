//! `EngineState` — the one slot holding the active service.
//!
//! ```text
//! init(schema, templates)
//!   ├─ SchemaCompiler::compile   ── SCHEMA_ERR ──────────┐
//!   ├─ TemplateParser::new       ── INIT_GQT_PARSER ─────┤ state untouched
//!   ├─ TemplateCompiler::compile ── TEMPLATE_ERR ────────┘
//!   └─ ServiceBuilder::build ──► swap into the slot
//! ```

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use std::sync::Arc;

use crate::schema::SchemaCompiler;
use crate::template::{TemplateCompiler, TemplateParser, TemplateSource};
use crate::{ErrorReport, MatchService, ServiceBuilder, SERVICE_ID};

/// Build a service from raw inputs without touching any state.
///
/// # Errors
///
/// Returns the first failing stage's report: `SCHEMA_ERR`,
/// `INIT_GQT_PARSER`, or `TEMPLATE_ERR` (aggregated over all templates).
pub fn compile_service(
    schema_source: &str,
    templates: &[TemplateSource],
) -> Result<MatchService, ErrorReport> {
    let schema = SchemaCompiler::compile(schema_source)?;
    let parser = TemplateParser::new(schema.as_deref().map(|valid| &**valid))?;
    let batch = TemplateCompiler::new(&parser).compile(templates)?;
    Ok(ServiceBuilder::new(SERVICE_ID).schema(schema).build(batch))
}

/// Caller-owned holder of the active [`MatchService`].
///
/// Clones share the active service.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    active: Option<Arc<MatchService>>,
}

impl EngineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a new service and make it active.
    ///
    /// On failure the previously active service (schema included) stays in
    /// place.
    ///
    /// # Errors
    ///
    /// See [`compile_service`].
    pub fn init(
        &mut self,
        schema_source: &str,
        templates: &[TemplateSource],
    ) -> Result<(), ErrorReport> {
        match compile_service(schema_source, templates) {
            Ok(service) => {
                tracing::info!(
                    templates = service.len(),
                    schemaless = service.is_schemaless(),
                    "service activated"
                );
                self.active = Some(Arc::new(service));
                Ok(())
            }
            Err(report) => {
                tracing::warn!(
                    code = report.kind().code(),
                    retained = self.active.is_some(),
                    "init failed"
                );
                Err(report)
            }
        }
    }

    /// The active service, if any init has succeeded.
    #[must_use]
    pub fn service(&self) -> Option<&MatchService> {
        self.active.as_deref()
    }

    /// A shared handle to the active service.
    #[must_use]
    pub fn shared_service(&self) -> Option<Arc<MatchService>> {
        self.active.clone()
    }

    /// The active service's schema.
    #[must_use]
    pub fn schema(&self) -> Option<&Valid<Schema>> {
        self.service()?.schema()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Drop the active service.
    pub fn clear(&mut self) {
        self.active = None;
    }
}
