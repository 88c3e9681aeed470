//! gqtmatch - GraphQL template matching with a fault-isolated host bridge
//!
//! Templates describe which GraphQL operations are acceptable. Each one is a
//! selection set whose argument values are replaced by constraints. Operations
//! are matched structurally against every active template.
//!
//! # Architecture
//!
//! ```text
//! init(schema, templates)
//!   SchemaCompiler ─► TemplateParser ─► TemplateCompiler ─► ServiceBuilder
//!                                                                │
//!                                         EngineState ◄──────────┘ (atomic swap)
//!
//! match_all(operation, name, variables)
//!   MatchInvoker ─► MatchService::matches ─► Matches (lazy events) ─► MatchOutcome
//!
//! parse_operation(source)
//!   OperationInspector ─► [OperationInfo] | PARSE_OPR
//! ```
//!
//! - [`SchemaCompiler`] — schema text → validated schema (via `apollo-compiler`)
//! - [`TemplateParser`] — template text → [`CompiledTemplate`], schema-checked
//! - [`TemplateCompiler`] — a batch of templates, all or nothing
//! - [`EngineState`] — caller-owned slot for the active [`MatchService`]
//! - [`Matches`] — lazy iterator of [`MatchEvent`]s for one operation
//! - [`MatchInvoker`] — feeds those events to a [`MatchObserver`]
//! - [`OperationInspector`] — lists the named operations in a document
//! - [`FaultBoundary`] — turns panics into out-of-band [`Fault`]s
//! - [`Bridge`] — the host entry points, each run inside the boundary
//!
//! # Key Design Insights
//!
//! 1. **Init is atomic**: every template is compiled and every failure is
//!    reported, but the service only changes when the whole batch compiles.
//!    A failed init leaves the previous service active.
//!
//! 2. **Matching is pull-based**: [`Matches`] does no work ahead of its
//!    consumer, so an observer that stops early stops evaluation too.
//!
//! 3. **Errors are values, panics are faults**: compile and match errors come
//!    back as [`ErrorReport`] / [`MatchError`]; only panics reach the
//!    [`FaultSink`].
//!
//! # Example
//!
//! ```
//! use gqtmatch::prelude::*;
//!
//! let mut bridge = Bridge::default();
//! let templates = [
//!     TemplateSource::new("user", "query { user(id: *) { name } }"),
//!     TemplateSource::new("admin", "query { user(id: 1) { name } }"),
//! ];
//! assert!(bridge.init("", &templates).is_none());
//!
//! let outcome = bridge
//!     .match_all("query ($id: ID) { user(id: $id) { name } }", "", r#"{"id": 1}"#)
//!     .unwrap();
//! assert_eq!(outcome.matched, vec!["user", "admin"]);
//! assert_eq!(outcome.error, None);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod bridge;
mod error;
mod fault;
mod inspect;
mod invoke;
mod service;

pub mod engine;
pub mod schema;
pub mod syntax;
pub mod template;
pub mod workspace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Errors
pub use error::{line_column, ErrorDetail, ErrorKind, ErrorReport, SyntaxError, TemplateErrors};

// Compile pipeline
pub use schema::{SchemaCompiler, SchemaIndex};
pub use service::{MatchService, ServiceBuilder, Template};
pub use template::{
    CompiledBatch, CompiledTemplate, Constraint, TemplateCompiler, TemplateParser, TemplateSource,
};

// Matching
pub use engine::{EngineState, MatchError, MatchEvent, MatchRequest, Matches, TokenStream};
pub use invoke::{feed, Flow, MatchInvoker, MatchObserver, MatchOutcome};

// Inspection
pub use inspect::{OperationInfo, OperationInspector};

// Host surface
pub use bridge::{Bridge, ParseOperationResponse};
pub use fault::{Fault, FaultBoundary, FaultSink, TracingFaultSink};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use gqtmatch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Host surface
        Bridge,
        // Matching
        EngineState,
        // Errors
        ErrorKind,
        ErrorReport,
        Fault,
        FaultBoundary,
        FaultSink,
        Flow,
        MatchError,
        MatchEvent,
        MatchInvoker,
        MatchObserver,
        MatchOutcome,
        MatchRequest,
        MatchService,
        // Inspection
        OperationInfo,
        OperationInspector,
        ParseOperationResponse,
        Template,
        // Compile pipeline
        TemplateSource,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting of selection sets, list and object values, and list types
/// in a template or an operation. Also bounds an operation's nesting once its
/// fragment spreads are expanded.
///
/// Protects the recursive-descent parsers and the evaluator from stack
/// exhaustion.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of templates in one init batch.
///
/// Exceeding it is a `MARSHAL_ERR` at the host boundary.
pub const MAX_TEMPLATES: usize = 1024;

/// Maximum number of selections in an operation once its fragment spreads
/// are expanded.
///
/// Prevents width-based denial-of-service: a few fragments that each spread
/// the next one twice stay under [`MAX_DEPTH`] but expand exponentially.
/// Exceeding it ends the match run with an error.
pub const MAX_EXPANDED_SELECTIONS: usize = 1 << 16;

/// Maximum length in bytes of a single template or operation source.
pub const MAX_SOURCE_LENGTH: usize = 1 << 20;

/// Identifier of the service built by every init.
pub const SERVICE_ID: &str = "playground";
