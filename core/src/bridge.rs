//! `Bridge` — the host-facing entry points.
//!
//! Each entry point runs inside the bridge's [`FaultBoundary`] and uses
//! `None` as its "no result" value:
//!
//! | Entry point       | `Some`                         | `None`                        |
//! |-------------------|--------------------------------|-------------------------------|
//! | `init`            | the init failed (report)       | service active, or a fault    |
//! | `match_all`       | outcome of the run             | not initialized, or a fault   |
//! | `parse_operation` | operations or `PARSE_OPR`      | a fault                       |

use serde::Serialize;
use std::rc::Rc;

use crate::engine::{EngineState, MatchRequest};
use crate::fault::{FaultBoundary, FaultSink};
use crate::inspect::{OperationInfo, OperationInspector};
use crate::invoke::{MatchInvoker, MatchOutcome};
use crate::template::TemplateSource;
use crate::{ErrorReport, MAX_TEMPLATES};

/// Result of [`Bridge::parse_operation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParseOperationResponse {
    Operations { operations: Vec<OperationInfo> },
    Failed(ErrorReport),
}

impl From<Result<Vec<OperationInfo>, ErrorReport>> for ParseOperationResponse {
    fn from(result: Result<Vec<OperationInfo>, ErrorReport>) -> Self {
        match result {
            Ok(operations) => Self::Operations { operations },
            Err(report) => Self::Failed(report),
        }
    }
}

/// Owns the engine state and exposes it to a host.
///
/// Cloning is cheap: clones share the active service and the fault sink,
/// and an `init` on one clone leaves the others untouched.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    state: EngineState,
    boundary: FaultBoundary,
}

impl Bridge {
    pub fn new(sink: impl FaultSink + 'static) -> Self {
        Self::with_boundary(FaultBoundary::new(sink))
    }

    #[must_use]
    pub fn shared(sink: Rc<dyn FaultSink>) -> Self {
        Self::with_boundary(FaultBoundary::shared(sink))
    }

    #[must_use]
    pub fn with_boundary(boundary: FaultBoundary) -> Self {
        Self {
            state: EngineState::new(),
            boundary,
        }
    }

    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    #[must_use]
    pub fn boundary(&self) -> &FaultBoundary {
        &self.boundary
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Compile `schema` and `templates` into the active service.
    ///
    /// Returns `None` once the new service is active. On failure the report
    /// is returned and the previous service, if any, stays active.
    pub fn init(&mut self, schema: &str, templates: &[TemplateSource]) -> Option<ErrorReport> {
        let state = &mut self.state;
        self.boundary
            .guard("init", || {
                if templates.len() > MAX_TEMPLATES {
                    return Some(ErrorReport::marshal(format!(
                        "{} templates supplied, but maximum allowed is {MAX_TEMPLATES}",
                        templates.len()
                    )));
                }
                state.init(schema, templates).err()
            })
            .flatten()
    }

    /// Match an operation against every active template.
    ///
    /// Empty `operation_name` or `variables_json` mean absent. Returns `None`
    /// before the first successful [`init`](Self::init).
    pub fn match_all(
        &self,
        operation: &str,
        operation_name: &str,
        variables_json: &str,
    ) -> Option<MatchOutcome> {
        self.boundary
            .guard("matchAll", || {
                let request = MatchRequest::from_host(operation, operation_name, variables_json);
                MatchInvoker::new(&self.state).collect(request)
            })
            .flatten()
    }

    /// List the named operations in `source`.
    pub fn parse_operation(&self, source: &str) -> Option<ParseOperationResponse> {
        self.boundary.guard("parseOperation", || {
            OperationInspector::new(self.state.schema())
                .inspect(source)
                .into()
        })
    }
}
