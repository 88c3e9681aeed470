//! `OperationInspector` — lists the named operations of a document.
//!
//! Inspection never touches the active service; it only borrows its schema,
//! when there is one, to validate the document with `apollo-compiler`.

use apollo_compiler::validation::Valid;
use apollo_compiler::{ExecutableDocument, Schema};
use serde::Serialize;

use crate::syntax::{parse_document, OperationKind};
use crate::ErrorReport;

/// Source name reported in operation diagnostics.
pub const OPERATION_SOURCE_NAME: &str = "operation.graphql";

/// A named operation found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    /// Byte offset of the `query`/`mutation`/`subscription` keyword.
    pub index: usize,
}

/// Scans operation documents, optionally validating them against a schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationInspector<'a> {
    schema: Option<&'a Valid<Schema>>,
}

impl<'a> OperationInspector<'a> {
    #[must_use]
    pub fn new(schema: Option<&'a Valid<Schema>>) -> Self {
        Self { schema }
    }

    /// List every named operation in `source`, in document order.
    ///
    /// Anonymous operations are skipped.
    ///
    /// # Errors
    ///
    /// Returns a `PARSE_OPR` report when the document fails to parse, or,
    /// with a schema, when it fails validation.
    pub fn inspect(&self, source: &str) -> Result<Vec<OperationInfo>, ErrorReport> {
        let document = parse_document(source).map_err(|e| {
            ErrorReport::parse_operation(format!("error at index {}: {}", e.offset, e.message))
        })?;

        if let Some(schema) = self.schema {
            ExecutableDocument::parse_and_validate(schema, source, OPERATION_SOURCE_NAME)
                .map_err(|invalid| ErrorReport::parse_operation(invalid.errors.to_string()))?;
        }

        Ok(document
            .operations
            .into_iter()
            .filter_map(|operation| {
                Some(OperationInfo {
                    name: operation.name?,
                    kind: operation.kind,
                    index: operation.offset,
                })
            })
            .collect())
    }
}
