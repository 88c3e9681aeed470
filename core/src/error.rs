//! `ErrorReport` — the tagged result every fallible entry point returns.
//!
//! An [`ErrorReport`] pairs a machine-readable [`ErrorKind`] with either a
//! single message or a per-template map of positioned messages. It serializes
//! to the exact shape hosts expect:
//!
//! | Kind | `errors` payload |
//! |------|------------------|
//! | `SCHEMA_ERR`, `INIT_GQT_PARSER`, `MARSHAL_ERR` | `["message"]` |
//! | `PARSE_OPR` | `"message"` |
//! | `TEMPLATE_ERR` | `{ "<template id>": ["line:column: message", ...] }` |

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Machine-readable error category reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The schema text failed to parse or validate.
    Schema,
    /// The template parser could not be constructed from the schema.
    InitParser,
    /// One or more templates failed to compile.
    Template,
    /// An operation failed to scan or to validate against the schema.
    ParseOperation,
    /// A host value had the wrong shape and was rejected at the boundary.
    Marshal,
}

impl ErrorKind {
    /// Wire code for this kind.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Schema => "SCHEMA_ERR",
            Self::InitParser => "INIT_GQT_PARSER",
            Self::Template => "TEMPLATE_ERR",
            Self::ParseOperation => "PARSE_OPR",
            Self::Marshal => "MARSHAL_ERR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A syntax or schema error located in a source text.
///
/// `line` and `column` are 1-based; `column` counts characters, not bytes.
/// Displays as `line:column: message`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Human-readable description.
    pub message: String,
}

impl SyntaxError {
    /// Create an error at `offset` in `source`, computing line and column.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        Self {
            offset,
            line,
            column,
            message: message.into(),
        }
    }
}

/// Compute the 1-based (line, column) of a byte offset.
///
/// Offsets past the end of `source` clamp to the end.
#[must_use]
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Per-template diagnostics, keyed by template id.
///
/// Ordered by id so reports are deterministic regardless of input order.
pub type TemplateErrors = BTreeMap<String, Vec<SyntaxError>>;

/// Payload of an [`ErrorReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// A single message.
    Message(String),
    /// Positioned messages for every template that failed.
    Templates(TemplateErrors),
}

/// A host-facing error: a kind plus its messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    kind: ErrorKind,
    detail: ErrorDetail,
}

impl ErrorReport {
    /// A report carrying one message.
    pub fn message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            detail: ErrorDetail::Message(message.into()),
        }
    }

    /// A `SCHEMA_ERR` report wrapping a schema parser diagnostic.
    pub fn schema(diagnostic: impl fmt::Display) -> Self {
        Self::message(ErrorKind::Schema, format!("parsing schema: {diagnostic}"))
    }

    /// An `INIT_GQT_PARSER` report wrapping a parser construction failure.
    pub fn init_parser(reason: impl fmt::Display) -> Self {
        Self::message(
            ErrorKind::InitParser,
            format!("initializing GQT parser: {reason}"),
        )
    }

    /// A `TEMPLATE_ERR` report carrying every failed template's diagnostics.
    #[must_use]
    pub fn templates(errors: TemplateErrors) -> Self {
        Self {
            kind: ErrorKind::Template,
            detail: ErrorDetail::Templates(errors),
        }
    }

    /// A `PARSE_OPR` report.
    pub fn parse_operation(message: impl Into<String>) -> Self {
        Self::message(ErrorKind::ParseOperation, message)
    }

    /// A `MARSHAL_ERR` report.
    pub fn marshal(message: impl Into<String>) -> Self {
        Self::message(ErrorKind::Marshal, message)
    }

    /// The error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error payload.
    #[must_use]
    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }

    /// Per-template diagnostics, if this is a `TEMPLATE_ERR`.
    #[must_use]
    pub fn template_errors(&self) -> Option<&TemplateErrors> {
        match &self.detail {
            ErrorDetail::Templates(errors) => Some(errors),
            ErrorDetail::Message(_) => None,
        }
    }

    /// Every message as a flat list of strings.
    ///
    /// Template diagnostics are prefixed with their template id.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match &self.detail {
            ErrorDetail::Message(message) => vec![message.clone()],
            ErrorDetail::Templates(errors) => errors
                .iter()
                .flat_map(|(id, errs)| errs.iter().map(move |e| format!("{id}: {e}")))
                .collect(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.kind)?;
        match &self.detail {
            ErrorDetail::Message(message) => f.write_str(message),
            ErrorDetail::Templates(errors) => {
                let count: usize = errors.values().map(Vec::len).sum();
                write!(f, "{count} error(s) in {} template(s)", errors.len())
            }
        }
    }
}

impl std::error::Error for ErrorReport {}

impl Serialize for ErrorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut report = serializer.serialize_struct("ErrorReport", 2)?;
        report.serialize_field("code", &self.kind)?;
        match (&self.detail, self.kind) {
            (ErrorDetail::Message(message), ErrorKind::ParseOperation) => {
                report.serialize_field("errors", message)?;
            }
            (ErrorDetail::Message(message), _) => {
                report.serialize_field("errors", &[message])?;
            }
            (ErrorDetail::Templates(errors), _) => {
                report.serialize_field("errors", &WireTemplateErrors(errors))?;
            }
        }
        report.end()
    }
}

/// Serializes template diagnostics as `{ id: ["line:column: message"] }`.
struct WireTemplateErrors<'a>(&'a TemplateErrors);

impl Serialize for WireTemplateErrors<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, errors) in self.0 {
            map.serialize_entry(id, &WireMessages(errors))?;
        }
        map.end()
    }
}

struct WireMessages<'a>(&'a [SyntaxError]);

impl Serialize for WireMessages<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for error in self.0 {
            seq.serialize_element(&error.to_string())?;
        }
        seq.end()
    }
}
