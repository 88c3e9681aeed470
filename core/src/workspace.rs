//! Workspace documents: a schema, its templates and sample operations.
//!
//! Workspaces are exchanged as JSON or YAML:
//!
//! ```yaml
//! _version: 0
//! name: users
//! isSchemaless: false
//! schema: |
//!   type Query { user(id: ID!): User }
//!   type User { id: ID! name: String }
//! templates:
//!   - name: user-by-id
//!     source: query { user(id: *) { id name } }
//! operations:
//!   - name: GetUser
//!     source: query GetUser { user(id: 1) { id name } }
//!     variables: ""
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::template::TemplateSource;

/// The only workspace format version.
pub const WORKSPACE_VERSION: u32 = 0;

/// Errors from loading a workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported workspace version {0}, expected {WORKSPACE_VERSION}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(rename = "_version", default)]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub is_schemaless: bool,
    #[serde(default)]
    pub templates: Vec<WorkspaceTemplate>,
    #[serde(default)]
    pub operations: Vec<WorkspaceOperation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceTemplate {
    /// Defaults to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceOperation {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "query")]
    pub source: String,
    /// Variables as a JSON text; empty means none.
    #[serde(default)]
    pub variables: String,
}

impl Workspace {
    /// Parse a JSON workspace.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Json`] for malformed input and
    /// [`WorkspaceError::UnsupportedVersion`] for unknown versions.
    pub fn from_json(content: &str) -> Result<Self, WorkspaceError> {
        let workspace: Self = serde_json::from_str(content)?;
        workspace.checked()
    }

    /// Parse a YAML workspace.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Yaml`] for malformed input and
    /// [`WorkspaceError::UnsupportedVersion`] for unknown versions.
    pub fn from_yaml(content: &str) -> Result<Self, WorkspaceError> {
        let workspace: Self = serde_yaml::from_str(content)?;
        workspace.checked()
    }

    /// Load a workspace file, choosing the format by extension.
    ///
    /// `.json` is parsed as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Io`] when the file cannot be read, otherwise
    /// as [`from_json`](Self::from_json) / [`from_yaml`](Self::from_yaml).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkspaceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    fn checked(self) -> Result<Self, WorkspaceError> {
        if self.version != WORKSPACE_VERSION {
            return Err(WorkspaceError::UnsupportedVersion(self.version));
        }
        Ok(self)
    }

    /// Schema text to initialize with; empty in schema-less mode.
    #[must_use]
    pub fn schema_source(&self) -> &str {
        if self.is_schemaless {
            ""
        } else {
            &self.schema
        }
    }

    /// Templates in the form the engine takes them.
    #[must_use]
    pub fn template_sources(&self) -> Vec<TemplateSource> {
        self.templates
            .iter()
            .map(|t| TemplateSource::new(t.id(), t.source.as_str()))
            .collect()
    }

    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&WorkspaceOperation> {
        self.operations.iter().find(|o| o.name == name)
    }
}

impl WorkspaceTemplate {
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}
