//! `SchemaCompiler` — raw schema text → validated schema.
//!
//! Schema parsing and validation are delegated to `apollo-compiler`. An empty
//! source selects schema-less mode: templates and operations are then checked
//! for syntax only.
//!
//! [`SchemaIndex`] is the flattened view the template parser checks against:
//! root operation types, composite types and, per field, its named return type
//! and declared argument names.

use apollo_compiler::ast::OperationType;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use std::collections::HashMap;
use std::sync::Arc;

use crate::syntax::OperationKind;
use crate::ErrorReport;

/// Source name reported in schema diagnostics.
pub const SCHEMA_SOURCE_NAME: &str = "schema.graphqls";

/// A validated schema shared between the active service and its templates.
pub type SharedSchema = Arc<Valid<Schema>>;

/// Turns raw schema text into a validated schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCompiler;

impl SchemaCompiler {
    /// Compile `source`.
    ///
    /// Returns `Ok(None)` for an empty source (schema-less mode).
    ///
    /// # Errors
    ///
    /// Returns a `SCHEMA_ERR` report wrapping the parser diagnostics when the
    /// schema fails to parse or validate.
    pub fn compile(source: &str) -> Result<Option<SharedSchema>, ErrorReport> {
        if source.is_empty() {
            tracing::debug!("empty schema source, compiling schema-less");
            return Ok(None);
        }

        match Schema::parse_and_validate(source, SCHEMA_SOURCE_NAME) {
            Ok(schema) => {
                tracing::debug!(types = schema.types.len(), "schema compiled");
                Ok(Some(Arc::new(schema)))
            }
            Err(invalid) => Err(ErrorReport::schema(invalid.errors)),
        }
    }
}

/// A field as seen by the template parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Innermost named return type (list and non-null wrappers removed).
    pub type_name: String,
    /// Declared argument names.
    pub arguments: Vec<String>,
}

/// A named type as seen by the template parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    /// Object, interface or union.
    pub composite: bool,
    /// Fields of objects and interfaces; empty for every other kind.
    pub fields: HashMap<String, FieldInfo>,
}

/// Flattened lookup tables derived from a validated schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    roots: HashMap<OperationKind, String>,
    types: HashMap<String, TypeInfo>,
}

impl SchemaIndex {
    /// Build the index for `schema`.
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        let mut types = HashMap::with_capacity(schema.types.len());

        for (name, ty) in &schema.types {
            let mut info = TypeInfo {
                composite: matches!(
                    ty,
                    ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_)
                ),
                fields: HashMap::new(),
            };
            match ty {
                ExtendedType::Object(object) => {
                    for (field_name, field) in &object.fields {
                        info.fields.insert(
                            field_name.to_string(),
                            FieldInfo {
                                type_name: field.ty.inner_named_type().to_string(),
                                arguments: field.arguments.iter().map(|a| a.name.to_string()).collect(),
                            },
                        );
                    }
                }
                ExtendedType::Interface(interface) => {
                    for (field_name, field) in &interface.fields {
                        info.fields.insert(
                            field_name.to_string(),
                            FieldInfo {
                                type_name: field.ty.inner_named_type().to_string(),
                                arguments: field.arguments.iter().map(|a| a.name.to_string()).collect(),
                            },
                        );
                    }
                }
                _ => {}
            }
            types.insert(name.to_string(), info);
        }

        let mut roots = HashMap::new();
        for (kind, operation_type) in [
            (OperationKind::Query, OperationType::Query),
            (OperationKind::Mutation, OperationType::Mutation),
            (OperationKind::Subscription, OperationType::Subscription),
        ] {
            if let Some(root) = schema.root_operation(operation_type) {
                roots.insert(kind, root.to_string());
            }
        }

        Self { roots, types }
    }

    /// Name of the root type for `kind`, if the schema defines one.
    #[must_use]
    pub fn root(&self, kind: OperationKind) -> Option<&str> {
        self.roots.get(&kind).map(String::as_str)
    }

    /// The index's own copy of `name`, if the type exists.
    #[must_use]
    pub fn type_name(&self, name: &str) -> Option<&str> {
        self.types.get_key_value(name).map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn type_info(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    #[must_use]
    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldInfo> {
        self.types.get(type_name)?.fields.get(field)
    }

    #[must_use]
    pub fn is_composite(&self, type_name: &str) -> bool {
        self.types.get(type_name).is_some_and(|t| t.composite)
    }
}
