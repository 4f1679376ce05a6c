use thiserror::Error;

use crate::schema::types::{FieldKind, SchemaError};
use crate::table::TableError;

/// Errors raised while linking schemas and tables or flattening a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    /// No schema is registered under the given name
    #[error("schema '{0}' is not known to the linker")]
    UnknownSchema(String),

    /// A field references a schema that is not registered
    #[error("schema '{schema}' referenced by field '{field}' was not found")]
    SchemaNotFound { schema: String, field: String },

    /// A lookup names a field its target does not have
    #[error("field '{field}' was not found in '{schema}'")]
    FieldNotFound { schema: String, field: String },

    /// Lookups may only key on and pick scalar fields
    #[error("lookup '{field}' targets '{table}.{target}' of kind {kind}, which is not scalar")]
    NonScalarLookup {
        field: String,
        table: String,
        target: String,
        kind: FieldKind,
    },

    /// A forward reference was never woven
    #[error("field '{field}' has unresolved type '{type_name}'")]
    Unresolved { field: String, type_name: String },

    /// A schema embeds itself, directly or through others
    #[error("schema '{schema}' embeds itself through {path}")]
    Cycle { schema: String, path: String },

    /// Two sources define the same schema differently
    #[error("schema '{0}' is not compatible with an existing schema of the same name")]
    IncompatibleSchema(String),

    /// Table names are unique across the linker
    #[error("table '{0}' is already registered")]
    DuplicateTable(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Table(#[from] TableError),
}
