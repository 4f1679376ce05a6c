use thiserror::Error;

use crate::schema::types::{FieldKind, SchemaError, ValueError};
use crate::table::TableError;

/// Errors raised while reading a definition document or weaving its types.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The document is not valid JSON
    #[error("JSON syntax error: {0}")]
    Json(#[from] serde_json::Error),

    /// A node has the wrong shape for its position
    #[error("expected {expected} in {context}, found {found}")]
    UnexpectedNode {
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A name does not satisfy the naming rules for its role
    #[error("'{name}' is a disallowed {role}")]
    DisallowedName { name: String, role: &'static str },

    /// A name was declared twice where it must be unique
    #[error("'{name}' is an already defined {role}")]
    Duplicate { name: String, role: &'static str },

    /// A schema definition has no name
    #[error("schema definition has no name")]
    MissingName,

    /// A type expression does not follow the type grammar
    #[error("'{text}' is an invalid type syntax for field '{field}'")]
    InvalidType { field: String, text: String },

    /// An enum header does not follow `enum <Name>[: <int-kind>]`
    #[error("'{0}' is an invalid enum definition")]
    InvalidEnumHeader(String),

    /// An enum was declared with a kind other than an integer kind
    #[error("enum '{name}' declares kind {kind}; only integer kinds are allowed")]
    InvalidEnumKind { name: String, kind: FieldKind },

    /// An enum row does not follow `<NAME>[ = <integer>][ // comment]`
    #[error("'{row}' is an invalid row of enum '{name}'")]
    InvalidEnumRow { name: String, row: String },

    /// Enum values start at zero and never go below it
    #[error("value {value} of enum '{name}' is negative")]
    NegativeEnumValue { name: String, value: i64 },

    /// The largest enum value does not fit the declared kind
    #[error("value {value} of enum '{name}' is out of range for {kind}")]
    EnumOutOfRange {
        name: String,
        value: i64,
        kind: FieldKind,
    },

    /// A default literal does not convert to its field's kind
    #[error("invalid default value '{literal}' for field '{field}': {source}")]
    InvalidDefault {
        field: String,
        literal: String,
        #[source]
        source: ValueError,
    },

    /// A default no longer converts once weaving settles its field's kind
    #[error("default '{literal}' of field '{field}' in schema '{schema}' does not fit its resolved type: {source}")]
    WovenDefault {
        schema: String,
        field: String,
        literal: String,
        #[source]
        source: ValueError,
    },

    /// An object key is not recognised and strict keys are enabled
    #[error("unknown key '{key}' in {context}")]
    UnknownKey { key: String, context: String },

    /// A field type names no known schema or enum
    #[error("field '{field}' of schema '{schema}' references unknown type '{candidate}'")]
    Unresolved {
        schema: String,
        field: String,
        candidate: String,
    },

    /// A grammar pattern failed to compile
    #[error("regex compilation failed in {context}: {message}")]
    Regex { context: String, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl DefinitionError {
    pub(crate) fn disallowed(name: impl Into<String>, role: &'static str) -> Self {
        Self::DisallowedName {
            name: name.into(),
            role,
        }
    }

    pub(crate) fn duplicate(name: impl Into<String>, role: &'static str) -> Self {
        Self::Duplicate {
            name: name.into(),
            role,
        }
    }

    pub(crate) fn unexpected(
        context: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::UnexpectedNode {
            context: context.into(),
            expected,
            found,
        }
    }
}
