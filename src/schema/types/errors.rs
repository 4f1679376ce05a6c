use thiserror::Error;

use super::field::FieldKind;

/// Errors raised when a scalar value cannot be converted to a field kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The value has no meaningful representation in the target kind
    #[error("cannot convert '{value}' ({from}) to {to}")]
    Conversion {
        value: String,
        from: &'static str,
        to: FieldKind,
    },

    /// The value is numeric but does not fit the target kind
    #[error("value {value} is out of range for {to}")]
    OutOfRange { value: String, to: FieldKind },

    /// Only scalar kinds hold values
    #[error("{0} is not a scalar kind")]
    NonScalar(FieldKind),

    /// JSON arrays and objects have no scalar counterpart
    #[error("unsupported JSON value: {0}")]
    UnsupportedJson(String),
}

impl ValueError {
    pub(crate) fn conversion(value: impl ToString, from: &'static str, to: FieldKind) -> Self {
        Self::Conversion {
            value: value.to_string(),
            from,
            to,
        }
    }

    pub(crate) fn out_of_range(value: impl ToString, to: FieldKind) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            to,
        }
    }
}

/// Errors raised while building or validating a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Field names are unique (case-insensitively) within a schema
    #[error("field '{field}' is already defined in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    /// A field could not be inserted at the requested position
    #[error("index {index} is out of range for schema '{schema}' with {len} field(s)")]
    IndexOutOfRange {
        schema: String,
        index: usize,
        len: usize,
    },

    /// A default literal does not convert to the field's kind
    #[error("invalid default value '{literal}' for field '{field}': {source}")]
    InvalidDefault {
        field: String,
        literal: String,
        #[source]
        source: ValueError,
    },

    /// A flat schema was required
    #[error("schema '{0}' is not flat")]
    NotFlat(String),

    /// Auto-increment is only meaningful on integer columns
    #[error("field '{field}' of schema '{schema}' is auto-increment but has kind {kind}")]
    InvalidAutoIncrement {
        schema: String,
        field: String,
        kind: FieldKind,
    },
}
