use thiserror::Error;

use crate::schema::types::ValueError;

/// Errors raised by the row store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// A cell could not be converted to its column's kind
    #[error("column '{column}' of table '{table}': {source}")]
    Coercion {
        table: String,
        column: String,
        #[source]
        source: ValueError,
    },

    /// A null reached a non-nullable column without a default
    #[error("column '{column}' of table '{table}' does not accept null")]
    NullNotAllowed { table: String, column: String },

    /// A unique column already holds an equal value
    #[error("duplicate value '{value}' in unique column '{column}' of table '{table}'")]
    UniqueViolation {
        table: String,
        column: String,
        value: String,
    },

    /// Tables with structurally different schemas cannot be merged
    #[error("table '{other}' is not compatible with table '{table}'")]
    Incompatible { table: String, other: String },
}
