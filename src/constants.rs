//! Common constants used across the schemaweave crate.

/// Column names of the implicit schema backing every enum table.
pub const ENUM_NAME_FIELD: &str = "name";
pub const ENUM_VALUE_FIELD: &str = "value";
pub const ENUM_COMMENT_FIELD: &str = "comment";

/// Seed used by auto-increment fields that do not declare one.
pub const DEFAULT_AUTO_INCREMENT_SEED: i64 = 1;

/// Separator between an embedded field and the fields of its target schema
/// in flattened names (`addr.city`).
pub const EMBEDDED_NAME_SEPARATOR: char = '.';
