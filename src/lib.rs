//! # schemaweave
//!
//! Schema-driven data definitions and table interchange.
//!
//! Record types are described in a compact, commented-JSON definition
//! language. The crate parses those definitions, resolves types that are
//! referenced before they are declared, flattens nested types into scalar
//! columns and holds the resulting rows.
//!
//! ## Core Components
//!
//! * `schema` - Fields, schemas and scalar values
//! * `table` - Typed, null-aware row store bound to a flat schema
//! * `definition` - Definition language reader, enum tables and weaving
//! * `linker` - Flattening, partial-table merging and lookup resolution
//! * `config` - Reader configuration loaded from TOML
//!
//! ## Data flow
//!
//! Text is read into a `DefinitionFile`, whose schemas and enum tables are
//! woven as they are added. A `Linker` is then built from those definitions
//! and the authored tables; converters read flat schemas, merged tables and
//! reference values from it.

pub mod config;
pub mod constants;
pub mod definition;
pub mod linker;
pub mod schema;
pub mod table;

// Re-export main types for convenience
pub use config::{ConfigError, DefinitionConfig};
pub use definition::{DefinitionError, DefinitionFile, DefinitionKind};
pub use linker::{LinkError, Linker};
pub use schema::{Cell, Field, FieldKind, FlatSchema, LookupTarget, Schema, SchemaError, Value, ValueError};
pub use table::{Row, Table, TableError};
