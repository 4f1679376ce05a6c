//! Definition documents: parsing, enum tables and weaving.

pub mod comments;
pub mod enum_table;
pub mod errors;
pub mod file;
pub mod grammar;
pub mod node;
pub mod parser;
mod weave;

pub use errors::DefinitionError;
pub use file::{DefinitionFile, DefinitionKind, UnresolvedField};
pub use parser::{Definition, DefinitionReader};
