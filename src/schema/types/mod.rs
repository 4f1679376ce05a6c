pub mod errors;
pub mod field;
pub mod flat;
pub mod schema;
pub mod value;

pub use errors::{SchemaError, ValueError};
pub use field::{name_key, Field, FieldKind, LookupTarget, NameSet};
pub use flat::FlatSchema;
pub use schema::Schema;
pub use value::{Cell, Value};
