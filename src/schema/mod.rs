pub mod types;

// Re-export all types at the schema module level
pub use types::{
    name_key,
    Cell,
    Field,
    FieldKind,
    FlatSchema,
    LookupTarget,
    NameSet,
    Schema,
    SchemaError,
    Value,
    ValueError,
};
