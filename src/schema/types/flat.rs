use std::ops::Deref;

use super::errors::SchemaError;
use super::schema::Schema;

/// A schema whose every field is scalar.
///
/// Tables only accept a `FlatSchema`, so list, embedded and unresolved
/// fields can never reach a row store.
#[derive(Debug, Clone)]
pub struct FlatSchema(Schema);

impl FlatSchema {
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        if !schema.is_flat() {
            return Err(SchemaError::NotFlat(schema.name));
        }

        if let Some(field) = schema
            .fields()
            .iter()
            .find(|f| f.auto_increment && !f.kind().is_integer())
        {
            return Err(SchemaError::InvalidAutoIncrement {
                schema: schema.name.clone(),
                field: field.name.clone(),
                kind: field.kind(),
            });
        }

        Ok(Self(schema))
    }

    pub fn as_schema(&self) -> &Schema {
        &self.0
    }

    pub fn into_inner(self) -> Schema {
        self.0
    }
}

impl Deref for FlatSchema {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.0
    }
}

impl TryFrom<Schema> for FlatSchema {
    type Error = SchemaError;

    fn try_from(schema: Schema) -> Result<Self, Self::Error> {
        Self::new(schema)
    }
}
