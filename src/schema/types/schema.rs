use std::collections::HashMap;

use super::errors::SchemaError;
use super::field::{name_key, Field, NameSet};

/// An ordered, name-unique collection of fields.
///
/// Field order is significant and survives flattening. Lookups by field,
/// group and composite-key name are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub name: String,
    pub description: String,
    /// Always inlined into other schemas rather than stored standalone
    pub embed: bool,
    partials: NameSet,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    groups: HashMap<String, Vec<usize>>,
    composite_keys: HashMap<String, Vec<usize>>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds a schema from fields in order, failing on the first duplicate name.
    pub fn with_fields<I>(name: impl Into<String>, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = Field>,
    {
        let mut schema = Self::new(name);
        for field in fields {
            schema.add_field(field)?;
        }
        Ok(schema)
    }

    /// Copies name, description, embed flag and partials, without fields.
    pub fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            embed: self.embed,
            partials: self.partials.clone(),
            ..Self::default()
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.index.get(&name_key(name)).copied()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_index(name).map(|idx| &self.fields[idx])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_some()
    }

    pub fn add_field(&mut self, field: Field) -> Result<(), SchemaError> {
        self.add_field_at(self.fields.len(), field)
    }

    /// Inserts a field at `index`, shifting later fields.
    pub fn add_field_at(&mut self, index: usize, field: Field) -> Result<(), SchemaError> {
        if index > self.fields.len() {
            return Err(SchemaError::IndexOutOfRange {
                schema: self.name.clone(),
                index,
                len: self.fields.len(),
            });
        }
        if self.has_field(&field.name) {
            return Err(SchemaError::DuplicateField {
                schema: self.name.clone(),
                field: field.name,
            });
        }

        self.fields.insert(index, field);
        self.reindex();
        Ok(())
    }

    /// Swaps the field at `index` for one with the same name.
    pub(crate) fn replace_field(&mut self, index: usize, field: Field) {
        if let Some(slot) = self.fields.get_mut(index) {
            *slot = field;
            self.reindex();
        }
    }

    pub fn add_partial(&mut self, name: impl Into<String>) -> bool {
        self.partials.insert(name)
    }

    pub fn partials(&self) -> impl Iterator<Item = &str> {
        self.partials.iter()
    }

    /// Fields tagged with the given group, in declaration order.
    pub fn group(&self, name: &str) -> Vec<&Field> {
        self.indexed(&self.groups, name)
    }

    /// Fields forming the named composite key, in declaration order.
    pub fn composite_key(&self, name: &str) -> Vec<&Field> {
        self.indexed(&self.composite_keys, name)
    }

    pub fn group_names(&self) -> NameSet {
        self.fields.iter().flat_map(|f| f.groups.iter()).collect()
    }

    pub fn composite_key_names(&self) -> NameSet {
        self.fields.iter().flat_map(|f| f.composite_keys.iter()).collect()
    }

    /// Only flat schemas may back a table.
    pub fn is_flat(&self) -> bool {
        self.fields.iter().all(Field::is_flat)
    }

    pub fn has_pending_fields(&self) -> bool {
        self.fields.iter().any(Field::is_pending)
    }

    /// Field-by-field structural compatibility, position for position.
    pub fn is_compatible_with(&self, other: &Schema) -> bool {
        self.is_compatible_with_fields(other.fields())
    }

    pub fn is_compatible_with_fields(&self, fields: &[Field]) -> bool {
        self.fields.len() == fields.len()
            && self
                .fields
                .iter()
                .zip(fields)
                .all(|(mine, theirs)| mine.is_compatible_with(theirs))
    }

    fn indexed(&self, map: &HashMap<String, Vec<usize>>, name: &str) -> Vec<&Field> {
        map.get(&name_key(name))
            .map(|positions| positions.iter().map(|&idx| &self.fields[idx]).collect())
            .unwrap_or_default()
    }

    fn reindex(&mut self) {
        self.index.clear();
        self.groups.clear();
        self.composite_keys.clear();

        for (idx, field) in self.fields.iter().enumerate() {
            self.index.insert(name_key(&field.name), idx);
            for group in field.groups.iter() {
                self.groups.entry(name_key(group)).or_default().push(idx);
            }
            for key in field.composite_keys.iter() {
                self.composite_keys.entry(name_key(key)).or_default().push(idx);
            }
        }
    }
}
