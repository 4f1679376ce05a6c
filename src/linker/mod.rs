//! Linker
//!
//! The linker is built once from a closed set of schemas and authored tables.
//! Tables sharing a schema are that schema's partial tables; at construction
//! they are concatenated, in registration order, into one merged table backed
//! by the schema's flat form. Afterwards the linker is read-only and can be
//! shared between threads.

pub mod errors;
mod flatten;

pub use errors::LinkError;

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::definition::DefinitionFile;
use crate::schema::types::{name_key, Field, FieldKind, Schema, Value};
use crate::table::Table;

#[derive(Debug, Clone, Default)]
pub struct Linker {
    schemas: HashMap<String, Schema>,
    schema_order: Vec<String>,
    tables: HashMap<String, Table>,
    table_order: Vec<String>,
    /// Schema key to the keys of its partial tables
    partials: HashMap<String, Vec<String>>,
    /// Schema key to its merged table
    merged: HashMap<String, Table>,
}

impl Linker {
    pub fn new<S, T>(schemas: S, tables: T) -> Result<Self, LinkError>
    where
        S: IntoIterator<Item = Schema>,
        T: IntoIterator<Item = Table>,
    {
        let mut linker = Self::default();

        for schema in schemas {
            linker.register_schema(schema)?;
        }
        for table in tables {
            linker.register_table(table)?;
        }
        linker.build_merged_tables()?;

        info!(
            "Linked {} schema(s) and {} table(s) into {} merged table(s)",
            linker.schemas.len(),
            linker.tables.len(),
            linker.merged.len()
        );
        Ok(linker)
    }

    /// Links the schemas and enum tables of a definition file with the
    /// given authored tables.
    pub fn from_definitions<T>(definitions: DefinitionFile, tables: T) -> Result<Self, LinkError>
    where
        T: IntoIterator<Item = Table>,
    {
        let (schemas, enum_tables) = definitions.into_parts();
        Self::new(schemas, enum_tables.into_iter().chain(tables))
    }

    pub fn get_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(&name_key(name))
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(&name_key(name))
    }

    /// Schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schema_order.iter().filter_map(|key| self.schemas.get(key))
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name_key(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name_key(name))
    }

    /// Authored tables in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.table_order.iter().filter_map(|key| self.tables.get(key))
    }

    /// The merged table of a schema that has at least one partial table.
    pub fn get_merged_table(&self, schema_name: &str) -> Option<&Table> {
        self.merged.get(&name_key(schema_name))
    }

    /// Partial tables of a schema in registration order; empty if none.
    pub fn get_partial_tables(&self, schema_name: &str) -> Vec<&Table> {
        self.partials
            .get(&name_key(schema_name))
            .map(|keys| keys.iter().filter_map(|key| self.tables.get(key)).collect())
            .unwrap_or_default()
    }

    /// Follows a lookup: finds the first row of `table_name` whose `key_field`
    /// equals `value` and returns its `picked_field` cell.
    ///
    /// Returns `None` for a dangling reference: no such table, field or row,
    /// or a null picked cell.
    pub fn get_reference_value(
        &self,
        table_name: &str,
        key_field: &str,
        picked_field: &str,
        value: &Value,
    ) -> Option<&Value> {
        let table = self
            .get_merged_table(table_name)
            .or_else(|| self.get_table(table_name))?;
        let column = table.column_index(picked_field)?;
        let row = table.find_first_row(key_field, value)?;
        row.get(column)?.as_ref()
    }

    /// The key field a lookup field points at.
    pub fn reference_field(&self, field: &Field) -> Option<&Field> {
        let target = field.lookup_target()?;
        self.lookup_schema(&target.table)?.field(&target.key_field)
    }

    /// The field a lookup field picks from the matched row.
    pub fn reference_picked_field(&self, field: &Field) -> Option<&Field> {
        let target = field.lookup_target()?;
        self.lookup_schema(&target.table)?.field(&target.picked_field)
    }

    /// Schemas directly reachable from `schema` through embedded fields or
    /// lists of embedded fields, without duplicates.
    pub fn related_schemas(&self, schema: &Schema) -> Vec<&Schema> {
        let mut seen = HashSet::new();
        let mut related = Vec::new();
        for field in schema.fields() {
            if let Some(target) = embedded_target(field) {
                if let Some(found) = self.get_schema(target) {
                    if seen.insert(name_key(&found.name)) {
                        related.push(found);
                    }
                }
            }
        }
        related
    }

    /// Partial tables of every schema that embeds, lists or looks up
    /// `schema_name`, directly or through embedded schemas.
    pub fn related_partial_tables(&self, schema_name: &str) -> Vec<&Table> {
        let wanted = name_key(schema_name);
        self.schema_order
            .iter()
            .filter(|key| self.partials.get(*key).is_some_and(|p| !p.is_empty()))
            .filter(|key| {
                self.schemas.get(*key).is_some_and(|schema| {
                    let mut visited = HashSet::new();
                    schema
                        .fields()
                        .iter()
                        .any(|field| self.relates_to(field, &wanted, &mut visited))
                })
            })
            .flat_map(|key| self.get_partial_tables(key))
            .collect()
    }

    /// Schema of a lookup target: a registered schema or an authored table.
    fn lookup_schema(&self, name: &str) -> Option<&Schema> {
        self.get_schema(name)
            .or_else(|| self.get_table(name).map(|table| table.schema().as_schema()))
    }

    fn relates_to(&self, field: &Field, wanted: &str, visited: &mut HashSet<String>) -> bool {
        match field.kind() {
            FieldKind::Embedded => {
                let Some(target) = field.target_schema() else {
                    return false;
                };
                let key = name_key(target);
                if key == wanted {
                    return true;
                }
                if !visited.insert(key.clone()) {
                    return false;
                }
                self.schemas.get(&key).is_some_and(|schema| {
                    schema
                        .fields()
                        .iter()
                        .any(|child| self.relates_to(child, wanted, visited))
                })
            }
            FieldKind::List => field
                .element_template()
                .is_some_and(|element| self.relates_to(element, wanted, visited)),
            _ => field
                .lookup_target()
                .is_some_and(|target| name_key(&target.table) == wanted),
        }
    }

    fn register_schema(&mut self, schema: Schema) -> Result<(), LinkError> {
        let key = name_key(&schema.name);
        match self.schemas.get(&key) {
            Some(existing) => {
                if !existing.is_compatible_with(&schema) {
                    return Err(LinkError::IncompatibleSchema(schema.name));
                }
            }
            None => {
                self.schema_order.push(key.clone());
                self.schemas.insert(key, schema);
            }
        }
        Ok(())
    }

    fn register_table(&mut self, table: Table) -> Result<(), LinkError> {
        let key = name_key(table.name());
        if self.tables.contains_key(&key) {
            return Err(LinkError::DuplicateTable(table.name().to_string()));
        }

        let schema_key = name_key(&table.schema().name);
        if !self.schemas.contains_key(&schema_key) {
            self.register_schema(table.schema().as_schema().clone())?;
        }

        self.partials.entry(schema_key).or_default().push(key.clone());
        self.table_order.push(key.clone());
        self.tables.insert(key, table);
        Ok(())
    }

    fn build_merged_tables(&mut self) -> Result<(), LinkError> {
        let mut merged = HashMap::new();

        for schema_key in &self.schema_order {
            let Some(partial_keys) = self.partials.get(schema_key) else {
                continue;
            };
            let Some(schema) = self.schemas.get(schema_key) else {
                continue;
            };

            let flat = self.to_flat_schema(schema)?;
            let mut table = Table::new(schema.name.as_str(), flat);
            for partial_key in partial_keys {
                let Some(partial) = self.tables.get(partial_key) else {
                    continue;
                };
                if !table.is_compatible_with(partial) {
                    return Err(LinkError::IncompatibleSchema(partial.schema().name.clone()));
                }
                table.merge(partial)?;
            }

            debug!(
                "Merged {} partial table(s) of '{}' into {} row(s)",
                partial_keys.len(),
                schema.name,
                table.row_count()
            );
            merged.insert(schema_key.clone(), table);
        }

        self.merged = merged;
        Ok(())
    }
}

/// Target schema of an embedded field or a list of embedded elements.
fn embedded_target(field: &Field) -> Option<&str> {
    match field.kind() {
        FieldKind::Embedded => field.target_schema(),
        FieldKind::List => field.element_template().and_then(embedded_target),
        _ => None,
    }
}
