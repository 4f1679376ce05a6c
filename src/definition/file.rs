//! Definition files
//!
//! A `DefinitionFile` owns the schemas and enum tables read from one or more
//! documents. Schema and enum names share one case-insensitive namespace.
//! Every addition re-runs weaving, so a field may name a type that is only
//! defined later in the same document or in a file absorbed afterwards.

use std::collections::HashMap;

use log::{info, warn};

use super::errors::DefinitionError;
use super::parser::{Definition, DefinitionReader};
use crate::config::DefinitionConfig;
use crate::schema::types::{name_key, Field, FieldKind, Schema};
use crate::table::Table;

/// What a name in the definition namespace refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Schema,
    EnumTable,
}

/// A field whose type still names nothing known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedField {
    pub schema: String,
    pub field: String,
    pub candidate: String,
}

#[derive(Debug, Clone, Default)]
pub struct DefinitionFile {
    pub(super) schemas: Vec<Schema>,
    pub(super) enum_tables: Vec<Table>,
    pub(super) defs: HashMap<String, (DefinitionKind, usize)>,
    /// Schemas that still hold pending fields
    pub(super) pending: Vec<usize>,
}

impl DefinitionFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a definition document with the default configuration.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        Self::parse_with(text, &DefinitionConfig::default())
    }

    pub fn parse_with(text: &str, config: &DefinitionConfig) -> Result<Self, DefinitionError> {
        let reader = DefinitionReader::new(config.clone())?;
        let mut file = Self::new();

        for definition in reader.read_document(text)? {
            match definition {
                Definition::Schema(schema) => file.add_schema(schema)?,
                Definition::EnumTable(table) => file.add_enum_table(table)?,
            }
        }

        info!(
            "Parsed definition file with {} schema(s) and {} enum table(s)",
            file.schemas.len(),
            file.enum_tables.len()
        );
        if file.has_unresolved() {
            warn!(
                "Definition file still has {} unresolved field(s)",
                file.unresolved_fields().len()
            );
        }
        Ok(file)
    }

    /// Adds a schema and weaves pending fields against the grown namespace.
    ///
    /// If weaving fails the file is left exactly as it was before the call.
    pub fn add_schema(&mut self, schema: Schema) -> Result<(), DefinitionError> {
        let key = self.claim(&schema.name)?;
        let saved = (self.schemas.clone(), self.pending.clone());

        let index = self.schemas.len();
        if schema.has_pending_fields() {
            self.pending.push(index);
        }
        self.schemas.push(schema);
        self.defs.insert(key.clone(), (DefinitionKind::Schema, index));

        if let Err(err) = self.weave() {
            (self.schemas, self.pending) = saved;
            self.defs.remove(&key);
            return Err(err);
        }
        Ok(())
    }

    /// Adds an enum table and weaves pending fields against the grown namespace.
    ///
    /// If weaving fails the file is left exactly as it was before the call.
    pub fn add_enum_table(&mut self, table: Table) -> Result<(), DefinitionError> {
        let key = self.claim(table.name())?;
        let saved = (self.schemas.clone(), self.pending.clone());

        let index = self.enum_tables.len();
        self.enum_tables.push(table);
        self.defs.insert(key.clone(), (DefinitionKind::EnumTable, index));

        if let Err(err) = self.weave() {
            (self.schemas, self.pending) = saved;
            self.enum_tables.pop();
            self.defs.remove(&key);
            return Err(err);
        }
        Ok(())
    }

    /// Moves every definition of `other` into this file. Either all of them
    /// are added or none are.
    pub fn absorb(&mut self, other: DefinitionFile) -> Result<(), DefinitionError> {
        let saved = self.clone();
        let result = other
            .enum_tables
            .into_iter()
            .try_for_each(|table| self.add_enum_table(table))
            .and_then(|()| {
                other
                    .schemas
                    .into_iter()
                    .try_for_each(|schema| self.add_schema(schema))
            });

        if result.is_err() {
            *self = saved;
        }
        result
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(&name_key(name))
    }

    pub fn definition_kind(&self, name: &str) -> Option<DefinitionKind> {
        self.defs.get(&name_key(name)).map(|(kind, _)| *kind)
    }

    pub fn get_schema(&self, name: &str) -> Option<&Schema> {
        match self.defs.get(&name_key(name)) {
            Some((DefinitionKind::Schema, idx)) => self.schemas.get(*idx),
            _ => None,
        }
    }

    pub fn get_enum_table(&self, name: &str) -> Option<&Table> {
        match self.defs.get(&name_key(name)) {
            Some((DefinitionKind::EnumTable, idx)) => self.enum_tables.get(*idx),
            _ => None,
        }
    }

    /// Schemas in the order they were added.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn enum_tables(&self) -> &[Table] {
        &self.enum_tables
    }

    /// True while some schema holds a field that weaving has not settled.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn has_unresolved(&self) -> bool {
        self.schemas
            .iter()
            .any(|schema| schema.fields().iter().any(Field::is_unresolved))
    }

    pub fn unresolved_fields(&self) -> Vec<UnresolvedField> {
        self.schemas
            .iter()
            .flat_map(|schema| {
                schema.fields().iter().filter_map(move |field| {
                    unresolved_candidate(field).map(|candidate| UnresolvedField {
                        schema: schema.name.clone(),
                        field: field.name.clone(),
                        candidate: candidate.to_string(),
                    })
                })
            })
            .collect()
    }

    /// Fails on the first field whose type never resolved.
    pub fn ensure_resolved(&self) -> Result<(), DefinitionError> {
        match self.unresolved_fields().into_iter().next() {
            Some(missing) => Err(DefinitionError::Unresolved {
                schema: missing.schema,
                field: missing.field,
                candidate: missing.candidate,
            }),
            None => Ok(()),
        }
    }

    pub fn into_parts(self) -> (Vec<Schema>, Vec<Table>) {
        (self.schemas, self.enum_tables)
    }

    fn claim(&self, name: &str) -> Result<String, DefinitionError> {
        let key = name_key(name);
        if self.defs.contains_key(&key) {
            return Err(DefinitionError::duplicate(name, "definition name"));
        }
        Ok(key)
    }
}

/// Type name an unresolved field (or list element) is waiting for.
fn unresolved_candidate(field: &Field) -> Option<&str> {
    match field.kind() {
        FieldKind::Unresolved => Some(field.type_name.as_str()),
        FieldKind::List => field.element_template().and_then(unresolved_candidate),
        _ => None,
    }
}
