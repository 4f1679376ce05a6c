//! Forward-reference weaving
//!
//! Fields may name a schema or enum before it is defined. Weaving settles
//! them against the current namespace:
//!
//! - a name of a schema turns the field into an embedded field
//! - a name of an enum turns it into a lookup keyed by the entry name and
//!   picking the entry value
//! - an explicit `Table.key.$picked` lookup takes its key field's kind once
//!   that field is known and scalar
//!
//! Each pass first resolves against an unchanged namespace, then applies the
//! replacements. Passes repeat until one makes no progress. Names that match
//! nothing stay pending; that is only an error once a caller needs the field.

use log::debug;

use super::errors::DefinitionError;
use super::file::{DefinitionFile, DefinitionKind};
use crate::constants::{ENUM_NAME_FIELD, ENUM_VALUE_FIELD};
use crate::schema::types::{Field, FieldKind, LookupTarget, ValueError};

impl DefinitionFile {
    /// Runs weaving to a fixed point and returns the number of fields settled.
    pub fn weave(&mut self) -> Result<usize, DefinitionError> {
        let mut settled = 0;
        let mut pass = 0;

        while !self.pending.is_empty() {
            let mut updates = Vec::new();
            for &schema_idx in &self.pending {
                let schema = &self.schemas[schema_idx];
                for (field_idx, field) in schema.fields().iter().enumerate() {
                    if let Some(woven) = self.resolve_field(&schema.name, field)? {
                        updates.push((schema_idx, field_idx, woven));
                    }
                }
            }

            if updates.is_empty() {
                break;
            }

            pass += 1;
            settled += updates.len();
            debug!("Weave pass {} settled {} field(s)", pass, updates.len());

            for (schema_idx, field_idx, woven) in updates {
                self.schemas[schema_idx].replace_field(field_idx, woven);
            }
            self.pending.retain(|&idx| self.schemas[idx].has_pending_fields());
        }

        Ok(settled)
    }

    /// Returns the settled form of `field`, or `None` if nothing changes yet.
    fn resolve_field(&self, schema: &str, field: &Field) -> Result<Option<Field>, DefinitionError> {
        match field.kind() {
            FieldKind::Unresolved => self.resolve_candidate(schema, field),
            FieldKind::Lookup => self.resolve_explicit_lookup(schema, field),
            FieldKind::List => {
                let Some(element) = field.element_template() else {
                    return Ok(None);
                };
                let Some(woven) = self.resolve_field(schema, element)? else {
                    return Ok(None);
                };
                let mut list = field.clone();
                list.set_element_template(woven)
                    .map_err(|source| invalid_default(schema, field, source))?;
                Ok(Some(list))
            }
            _ => Ok(None),
        }
    }

    fn resolve_candidate(&self, schema: &str, field: &Field) -> Result<Option<Field>, DefinitionError> {
        let candidate = field.type_name.as_str();
        match self.definition_kind(candidate) {
            Some(DefinitionKind::Schema) => {
                let Some(target) = self.get_schema(candidate) else {
                    return Ok(None);
                };
                let mut woven = field.clone();
                woven.resolve_embedded(&target.name);
                Ok(Some(woven))
            }
            Some(DefinitionKind::EnumTable) => {
                let Some(table) = self.get_enum_table(candidate) else {
                    return Ok(None);
                };
                let mut target = LookupTarget::new(table.name(), ENUM_NAME_FIELD, ENUM_VALUE_FIELD);
                target.picked_kind = table.schema().field(ENUM_VALUE_FIELD).map(Field::kind);

                let key_kind = table
                    .schema()
                    .field(ENUM_NAME_FIELD)
                    .map_or(FieldKind::String, Field::kind);
                let mut woven = field.clone();
                woven
                    .resolve_lookup(target, key_kind)
                    .map_err(|source| invalid_default(schema, field, source))?;
                Ok(Some(woven))
            }
            None => Ok(None),
        }
    }

    fn resolve_explicit_lookup(&self, schema: &str, field: &Field) -> Result<Option<Field>, DefinitionError> {
        let Some(target) = field.lookup_target() else {
            return Ok(None);
        };

        let target_schema = match self.definition_kind(&target.table) {
            Some(DefinitionKind::Schema) => self.get_schema(&target.table),
            Some(DefinitionKind::EnumTable) => self
                .get_enum_table(&target.table)
                .map(|table| table.schema().as_schema()),
            None => None,
        };
        let Some(target_schema) = target_schema else {
            return Ok(None);
        };

        let (Some(key), Some(picked)) = (
            target_schema.field(&target.key_field),
            target_schema.field(&target.picked_field),
        ) else {
            return Ok(None);
        };
        if !key.kind().is_scalar() || picked.kind().is_pending() {
            return Ok(None);
        }

        let mut settled = target.clone();
        settled.picked_kind = Some(picked.kind());
        let mut woven = field.clone();
        woven
            .resolve_lookup(settled, key.kind())
            .map_err(|source| invalid_default(schema, field, source))?;
        Ok(Some(woven))
    }
}

fn invalid_default(schema: &str, field: &Field, source: ValueError) -> DefinitionError {
    DefinitionError::WovenDefault {
        schema: schema.to_string(),
        field: field.name.clone(),
        literal: field
            .null_default()
            .map(ToString::to_string)
            .unwrap_or_default(),
        source,
    }
}
