//! Schema flattening
//!
//! Expands every non-scalar field into scalar fields:
//!
//! - embedded field `addr` of a schema with `city` yields `addr.city`; a
//!   nullable `addr` makes every emitted field nullable
//! - `vals: list<int32, 3>` yields `vals[0]`, `vals[1]`, `vals[2]`, always
//!   nullable and without defaults
//! - a lookup takes the scalar kind of its target key field
//!
//! The input schema is never modified.

use super::errors::LinkError;
use super::Linker;
use crate::constants::EMBEDDED_NAME_SEPARATOR;
use crate::schema::types::{name_key, Field, FieldKind, FlatSchema, LookupTarget, Schema, SchemaError};

impl Linker {
    /// Flat form of `schema`; a schema that is already flat comes back as is.
    pub fn to_flat_schema(&self, schema: &Schema) -> Result<FlatSchema, LinkError> {
        if schema.is_flat() {
            return Ok(FlatSchema::new(schema.clone())?);
        }

        let mut stack = vec![name_key(&schema.name)];
        let mut flat = schema.empty_like();
        for field in self.flatten_fields(schema, &mut stack)? {
            flat.add_field(field)?;
        }
        Ok(FlatSchema::new(flat)?)
    }

    /// Flat form of the registered schema `name`.
    pub fn flat_schema(&self, name: &str) -> Result<FlatSchema, LinkError> {
        let schema = self
            .get_schema(name)
            .ok_or_else(|| LinkError::UnknownSchema(name.to_string()))?;
        self.to_flat_schema(schema)
    }

    fn flatten_fields(&self, schema: &Schema, stack: &mut Vec<String>) -> Result<Vec<Field>, LinkError> {
        let mut flat = Vec::with_capacity(schema.field_count());
        for field in schema.fields() {
            flat.extend(self.flatten_field(field, stack)?);
        }
        Ok(flat)
    }

    fn flatten_field(&self, field: &Field, stack: &mut Vec<String>) -> Result<Vec<Field>, LinkError> {
        match field.kind() {
            FieldKind::Unresolved => Err(LinkError::Unresolved {
                field: field.name.clone(),
                type_name: field.type_name.clone(),
            }),
            FieldKind::Embedded => self.flatten_embedded(field, stack),
            FieldKind::List => self.flatten_list(field, stack),
            FieldKind::Lookup => Ok(vec![self.settle_lookup(field)?]),
            _ => {
                if let Some(target) = field.lookup_target() {
                    if let Some(kind) = target.picked_kind.filter(|k| !k.is_scalar()) {
                        return Err(LinkError::NonScalarLookup {
                            field: field.name.clone(),
                            table: target.table.clone(),
                            target: target.picked_field.clone(),
                            kind,
                        });
                    }
                }
                Ok(vec![field.clone()])
            }
        }
    }

    fn flatten_embedded(&self, field: &Field, stack: &mut Vec<String>) -> Result<Vec<Field>, LinkError> {
        let target = field.target_schema().unwrap_or_default();
        let schema = self.get_schema(target).ok_or_else(|| LinkError::SchemaNotFound {
            schema: target.to_string(),
            field: field.name.clone(),
        })?;

        let key = name_key(&schema.name);
        if stack.contains(&key) {
            let mut path = stack.clone();
            path.push(key);
            return Err(LinkError::Cycle {
                schema: schema.name.clone(),
                path: path.join(" -> "),
            });
        }

        stack.push(key);
        let children = self.flatten_fields(schema, stack);
        stack.pop();

        Ok(children?
            .into_iter()
            .map(|child| {
                let mut child = child.renamed(format!(
                    "{}{}{}",
                    field.name, EMBEDDED_NAME_SEPARATOR, child.name
                ));
                if field.nullable {
                    child.make_optional();
                }
                child
            })
            .collect())
    }

    fn flatten_list(&self, field: &Field, stack: &mut Vec<String>) -> Result<Vec<Field>, LinkError> {
        let Some(element) = field.element_template() else {
            return Ok(Vec::new());
        };

        let mut flat = Vec::new();
        for idx in 0..field.element_count() {
            let slot = element.renamed(format!("{}[{}]", field.name, idx));
            for mut child in self.flatten_field(&slot, stack)? {
                child.make_optional();
                flat.push(child);
            }
        }
        Ok(flat)
    }

    /// Gives a lookup the scalar kind of its target key field.
    fn settle_lookup(&self, field: &Field) -> Result<Field, LinkError> {
        let Some(target) = field.lookup_target() else {
            return Err(LinkError::Unresolved {
                field: field.name.clone(),
                type_name: field.type_name.clone(),
            });
        };

        let mut visited = Vec::new();
        let key_kind = self.target_kind(field, &target.table, &target.key_field, &mut visited)?;
        visited.clear();
        let picked_kind = self.target_kind(field, &target.table, &target.picked_field, &mut visited)?;

        let mut settled: LookupTarget = target.clone();
        settled.picked_kind = Some(picked_kind);

        let mut flat = field.clone();
        flat.resolve_lookup(settled, key_kind).map_err(|source| {
            LinkError::Schema(SchemaError::InvalidDefault {
                field: field.name.clone(),
                literal: field.null_default().map(ToString::to_string).unwrap_or_default(),
                source,
            })
        })?;
        Ok(flat)
    }

    /// Scalar kind of `table.field_name`, following lookup chains.
    fn target_kind(
        &self,
        origin: &Field,
        table: &str,
        field_name: &str,
        visited: &mut Vec<String>,
    ) -> Result<FieldKind, LinkError> {
        let target_schema = self.lookup_schema(table).ok_or_else(|| LinkError::SchemaNotFound {
            schema: table.to_string(),
            field: origin.name.clone(),
        })?;
        let target = target_schema
            .field(field_name)
            .ok_or_else(|| LinkError::FieldNotFound {
                schema: table.to_string(),
                field: field_name.to_string(),
            })?;

        let non_scalar = |kind| LinkError::NonScalarLookup {
            field: origin.name.clone(),
            table: table.to_string(),
            target: field_name.to_string(),
            kind,
        };

        match target.kind() {
            kind if kind.is_scalar() => Ok(kind),
            FieldKind::Lookup => {
                let step = format!("{}.{}", name_key(table), name_key(field_name));
                if visited.contains(&step) {
                    return Err(non_scalar(FieldKind::Lookup));
                }
                visited.push(step);

                let next = target.lookup_target().ok_or_else(|| non_scalar(FieldKind::Lookup))?;
                self.target_kind(origin, &next.table, &next.key_field, visited)
            }
            kind => Err(non_scalar(kind)),
        }
    }
}
