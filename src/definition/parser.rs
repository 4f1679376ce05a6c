//! Definition document reader
//!
//! A document is a JSON array of definitions, or a single definition object.
//! Each definition is either an enum (first key `enum <Name>[: <kind>]`) or a
//! schema:
//!
//! ```json
//! {
//!   "name": "Unit",
//!   "desc": "playable unit",
//!   "partials": ["Units/Heroes", "Units/Monsters"],
//!   "fields": {
//!     "id": { "type": "int32", "unique": true, "auto_increment": true },
//!     "hp": "int16 100 // starting hit points",
//!     "pos": "list<real32, 2>",
//!     "color": "Color"
//!   }
//! }
//! ```

use std::borrow::Cow;

use log::warn;

use super::comments::strip_comments;
use super::enum_table::read_enum_table;
use super::errors::DefinitionError;
use super::grammar::{split_default_and_description, TypeGrammar};
use super::node::DefNode;
use crate::config::DefinitionConfig;
use crate::schema::types::{Field, NameSet, Schema, Value};
use crate::table::Table;

/// One top-level definition of a document.
#[derive(Debug, Clone)]
pub enum Definition {
    Schema(Schema),
    EnumTable(Table),
}

pub struct DefinitionReader {
    grammar: TypeGrammar,
    config: DefinitionConfig,
}

impl DefinitionReader {
    pub fn new(config: DefinitionConfig) -> Result<Self, DefinitionError> {
        Ok(Self {
            grammar: TypeGrammar::new()?,
            config,
        })
    }

    pub fn config(&self) -> &DefinitionConfig {
        &self.config
    }

    /// Reads every definition of `text` in document order.
    pub fn read_document(&self, text: &str) -> Result<Vec<Definition>, DefinitionError> {
        let text = if self.config.allow_comments {
            Cow::Owned(strip_comments(text))
        } else {
            Cow::Borrowed(text)
        };

        match DefNode::parse(&text)? {
            DefNode::Array(items) => items.iter().map(|item| self.read_definition(item)).collect(),
            node @ DefNode::Object(_) => Ok(vec![self.read_definition(&node)?]),
            other => Err(DefinitionError::unexpected(
                "definition document",
                "array or object",
                other.kind_name(),
            )),
        }
    }

    pub fn read_definition(&self, node: &DefNode) -> Result<Definition, DefinitionError> {
        let DefNode::Object(entries) = node else {
            return Err(DefinitionError::unexpected(
                "definition list",
                "object",
                node.kind_name(),
            ));
        };

        match entries.first() {
            Some((key, body)) if key.starts_with("enum ") => {
                let table = read_enum_table(&self.grammar, key, body)?;
                for (key, _) in &entries[1..] {
                    self.skip_unknown(key, &format!("enum '{}'", table.name()))?;
                }
                Ok(Definition::EnumTable(table))
            }
            _ => Ok(Definition::Schema(self.read_schema(entries)?)),
        }
    }

    pub fn read_schema(&self, entries: &[(String, DefNode)]) -> Result<Schema, DefinitionError> {
        let mut schema = Schema::default();
        let mut named = false;

        for (key, node) in entries {
            match key.as_str() {
                "name" => {
                    let name = expect_str(node, "schema name")?.trim();
                    self.grammar.check_name(name, "schema name")?;
                    schema.name = name.to_string();
                    named = true;
                }
                "fields" => {
                    let DefNode::Object(fields) = node else {
                        return Err(DefinitionError::unexpected(
                            format!("fields of schema '{}'", schema.name),
                            "object",
                            node.kind_name(),
                        ));
                    };
                    for (name, field_node) in fields {
                        let name = name.trim();
                        self.grammar.check_name(name, "field name")?;
                        if schema.has_field(name) {
                            return Err(DefinitionError::duplicate(name, "field name"));
                        }
                        schema.add_field(self.read_field(name, field_node)?)?;
                    }
                }
                "partials" | "parts" => {
                    for partial in read_string_list(node, "partials")? {
                        self.grammar.check_partial_name(&partial)?;
                        if !schema.add_partial(partial.as_str()) {
                            return Err(DefinitionError::duplicate(partial, "partial name"));
                        }
                    }
                }
                "embed" => schema.embed = expect_bool(node, "embed")?,
                "desc" | "description" => {
                    schema.description = expect_str(node, "schema description")?.to_string();
                }
                other => self.skip_unknown(other, &format!("schema '{}'", schema.name))?,
            }
        }

        if !named {
            return Err(DefinitionError::MissingName);
        }
        Ok(schema)
    }

    /// Reads a field from its string shorthand or its object form.
    pub fn read_field(&self, name: &str, node: &DefNode) -> Result<Field, DefinitionError> {
        let (mut field, default) = match node {
            DefNode::String(text) => {
                let (mut field, rest) = self.grammar.build_field_type(name, text.trim())?;
                let (default, description) = split_default_and_description(rest);
                if let Some(description) = description {
                    field.description = description;
                }
                (field, default)
            }
            DefNode::Object(entries) => self.read_field_object(name, entries)?,
            other => {
                return Err(DefinitionError::unexpected(
                    format!("field '{}'", name),
                    "string or object",
                    other.kind_name(),
                ))
            }
        };

        if field.auto_increment && field.auto_increment_seed.is_none() {
            field.auto_increment_seed = Some(self.config.auto_increment_seed);
        }

        if let Some(literal) = default {
            field
                .set_null_default(Some(Value::String(literal.clone())))
                .map_err(|source| DefinitionError::InvalidDefault {
                    field: name.to_string(),
                    literal,
                    source,
                })?;
        }

        Ok(field)
    }

    fn read_field_object(
        &self,
        name: &str,
        entries: &[(String, DefNode)],
    ) -> Result<(Field, Option<String>), DefinitionError> {
        let context = format!("field '{}'", name);

        let type_text = entries
            .iter()
            .find(|(key, _)| key == "type")
            .map(|(_, node)| expect_str(node, "field type"))
            .transpose()?
            .ok_or_else(|| DefinitionError::InvalidType {
                field: name.to_string(),
                text: String::new(),
            })?;

        let (mut field, rest) = self.grammar.build_field_type(name, type_text)?;
        if !rest.trim().is_empty() {
            return Err(DefinitionError::InvalidType {
                field: name.to_string(),
                text: type_text.to_string(),
            });
        }

        let mut default = None;
        for (key, node) in entries {
            match key.as_str() {
                "type" => {}
                "default" => {
                    default = match node {
                        DefNode::Null => None,
                        other => Some(other.scalar_text().ok_or_else(|| {
                            DefinitionError::unexpected(context.as_str(), "scalar default", other.kind_name())
                        })?),
                    };
                }
                "desc" | "description" => {
                    field.description = expect_str(node, "field description")?.to_string();
                }
                "disables" => insert_all(&mut field.disable_tags, node, "disable tag")?,
                "groups" => insert_all(&mut field.groups, node, "group name")?,
                "keys" => insert_all(&mut field.composite_keys, node, "key name")?,
                "nullable" => field.nullable = expect_bool(node, "nullable")?,
                "auto_increment" => field.auto_increment = expect_bool(node, "auto_increment")?,
                "auto_increment_seed" => {
                    field.auto_increment_seed = Some(expect_i64(node, "auto_increment_seed")?);
                }
                "unique" => field.unique = expect_bool(node, "unique")?,
                "non_serialized" => field.non_serialized = expect_bool(node, "non_serialized")?,
                other => self.skip_unknown(other, &context)?,
            }
        }

        Ok((field, default))
    }

    fn skip_unknown(&self, key: &str, context: &str) -> Result<(), DefinitionError> {
        if self.config.strict_keys {
            return Err(DefinitionError::UnknownKey {
                key: key.to_string(),
                context: context.to_string(),
            });
        }
        warn!("Skipping unknown key '{}' in {}", key, context);
        Ok(())
    }
}

/// Reads an array of strings, trimming each entry.
pub fn read_string_list(node: &DefNode, context: &str) -> Result<Vec<String>, DefinitionError> {
    let DefNode::Array(items) = node else {
        return Err(DefinitionError::unexpected(context, "array of strings", node.kind_name()));
    };
    items
        .iter()
        .map(|item| expect_str(item, context).map(|s| s.trim().to_string()))
        .collect()
}

fn insert_all(set: &mut NameSet, node: &DefNode, role: &'static str) -> Result<(), DefinitionError> {
    for name in read_string_list(node, role)? {
        if !set.insert(name.as_str()) {
            return Err(DefinitionError::duplicate(name, role));
        }
    }
    Ok(())
}

fn expect_str<'n>(node: &'n DefNode, context: &str) -> Result<&'n str, DefinitionError> {
    node.as_str()
        .ok_or_else(|| DefinitionError::unexpected(context, "string", node.kind_name()))
}

fn expect_bool(node: &DefNode, context: &str) -> Result<bool, DefinitionError> {
    node.as_bool()
        .ok_or_else(|| DefinitionError::unexpected(context, "boolean", node.kind_name()))
}

fn expect_i64(node: &DefNode, context: &str) -> Result<i64, DefinitionError> {
    let value = match node {
        DefNode::Number(n) => n.as_i64(),
        _ => None,
    };
    value.ok_or_else(|| DefinitionError::unexpected(context, "integer", node.kind_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldKind;

    fn reader() -> DefinitionReader {
        DefinitionReader::new(DefinitionConfig::default()).unwrap()
    }

    fn read_one(text: &str) -> Result<Schema, DefinitionError> {
        match reader().read_document(text)?.pop() {
            Some(Definition::Schema(schema)) => Ok(schema),
            other => panic!("expected a schema, got {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_fields() {
        let schema = read_one(
            r#"{"name": "Unit", "desc": "units", "fields": {
                "hp": "int16 100 // hit points",
                "title": "string 'Sir Knight'",
                "pos": "list<real32, 2> 0.5"
            }}"#,
        )
        .unwrap();

        assert_eq!(schema.description, "units");
        let hp = schema.field("hp").unwrap();
        assert_eq!(hp.kind(), FieldKind::Int16);
        assert_eq!(hp.null_default(), Some(&Value::Int16(100)));
        assert_eq!(hp.description, "hit points");
        assert_eq!(
            schema.field("title").unwrap().null_default(),
            Some(&Value::from("Sir Knight"))
        );
        let pos = schema.field("pos").unwrap();
        assert_eq!(
            pos.element_template().unwrap().null_default(),
            Some(&Value::Real32(0.5))
        );
    }

    #[test]
    fn test_field_order_is_document_order() {
        let schema = read_one(r#"{"name": "A", "fields": {"z": "bool", "a": "bool", "m": "bool"}}"#).unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_object_fields() {
        let schema = read_one(
            r#"{"name": "Item", "fields": {
                "id": {"type": "int32", "unique": true, "auto_increment": true, "keys": ["pk"]},
                "tag": {"type": "string", "nullable": true, "groups": ["ui", "Ui2"], "disables": ["server"],
                        "default": "none", "description": "label", "color": "red"}
            }}"#,
        )
        .unwrap();

        let id = schema.field("id").unwrap();
        assert!(id.unique && id.auto_increment);
        assert_eq!(id.auto_increment_seed, Some(1));
        assert_eq!(schema.composite_key("pk").len(), 1);

        let tag = schema.field("tag").unwrap();
        assert!(tag.nullable);
        assert_eq!(tag.groups.len(), 2);
        assert!(tag.disable_tags.contains("SERVER"));
        assert_eq!(tag.description, "label");
        assert_eq!(tag.null_default(), Some(&Value::from("none")));
    }

    #[test]
    fn test_object_type_must_be_fully_consumed() {
        let err = read_one(r#"{"name": "A", "fields": {"x": {"type": "int32 5"}}}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidType { .. }));
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let err = read_one(r#"{"name": "A", "fields": {"x": "bool", "X": "int8"}}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::Duplicate { role: "field name", .. }));

        let err = read_one(r#"{"name": "A", "parts": ["p", "P"], "fields": {}}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::Duplicate { role: "partial name", .. }));

        let err = read_one(r#"{"name": "A", "fields": {"x": {"type": "bool", "groups": ["g", "g"]}}}"#)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Duplicate { role: "group name", .. }));
    }

    #[test]
    fn test_disallowed_names() {
        let err = read_one(r#"{"name": "1A", "fields": {}}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::DisallowedName { role: "schema name", .. }));

        let err = read_one(r#"{"name": "A", "fields": {"bad-name": "bool"}}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::DisallowedName { role: "field name", .. }));
    }

    #[test]
    fn test_invalid_default() {
        let err = read_one(r#"{"name": "A", "fields": {"x": "int8 300"}}"#).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidDefault { ref literal, .. } if literal == "300"));
    }

    #[test]
    fn test_unknown_keys_depend_on_strictness() {
        let text = r#"{"name": "A", "owner": "me", "fields": {}}"#;
        assert!(read_one(text).is_ok());

        let strict = DefinitionReader::new(DefinitionConfig::strict()).unwrap();
        assert!(matches!(
            strict.read_document(text).unwrap_err(),
            DefinitionError::UnknownKey { .. }
        ));
    }

    #[test]
    fn test_comments_are_optional() {
        let text = "[ // units\n {\"name\": \"A\", \"fields\": {}} ]";
        assert_eq!(reader().read_document(text).unwrap().len(), 1);

        let config = DefinitionConfig {
            allow_comments: false,
            ..DefinitionConfig::default()
        };
        let plain = DefinitionReader::new(config).unwrap();
        assert!(matches!(plain.read_document(text).unwrap_err(), DefinitionError::Json(_)));
    }

    #[test]
    fn test_enum_and_schema_mix() {
        let defs = reader()
            .read_document(r#"[{"enum Color": ["RED", "GREEN"]}, {"name": "A", "fields": {}}]"#)
            .unwrap();
        assert!(matches!(defs[0], Definition::EnumTable(ref t) if t.row_count() == 2));
        assert!(matches!(defs[1], Definition::Schema(ref s) if s.name == "A"));
    }

    #[test]
    fn test_missing_name() {
        assert!(matches!(
            read_one(r#"{"fields": {}}"#).unwrap_err(),
            DefinitionError::MissingName
        ));
    }
}
