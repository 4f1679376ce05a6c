//! Enum definitions
//!
//! `"enum Color[: int16][ // description]": ["RED", "GREEN = 4 // comment"]`
//! becomes a table over `(name: string, value: <int kind>, comment: string)`.
//! Values count up from zero; an explicit value restarts the count.

use log::debug;

use super::errors::DefinitionError;
use super::grammar::TypeGrammar;
use super::node::DefNode;
use crate::constants::{ENUM_COMMENT_FIELD, ENUM_NAME_FIELD, ENUM_VALUE_FIELD};
use crate::schema::types::{Field, FieldKind, FlatSchema, NameSet, Schema, Value};
use crate::table::Table;

/// Schema shared by every enum table, with the given value kind.
pub fn enum_schema(name: &str, value_kind: FieldKind) -> Result<Schema, DefinitionError> {
    Ok(Schema::with_fields(
        name,
        [
            Field::new(ENUM_NAME_FIELD, FieldKind::String),
            Field::new(ENUM_VALUE_FIELD, value_kind),
            Field::new(ENUM_COMMENT_FIELD, FieldKind::String),
        ],
    )?)
}

pub fn read_enum_table(
    grammar: &TypeGrammar,
    header: &str,
    body: &DefNode,
) -> Result<Table, DefinitionError> {
    let header = grammar.parse_enum_header(header)?;
    let name = header.name;

    let declared = match header.kind.as_deref() {
        Some(keyword) => {
            let kind = FieldKind::from_keyword(keyword)
                .ok_or_else(|| DefinitionError::InvalidEnumHeader(format!("enum {}: {}", name, keyword)))?;
            if !kind.is_integer() {
                return Err(DefinitionError::InvalidEnumKind { name, kind });
            }
            Some(kind)
        }
        None => None,
    };

    let DefNode::Array(lines) = body else {
        return Err(DefinitionError::unexpected(
            format!("enum '{}'", name),
            "array of rows",
            body.kind_name(),
        ));
    };

    let mut entries = Vec::with_capacity(lines.len());
    let mut seen = NameSet::new();
    let mut next: i64 = 0;
    let mut max: i64 = 0;

    for line in lines {
        let text = line.as_str().ok_or_else(|| {
            DefinitionError::unexpected(format!("enum '{}'", name), "string row", line.kind_name())
        })?;
        let row = grammar.parse_enum_row(&name, text)?;

        let value = row.value.unwrap_or(next);
        if value < 0 {
            return Err(DefinitionError::NegativeEnumValue { name, value });
        }
        if !seen.insert(row.name.as_str()) {
            return Err(DefinitionError::duplicate(row.name, "enum entry"));
        }

        next = value.saturating_add(1);
        max = max.max(value);
        entries.push((row.name, value, row.comment));
    }

    let kind = match declared {
        Some(kind) => {
            if kind.integer_max().is_some_and(|limit| max > limit) {
                return Err(DefinitionError::EnumOutOfRange {
                    name,
                    value: max,
                    kind,
                });
            }
            kind
        }
        None => FieldKind::smallest_integer_for(max),
    };

    let mut schema = enum_schema(&name, kind)?;
    if let Some(description) = header.description {
        schema.description = description;
    }

    let mut table = Table::new(name.as_str(), FlatSchema::new(schema)?);
    table.add_rows(entries.into_iter().map(|(entry, value, comment)| {
        [
            Some(Value::String(entry)),
            Some(Value::Int64(value)),
            Some(Value::String(comment)),
        ]
    }))?;

    debug!(
        "Read enum '{}' with {} entries stored as {}",
        table.name(),
        table.row_count(),
        kind
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(header: &str, body: &str) -> Result<Table, DefinitionError> {
        let grammar = TypeGrammar::new().unwrap();
        read_enum_table(&grammar, header, &DefNode::parse(body).unwrap())
    }

    #[test]
    fn test_values_count_up_and_reset() {
        let table = read("enum Color", r#"["RED", "GREEN = 5 // leaf", "BLUE"]"#).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(0, "value"), Some(&Value::Int8(0)));
        assert_eq!(table.cell(1, "value"), Some(&Value::Int8(5)));
        assert_eq!(table.cell(2, "value"), Some(&Value::Int8(6)));
        assert_eq!(table.cell(1, "comment"), Some(&Value::from("leaf")));
    }

    #[test]
    fn test_kind_is_inferred_from_max() {
        let narrow = read("enum Small", r#"["A = 100"]"#).unwrap();
        assert_eq!(narrow.schema().field("value").unwrap().kind(), FieldKind::Int8);

        let wide = read("enum Wide", r#"["A = 200"]"#).unwrap();
        assert_eq!(wide.schema().field("value").unwrap().kind(), FieldKind::Int16);
    }

    #[test]
    fn test_declared_kind_is_range_checked() {
        let table = read("enum Big: int32 // sizes", r#"["A = 200"]"#).unwrap();
        assert_eq!(table.schema().field("value").unwrap().kind(), FieldKind::Int32);
        assert_eq!(table.schema().description, "sizes");

        let err = read("enum Tiny: int8", r#"["A = 128"]"#).unwrap_err();
        assert!(matches!(err, DefinitionError::EnumOutOfRange { value: 128, .. }));

        let err = read("enum Text: string", r#"["A"]"#).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidEnumKind { .. }));
    }

    #[test]
    fn test_row_errors() {
        assert!(matches!(
            read("enum E", r#"["A = -1"]"#).unwrap_err(),
            DefinitionError::NegativeEnumValue { value: -1, .. }
        ));
        assert!(matches!(
            read("enum E", r#"["A", "a"]"#).unwrap_err(),
            DefinitionError::Duplicate { .. }
        ));
        assert!(matches!(
            read("enum E", r#"["9A"]"#).unwrap_err(),
            DefinitionError::InvalidEnumRow { .. }
        ));
        assert!(read("enum E", r#"{"A": 1}"#).is_err());
    }
}
