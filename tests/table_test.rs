mod common;

use common::{cells, color_schema, color_table, game_definitions, init_test_logging};
use schemaweave::{Cell, Field, FieldKind, FlatSchema, Linker, Schema, Table, TableError, Value};
use serde_json::json;

fn item_table() -> Table {
    let linker = Linker::from_definitions(game_definitions(), Vec::new()).unwrap();
    Table::new("Items/Weapons", linker.flat_schema("Item").unwrap())
}

fn json_row(table: &Table, row: serde_json::Value) -> Vec<(String, Cell)> {
    let serde_json::Value::Object(map) = row else {
        panic!("row fixture must be an object");
    };
    map.iter()
        .filter(|(name, _)| table.column_index(name).is_some())
        .map(|(name, value)| (name.clone(), Value::from_json(value).unwrap()))
        .collect()
}

#[test]
fn test_rows_from_json_fill_defaults_and_counters() {
    let mut table = item_table();

    let sword = json_row(&table, json!({"name": "Sword", "stats.atk": 7, "tags[0]": "sharp"}));
    let shield = json_row(&table, json!({"name": "Shield", "rarity": "RARE", "stats.def": 5}));
    assert_eq!(table.add_named_rows([sword, shield]).unwrap(), 2);

    assert_eq!(table.cell(0, "id"), Some(&Value::Int32(1)));
    assert_eq!(table.cell(1, "id"), Some(&Value::Int32(2)));
    assert_eq!(table.cell(0, "rarity"), Some(&Value::from("COMMON")));
    assert_eq!(table.cell(1, "rarity"), Some(&Value::from("RARE")));
    assert_eq!(table.cell(0, "stats.atk"), Some(&Value::Int16(7)));
    assert_eq!(table.cell(0, "stats.def"), Some(&Value::Int16(0)));
    assert_eq!(table.cell(0, "tags[0]"), Some(&Value::from("sharp")));
    assert_eq!(table.cell(0, "tags[1]"), None);
}

#[test]
fn test_explicit_ids_advance_the_counter() {
    let mut table = item_table();
    table
        .add_named_row([("id", Some(Value::Int64(40))), ("name", Some(Value::from("Axe")))])
        .unwrap();
    table.add_named_row([("name", Some(Value::from("Bow")))]).unwrap();

    assert_eq!(table.cell(1, "id"), Some(&Value::Int32(41)));
}

#[test]
fn test_unique_names_ignore_case() {
    let mut table = item_table();
    table.add_named_row([("name", Some(Value::from("Sword")))]).unwrap();

    let err = table
        .add_named_row([("name", Some(Value::from("SWORD")))])
        .unwrap_err();
    assert!(matches!(err, TableError::UniqueViolation { ref column, .. } if column == "name"));
    assert_eq!(table.row_count(), 1);
}

#[test]
fn test_failed_batch_leaves_table_untouched() {
    let mut table = item_table();
    table.add_named_row([("name", Some(Value::from("Sword")))]).unwrap();

    let batch = vec![
        vec![("name", Some(Value::from("Bow")))],
        vec![("name", None)],
    ];
    let err = table.add_named_rows(batch).unwrap_err();
    assert!(matches!(err, TableError::NullNotAllowed { ref column, .. } if column == "name"));
    assert_eq!(table.row_count(), 1);

    // The rolled back row released its unique name and id.
    table.add_named_row([("name", Some(Value::from("Bow")))]).unwrap();
    assert_eq!(table.cell(1, "id"), Some(&Value::Int32(2)));
}

#[test]
fn test_coercion_failures_name_the_column() {
    let mut table = color_table("Color", &[]);
    let err = table.add_row([Some(Value::from("blue"))]).unwrap_err();
    assert!(matches!(err, TableError::Coercion { ref column, .. } if column == "code"));

    let err = table.add_row([Some(Value::Int64(i64::MAX))]).unwrap_err();
    assert!(matches!(err, TableError::Coercion { .. }));
    assert_eq!(table.row_count(), 0);
}

#[test]
fn test_find_first_row_coerces_the_probe() {
    let table = color_table("Color", &[3, 1, 3]);

    let row = table.find_first_row("code", &Value::Int8(3)).unwrap();
    assert_eq!(row[0], Some(Value::Int32(3)));
    assert!(table.find_first_row("code", &Value::from("1")).is_some());
    assert!(table.find_first_row("code", &Value::Int32(9)).is_none());
    assert!(table.find_first_row("code", &Value::from("nine")).is_none());
    assert!(table.find_first_row("shade", &Value::Int32(1)).is_none());
}

#[test]
fn test_negative_zero_matches_zero() {
    init_test_logging();
    let schema = Schema::with_fields("Point", [Field::new("x", FieldKind::Real64)]).unwrap();
    let mut table = Table::new("Points", FlatSchema::new(schema).unwrap());
    table.add_row(cells([Value::Real64(0.0)])).unwrap();

    assert!(table.find_first_row("x", &Value::Real64(-0.0)).is_some());
}

#[test]
fn test_merge_appends_in_order() {
    let mut merged = color_table("Color", &[1]);
    merged.merge(&color_table("More", &[2, 3])).unwrap();
    let codes: Vec<_> = merged.rows().map(|row| row[0].clone()).collect();
    assert_eq!(
        codes,
        vec![Some(Value::Int32(1)), Some(Value::Int32(2)), Some(Value::Int32(3))]
    );

    let shade = Schema::with_fields("Color", [Field::new("code", FieldKind::Int64)]).unwrap();
    let other = Table::new("Shades", FlatSchema::new(shade).unwrap());
    assert!(matches!(merged.merge(&other), Err(TableError::Incompatible { .. })));
}

#[test]
fn test_only_flat_schemas_back_tables() {
    init_test_logging();
    let nested = Schema::with_fields("Box", [Field::embedded("inner", "Color")]).unwrap();
    assert!(FlatSchema::new(nested).is_err());
    assert!(FlatSchema::new(color_schema()).is_ok());
}
