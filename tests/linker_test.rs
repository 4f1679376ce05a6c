mod common;

use common::{color_table, game_definitions, init_test_logging};
use schemaweave::{Cell, FlatSchema, LinkError, Linker, Schema, Table, TableError, Value};

fn item_row(id: Option<i32>, name: &str) -> Vec<(&'static str, Cell)> {
    vec![("id", id.map(Value::Int32)), ("name", Some(Value::from(name)))]
}

fn game_tables(linker: &Linker) -> Vec<Table> {
    let item = linker.flat_schema("Item").unwrap();
    let loot = linker.flat_schema("Loot").unwrap();

    let mut weapons = Table::new("Items/Weapons", item.clone());
    weapons
        .add_named_rows([item_row(None, "Sword"), item_row(None, "Bow")])
        .unwrap();

    let mut armor = Table::new("Items/Armor", item);
    armor
        .add_named_rows([item_row(Some(100), "Shield"), item_row(Some(101), "Helm")])
        .unwrap();

    let mut drops = Table::new("Loot", loot);
    drops.add_row([Some(Value::Int32(101)), Some(Value::Real32(0.25))]).unwrap();

    vec![weapons, armor, drops]
}

fn game_linker() -> Linker {
    let schemas_only = Linker::from_definitions(game_definitions(), Vec::new()).unwrap();
    let tables = game_tables(&schemas_only);
    Linker::from_definitions(game_definitions(), tables).unwrap()
}

fn names(schema: &Schema) -> Vec<&str> {
    schema.fields().iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn test_flat_item_schema() {
    let linker = game_linker();
    let flat = linker.flat_schema("Item").unwrap();

    assert_eq!(
        names(&flat),
        vec!["id", "name", "rarity", "stats.atk", "stats.def", "tags[0]", "tags[1]"]
    );
    assert!(flat.field("tags[0]").unwrap().nullable);
    assert!(!flat.field("stats.atk").unwrap().nullable);

    let again = linker.to_flat_schema(&flat).unwrap();
    assert_eq!(names(&again), names(&flat));
    assert!(again.is_compatible_with(&flat));
}

#[test]
fn test_merged_table_concatenates_partials_in_order() {
    let linker = game_linker();

    let partials: Vec<&str> = linker.get_partial_tables("item").into_iter().map(|t| t.name()).collect();
    assert_eq!(partials, vec!["Items/Weapons", "Items/Armor"]);

    let merged = linker.get_merged_table("Item").unwrap();
    assert_eq!(merged.name(), "Item");
    assert_eq!(merged.row_count(), 4);
    let names: Vec<_> = merged.rows().map(|row| row[1].clone()).collect();
    assert_eq!(
        names,
        vec![
            Some(Value::from("Sword")),
            Some(Value::from("Bow")),
            Some(Value::from("Shield")),
            Some(Value::from("Helm")),
        ]
    );

    assert!(linker.get_merged_table("Stats").is_none());
    assert!(linker.get_partial_tables("Stats").is_empty());
}

#[test]
fn test_reference_values_follow_lookups() {
    let linker = game_linker();

    assert_eq!(
        linker.get_reference_value("Item", "id", "name", &Value::Int32(101)),
        Some(&Value::from("Helm"))
    );
    assert_eq!(
        linker.get_reference_value("Rarity", "name", "value", &Value::from("rare")),
        Some(&Value::Int8(10))
    );
    assert_eq!(linker.get_reference_value("Item", "id", "name", &Value::Int32(7)), None);
    assert_eq!(linker.get_reference_value("Nowhere", "id", "name", &Value::Int32(1)), None);
    assert_eq!(linker.get_reference_value("Item", "id", "colour", &Value::Int32(1)), None);

    let loot = linker.get_schema("Loot").unwrap();
    let item_ref = loot.field("item").unwrap();
    assert_eq!(linker.reference_field(item_ref).unwrap().name, "id");
    assert_eq!(linker.reference_picked_field(item_ref).unwrap().name, "name");
}

#[test]
fn test_related_schemas_and_tables() {
    let linker = game_linker();
    let item = linker.get_schema("Item").unwrap();

    let related: Vec<&str> = linker.related_schemas(item).into_iter().map(|s| s.name.as_str()).collect();
    assert_eq!(related, vec!["Stats"]);

    let embedding: Vec<&str> = linker
        .related_partial_tables("Stats")
        .into_iter()
        .map(|t| t.name())
        .collect();
    assert_eq!(embedding, vec!["Items/Weapons", "Items/Armor"]);

    let looking_up: Vec<&str> = linker
        .related_partial_tables("Item")
        .into_iter()
        .map(|t| t.name())
        .collect();
    assert_eq!(looking_up, vec!["Loot"]);
}

#[test]
fn test_unique_values_hold_across_partials() {
    let schemas_only = Linker::from_definitions(game_definitions(), Vec::new()).unwrap();
    let item = schemas_only.flat_schema("Item").unwrap();

    let mut weapons = Table::new("Items/Weapons", item.clone());
    weapons.add_named_row(item_row(None, "Sword")).unwrap();
    let mut armor = Table::new("Items/Armor", item);
    armor.add_named_row(item_row(Some(50), "SWORD")).unwrap();

    let err = Linker::from_definitions(game_definitions(), vec![weapons, armor]).unwrap_err();
    assert!(matches!(
        err,
        LinkError::Table(TableError::UniqueViolation { ref column, .. }) if column == "name"
    ));
}

#[test]
fn test_construction_errors() {
    init_test_logging();

    let err = Linker::new(Vec::new(), vec![color_table("Color", &[1]), color_table("COLOR", &[2])]).unwrap_err();
    assert!(matches!(err, LinkError::DuplicateTable(_)));

    // A table whose schema was never registered brings its own.
    let linker = Linker::new(Vec::new(), vec![color_table("Legacy", &[1])]).unwrap();
    assert!(linker.has_schema("Color"));
    assert_eq!(linker.get_merged_table("Color").unwrap().row_count(), 1);

    assert!(matches!(linker.flat_schema("Ghost"), Err(LinkError::UnknownSchema(_))));
}

#[test]
fn test_incompatible_partial_is_rejected() {
    let schemas_only = Linker::from_definitions(game_definitions(), Vec::new()).unwrap();
    let stats = schemas_only.get_schema("Stats").unwrap().clone();

    // A table claiming the Item schema with the wrong shape.
    let mut wrong = stats;
    wrong.name = "Item".to_string();
    let table = Table::new("Items/Broken", FlatSchema::new(wrong).unwrap());

    let err = Linker::from_definitions(game_definitions(), vec![table]).unwrap_err();
    assert!(matches!(err, LinkError::IncompatibleSchema(ref name) if name == "Item"));
}
