//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Once;

use schemaweave::{Cell, DefinitionFile, Field, FieldKind, FlatSchema, Schema, Table, Value};

static INIT: Once = Once::new();

/// Routes `log` output through the test harness once per binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// A small game data model exercising enums, embedding, lists, lookups and
/// partial tables.
pub const GAME_DEFINITIONS: &str = r#"
[
    // Item rarities
    { "enum Rarity // how hard an item is to find": [
        "COMMON",
        "RARE = 10 // shiny",
        "EPIC"
    ] },
    {
        "name": "Item",
        "desc": "inventory items",
        "partials": ["Items/Weapons", "Items/Armor"],
        "fields": {
            "id": { "type": "int32", "unique": true, "auto_increment": true },
            "name": { "type": "string", "unique": true },
            "rarity": "Rarity COMMON",
            "stats": "Stats",
            "tags": "list<string, 2>"
        }
    },
    {
        "name": "Stats",
        "embed": true,
        "fields": {
            "atk": "int16 0 // attack",
            "def": "int16 0"
        }
    },
    {
        "name": "Loot",
        "fields": {
            "item": "Item.id.$name",
            "chance": "real32 0.5 // drop chance"
        }
    }
]
"#;

pub fn game_definitions() -> DefinitionFile {
    init_test_logging();
    DefinitionFile::parse(GAME_DEFINITIONS).expect("game definitions should parse")
}

pub fn color_schema() -> Schema {
    Schema::with_fields("Color", [Field::new("code", FieldKind::Int32)]).expect("valid schema")
}

/// A `Color` table holding one row per code.
pub fn color_table(name: &str, codes: &[i32]) -> Table {
    let flat = FlatSchema::new(color_schema()).expect("color schema is flat");
    let mut table = Table::new(name, flat);
    for &code in codes {
        table
            .add_row([Some(Value::Int32(code))])
            .expect("row should be accepted");
    }
    table
}

pub fn cells<const N: usize>(values: [Value; N]) -> Vec<Cell> {
    values.into_iter().map(Some).collect()
}
