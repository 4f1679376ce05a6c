//! Typed row store
//!
//! A `Table` holds rows aligned one-to-one with the fields of a flat schema.
//! Every stored cell is either null or a value of its column's kind;
//! coercion happens on insert. Unique and auto-increment columns are
//! enforced by the store.

pub mod errors;
pub(crate) mod index;

pub use errors::TableError;

use log::debug;

use crate::schema::types::{Cell, Field, FlatSchema, Value};
use index::{CellKey, ColumnState};

/// One stored row, aligned with the schema's fields.
pub type Row = Vec<Cell>;

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    schema: FlatSchema,
    rows: Vec<Row>,
    columns: Vec<ColumnState>,
}

/// Row count and counters to restore when a batch fails.
struct Snapshot {
    row_count: usize,
    counters: Vec<Option<i64>>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: FlatSchema) -> Self {
        let columns = schema.fields().iter().map(ColumnState::for_field).collect();
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &FlatSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// All rows in insertion order. The iterator can be cloned to restart.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> + Clone {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.schema.field_index(field)
    }

    /// The value at `row` in the named column; `None` for nulls and misses.
    pub fn cell(&self, row: usize, field: &str) -> Option<&Value> {
        let column = self.column_index(field)?;
        self.rows.get(row)?.get(column)?.as_ref()
    }

    /// Appends one positional row. Input beyond the schema width is ignored
    /// and missing trailing cells count as null.
    pub fn add_row<R>(&mut self, cells: R) -> Result<(), TableError>
    where
        R: IntoIterator<Item = Cell>,
    {
        let (row, counters) = self.prepare_row(cells)?;
        self.commit_row(row, counters);
        Ok(())
    }

    /// Appends one row keyed by field name. Unknown names are dropped and
    /// unnamed columns start out null.
    pub fn add_named_row<S, R>(&mut self, cells: R) -> Result<(), TableError>
    where
        S: AsRef<str>,
        R: IntoIterator<Item = (S, Cell)>,
    {
        let row = self.align_by_name(cells);
        self.add_row(row)
    }

    /// Appends a batch of positional rows. Either all rows are stored or,
    /// on the first failure, none of them are.
    pub fn add_rows<I, R>(&mut self, rows: I) -> Result<usize, TableError>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Cell>,
    {
        let snapshot = self.snapshot();
        let mut added = 0;
        for row in rows {
            if let Err(err) = self.add_row(row) {
                self.rollback(snapshot);
                return Err(err);
            }
            added += 1;
        }
        Ok(added)
    }

    /// Name-keyed variant of [`Table::add_rows`].
    pub fn add_named_rows<I, S, R>(&mut self, rows: I) -> Result<usize, TableError>
    where
        I: IntoIterator<Item = R>,
        S: AsRef<str>,
        R: IntoIterator<Item = (S, Cell)>,
    {
        let aligned: Vec<Row> = rows.into_iter().map(|r| self.align_by_name(r)).collect();
        self.add_rows(aligned)
    }

    /// First row, in insertion order, whose `field` column equals `value`
    /// once `value` is coerced to the column's kind.
    ///
    /// Unknown fields and values that do not coerce find nothing.
    pub fn find_first_row(&self, field: &str, value: &Value) -> Option<&[Cell]> {
        let column = self.column_index(field)?;
        let kind = self.schema.field_at(column)?.kind();
        let wanted = CellKey::of(&value.coerce(kind).ok()?);

        self.rows()
            .find(|row| row[column].as_ref().is_some_and(|v| CellKey::of(v) == wanted))
    }

    pub fn is_compatible_with(&self, other: &Table) -> bool {
        self.schema.is_compatible_with(&other.schema)
    }

    /// Appends every row of `other`, which must have a compatible schema.
    pub fn merge(&mut self, other: &Table) -> Result<(), TableError> {
        if !self.is_compatible_with(other) {
            return Err(TableError::Incompatible {
                table: self.name.clone(),
                other: other.name.clone(),
            });
        }

        let added = self.add_rows(other.rows.iter().cloned())?;
        debug!("Merged {} row(s) from '{}' into '{}'", added, other.name, self.name);
        Ok(())
    }

    /// Removes all rows and resets unique indices and counters.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
        self.columns.iter_mut().for_each(ColumnState::reset);
    }

    fn align_by_name<S, R>(&self, cells: R) -> Row
    where
        S: AsRef<str>,
        R: IntoIterator<Item = (S, Cell)>,
    {
        let mut row = vec![None; self.schema.field_count()];
        for (name, cell) in cells {
            if let Some(column) = self.column_index(name.as_ref()) {
                row[column] = cell;
            }
        }
        row
    }

    fn prepare_row<R>(&self, cells: R) -> Result<(Row, Vec<Option<i64>>), TableError>
    where
        R: IntoIterator<Item = Cell>,
    {
        let width = self.schema.field_count();
        let mut input = cells.into_iter();
        let mut row = Vec::with_capacity(width);
        let mut counters = Vec::with_capacity(width);

        for (field, state) in self.schema.fields().iter().zip(&self.columns) {
            let cell = self.prepare_cell(field, state, input.next().flatten())?;
            let counter = match &cell {
                Some(value) => state.advanced_past(value),
                None => state.next_auto(),
            };
            counters.push(counter);
            row.push(cell);
        }

        Ok((row, counters))
    }

    fn prepare_cell(&self, field: &Field, state: &ColumnState, input: Cell) -> Result<Cell, TableError> {
        let value = input
            .or_else(|| state.next_auto().map(Value::Int64))
            .or_else(|| field.null_default().cloned());

        let Some(value) = value else {
            if field.nullable {
                return Ok(None);
            }
            return Err(TableError::NullNotAllowed {
                table: self.name.clone(),
                column: field.name.clone(),
            });
        };

        let value = value.coerce(field.kind()).map_err(|source| TableError::Coercion {
            table: self.name.clone(),
            column: field.name.clone(),
            source,
        })?;

        if state.contains(&value) {
            return Err(TableError::UniqueViolation {
                table: self.name.clone(),
                column: field.name.clone(),
                value: value.to_string(),
            });
        }

        Ok(Some(value))
    }

    fn commit_row(&mut self, row: Row, counters: Vec<Option<i64>>) {
        for ((state, cell), counter) in self.columns.iter_mut().zip(&row).zip(counters) {
            if let Some(value) = cell {
                state.insert(value);
            }
            state.set_next_auto(counter);
        }
        self.rows.push(row);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            row_count: self.rows.len(),
            counters: self.columns.iter().map(ColumnState::next_auto).collect(),
        }
    }

    fn rollback(&mut self, snapshot: Snapshot) {
        let discarded = self.rows.len().saturating_sub(snapshot.row_count);
        for row in self.rows.drain(snapshot.row_count..) {
            for (state, cell) in self.columns.iter_mut().zip(&row) {
                if let Some(value) = cell {
                    state.remove(value);
                }
            }
        }
        for (state, counter) in self.columns.iter_mut().zip(snapshot.counters) {
            state.set_next_auto(counter);
        }
        debug!("Rolled back {} row(s) in table '{}'", discarded, self.name);
    }
}
