//! Per-column bookkeeping for the row store: the comparison key used by
//! uniqueness checks and first-match lookups, and the auto-increment counter.

use std::collections::HashSet;

use crate::constants::DEFAULT_AUTO_INCREMENT_SEED;
use crate::schema::types::{Field, Value};

/// Hashable comparison form of a stored value.
///
/// Strings compare without regard to case. Reals compare by bit pattern with
/// negative zero folded onto zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CellKey {
    Bool(bool),
    Int(i64),
    Real(u64),
    Text(String),
}

impl CellKey {
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Bool(b) => CellKey::Bool(*b),
            Value::String(s) => CellKey::Text(s.to_lowercase()),
            Value::Real32(v) => CellKey::real(*v as f64),
            Value::Real64(v) => CellKey::real(*v),
            other => CellKey::Int(other.as_i64().unwrap_or_default()),
        }
    }

    fn real(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        CellKey::Real(v.to_bits())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ColumnState {
    unique: Option<HashSet<CellKey>>,
    seed: Option<i64>,
    next_auto: Option<i64>,
}

impl ColumnState {
    pub(crate) fn for_field(field: &Field) -> Self {
        let seed = field
            .auto_increment
            .then(|| field.auto_increment_seed.unwrap_or(DEFAULT_AUTO_INCREMENT_SEED));
        Self {
            unique: field.unique.then(HashSet::new),
            seed,
            next_auto: seed,
        }
    }

    pub(crate) fn next_auto(&self) -> Option<i64> {
        self.next_auto
    }

    pub(crate) fn set_next_auto(&mut self, next: Option<i64>) {
        if self.seed.is_some() {
            self.next_auto = next;
        }
    }

    /// Counter value after storing `value` in this column.
    pub(crate) fn advanced_past(&self, value: &Value) -> Option<i64> {
        let next = self.next_auto?;
        Some(match value.as_i64() {
            Some(v) => next.max(v.saturating_add(1)),
            None => next,
        })
    }

    pub(crate) fn contains(&self, value: &Value) -> bool {
        self.unique
            .as_ref()
            .is_some_and(|keys| keys.contains(&CellKey::of(value)))
    }

    pub(crate) fn insert(&mut self, value: &Value) {
        if let Some(keys) = self.unique.as_mut() {
            keys.insert(CellKey::of(value));
        }
    }

    pub(crate) fn remove(&mut self, value: &Value) {
        if let Some(keys) = self.unique.as_mut() {
            keys.remove(&CellKey::of(value));
        }
    }

    pub(crate) fn reset(&mut self) {
        if let Some(keys) = self.unique.as_mut() {
            keys.clear();
        }
        self.next_auto = self.seed;
    }
}
