//! Scalar cell values
//!
//! This module provides the `Value` enum stored in table cells, together with
//! the conversions between field kinds and to and from JSON for the
//! converters that move rows in and out of JSON documents.

use std::fmt;

use super::errors::ValueError;
use super::field::FieldKind;

/// A scalar value held by a table cell or used as a field default.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Real32(f32),
    Real64(f64),
    String(String),
}

/// A table cell; `None` is null.
pub type Cell = Option<Value>;

impl Value {
    /// Get the kind this value is stored as
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Bool(_) => FieldKind::Bool,
            Value::Int8(_) => FieldKind::Int8,
            Value::Int16(_) => FieldKind::Int16,
            Value::Int32(_) => FieldKind::Int32,
            Value::Int64(_) => FieldKind::Int64,
            Value::Real32(_) => FieldKind::Real32,
            Value::Real64(_) => FieldKind::Real64,
            Value::String(_) => FieldKind::String,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widens any integer value to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widens any numeric value to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real32(v) => Some(*v as f64),
            Value::Real64(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts this value to the given scalar kind.
    ///
    /// Integers are range checked, reals are rounded half to even when they
    /// land in an integer kind, strings are parsed, booleans map to 1/0 and
    /// every value has a string form.
    pub fn coerce(&self, kind: FieldKind) -> Result<Value, ValueError> {
        if !kind.is_scalar() {
            return Err(ValueError::NonScalar(kind));
        }
        if self.kind() == kind {
            return Ok(self.clone());
        }

        match kind {
            FieldKind::String => Ok(Value::String(self.to_string())),
            FieldKind::Bool => self.to_bool(),
            FieldKind::Real32 => {
                let v = self.to_f64(kind)?;
                if v.is_finite() && v.abs() > f32::MAX as f64 {
                    return Err(ValueError::out_of_range(v, kind));
                }
                Ok(Value::Real32(v as f32))
            }
            FieldKind::Real64 => Ok(Value::Real64(self.to_f64(kind)?)),
            _ => {
                let v = self.to_i64(kind)?;
                integer_of_kind(v, kind)
            }
        }
    }

    /// Converts a JSON scalar to a cell. Null maps to `None`.
    pub fn from_json(json: &serde_json::Value) -> Result<Cell, ValueError> {
        match json {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Bool(b) => Ok(Some(Value::Bool(*b))),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(Value::Int64(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Some(Value::Real64(f)))
                } else {
                    Err(ValueError::UnsupportedJson(n.to_string()))
                }
            }
            serde_json::Value::String(s) => Ok(Some(Value::String(s.clone()))),
            other => Err(ValueError::UnsupportedJson(other.to_string())),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Real32(v) => serde_json::Number::from_f64(*v as f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Real64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            other => other
                .as_i64()
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null),
        }
    }

    fn to_bool(&self) -> Result<Value, ValueError> {
        match self {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(ValueError::conversion(s, self.type_name(), FieldKind::Bool))
                }
            }
            other => match other.as_f64() {
                Some(v) => Ok(Value::Bool(v != 0.0)),
                None => Err(ValueError::conversion(other, other.type_name(), FieldKind::Bool)),
            },
        }
    }

    fn to_i64(&self, kind: FieldKind) -> Result<i64, ValueError> {
        match self {
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValueError::conversion(s, self.type_name(), kind)),
            Value::Real32(_) | Value::Real64(_) => {
                let v = self.as_f64().unwrap_or(f64::NAN);
                if !v.is_finite() {
                    return Err(ValueError::conversion(v, self.type_name(), kind));
                }
                let rounded = v.round_ties_even();
                if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                    return Err(ValueError::out_of_range(v, kind));
                }
                Ok(rounded as i64)
            }
            other => other
                .as_i64()
                .ok_or_else(|| ValueError::conversion(other, other.type_name(), kind)),
        }
    }

    fn to_f64(&self, kind: FieldKind) -> Result<f64, ValueError> {
        match self {
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValueError::conversion(s, self.type_name(), kind)),
            other => other
                .as_f64()
                .ok_or_else(|| ValueError::conversion(other, other.type_name(), kind)),
        }
    }
}

fn integer_of_kind(v: i64, kind: FieldKind) -> Result<Value, ValueError> {
    let out_of_range = || ValueError::out_of_range(v, kind);
    match kind {
        FieldKind::Int8 => i8::try_from(v).map(Value::Int8).map_err(|_| out_of_range()),
        FieldKind::Int16 => i16::try_from(v).map(Value::Int16).map_err(|_| out_of_range()),
        FieldKind::Int32 => i32::try_from(v).map(Value::Int32).map_err(|_| out_of_range()),
        FieldKind::Int64 => Ok(Value::Int64(v)),
        other => Err(ValueError::NonScalar(other)),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Real32(v) => write!(f, "{}", v),
            Value::Real64(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(Value::Int64(100).coerce(FieldKind::Int8), Ok(Value::Int8(100)));
        assert!(matches!(
            Value::Int64(200).coerce(FieldKind::Int8),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_string_parsing() {
        assert_eq!(Value::from(" 42 ").coerce(FieldKind::Int32), Ok(Value::Int32(42)));
        assert_eq!(Value::from("TRUE").coerce(FieldKind::Bool), Ok(Value::Bool(true)));
        assert_eq!(Value::from("1.5").coerce(FieldKind::Real64), Ok(Value::Real64(1.5)));
        assert!(Value::from("abc").coerce(FieldKind::Int16).is_err());
        assert!(Value::from("1.5").coerce(FieldKind::Int32).is_err());
    }

    #[test]
    fn test_real_rounding() {
        assert_eq!(Value::Real64(2.5).coerce(FieldKind::Int32), Ok(Value::Int32(2)));
        assert_eq!(Value::Real64(3.5).coerce(FieldKind::Int32), Ok(Value::Int32(4)));
        assert!(Value::Real64(f64::NAN).coerce(FieldKind::Int64).is_err());
    }

    #[test]
    fn test_to_string_and_bool() {
        assert_eq!(Value::Int32(7).coerce(FieldKind::String), Ok(Value::from("7")));
        assert_eq!(Value::Int8(0).coerce(FieldKind::Bool), Ok(Value::Bool(false)));
        assert_eq!(Value::Bool(true).coerce(FieldKind::Int16), Ok(Value::Int16(1)));
    }

    #[test]
    fn test_non_scalar_target() {
        assert_eq!(
            Value::Int32(1).coerce(FieldKind::List),
            Err(ValueError::NonScalar(FieldKind::List))
        );
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(Value::from_json(&serde_json::json!(3)), Ok(Some(Value::Int64(3))));
        assert_eq!(Value::from_json(&serde_json::json!(null)), Ok(None));
        assert!(Value::from_json(&serde_json::json!([1])).is_err());
        assert_eq!(Value::Int16(5).to_json(), serde_json::json!(5));
        assert_eq!(Value::from("x").to_json(), serde_json::json!("x"));
    }
}
