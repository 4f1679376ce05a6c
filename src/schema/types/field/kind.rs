use std::fmt;

/// The closed set of field kinds.
///
/// `Unresolved` marks a field whose type names a schema or enum that has not
/// been woven yet. It never reaches a flat schema or a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Real32,
    Real64,
    String,
    /// Fixed-arity list of an element template
    List,
    /// Inlined fields of another schema
    Embedded,
    /// Key into another table whose storage kind is not known yet
    Lookup,
    /// Forward reference awaiting weaving
    Unresolved,
}

impl FieldKind {
    /// Maps a type keyword of the definition grammar to its kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "bool" => Some(FieldKind::Bool),
            "int8" => Some(FieldKind::Int8),
            "int16" => Some(FieldKind::Int16),
            "int32" => Some(FieldKind::Int32),
            "int64" => Some(FieldKind::Int64),
            "float" | "real32" => Some(FieldKind::Real32),
            "double" | "real64" => Some(FieldKind::Real64),
            "string" => Some(FieldKind::String),
            _ => None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Real32 => "real32",
            FieldKind::Real64 => "real64",
            FieldKind::String => "string",
            FieldKind::List => "list",
            FieldKind::Embedded => "embedded",
            FieldKind::Lookup => "lookup",
            FieldKind::Unresolved => "unresolved",
        }
    }

    /// Returns true for kinds that hold a single value in a table cell.
    pub fn is_scalar(self) -> bool {
        matches!(self, FieldKind::Bool | FieldKind::String) || self.is_integer() || self.is_real()
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            FieldKind::Int8 | FieldKind::Int16 | FieldKind::Int32 | FieldKind::Int64
        )
    }

    pub fn is_real(self) -> bool {
        matches!(self, FieldKind::Real32 | FieldKind::Real64)
    }

    /// Returns true while the kind still waits for weaving or linking.
    pub fn is_pending(self) -> bool {
        matches!(self, FieldKind::Unresolved | FieldKind::Lookup)
    }

    /// Largest value representable by an integer kind.
    pub fn integer_max(self) -> Option<i64> {
        match self {
            FieldKind::Int8 => Some(i8::MAX as i64),
            FieldKind::Int16 => Some(i16::MAX as i64),
            FieldKind::Int32 => Some(i32::MAX as i64),
            FieldKind::Int64 => Some(i64::MAX),
            _ => None,
        }
    }

    /// Smallest integer kind able to hold `max`.
    pub fn smallest_integer_for(max: i64) -> Self {
        [FieldKind::Int8, FieldKind::Int16, FieldKind::Int32]
            .into_iter()
            .find(|kind| kind.integer_max().is_some_and(|limit| max <= limit))
            .unwrap_or(FieldKind::Int64)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
