//! Type grammar of the definition language
//!
//! A field type is one of:
//!
//! - a scalar keyword: `int8`, `int16`, `int32`, `int64`, `float`, `double`,
//!   `real32`, `real64`, `bool`, `string`
//! - `list<ElementType, N>` with a fixed arity `N`
//! - `Table.keyField.$pickedField`, an explicit lookup
//! - a bare identifier naming a schema or enum, resolved later by weaving
//!
//! Whatever follows the type is handed back to the caller, which reads an
//! optional default literal and a `//` description from it.

use regex::{Captures, Regex};

use super::errors::DefinitionError;
use crate::schema::types::{Field, FieldKind, LookupTarget};

/// Compiles a pattern, reporting failures as a definition error.
pub fn compile_with_context(pattern: &str, context: &str) -> Result<Regex, DefinitionError> {
    Regex::new(pattern).map_err(|e| DefinitionError::Regex {
        context: context.to_string(),
        message: format!("{} - Pattern: {}", e, pattern),
    })
}

/// Text of a capture group, empty when the group did not take part.
pub(crate) fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map_or("", |m| m.as_str())
}

/// Parsed `enum <Name>[: <kind>][ // description]` header.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumHeader {
    pub name: String,
    pub kind: Option<String>,
    pub description: Option<String>,
}

/// Parsed `<NAME>[ = <integer>][ // comment]` enum row.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumRow {
    pub name: String,
    pub value: Option<i64>,
    pub comment: String,
}

pub struct TypeGrammar {
    lookup: Regex,
    scalar: Regex,
    list_open: Regex,
    list_close: Regex,
    identifier: Regex,
    name: Regex,
    partial_name: Regex,
    enum_header: Regex,
    enum_row: Regex,
}

impl TypeGrammar {
    pub fn new() -> Result<Self, DefinitionError> {
        Ok(Self {
            lookup: compile_with_context(
                r"^([A-Za-z]\w*)\.([A-Za-z]\w*)\.\$([A-Za-z]\w*)",
                "lookup type pattern",
            )?,
            scalar: compile_with_context(
                r"^(int8|int16|int32|int64|float|double|real32|real64|bool|string)\b",
                "scalar type pattern",
            )?,
            list_open: compile_with_context(r"^list\s*<\s*", "list type pattern")?,
            list_close: compile_with_context(r"^\s*,\s*(\d+)\s*>", "list arity pattern")?,
            identifier: compile_with_context(r"^[A-Za-z]\w*", "type identifier pattern")?,
            name: compile_with_context(r"^[A-Za-z]\w*$", "name pattern")?,
            partial_name: compile_with_context(r"^[A-Za-z][\w\s/]*$", "partial name pattern")?,
            enum_header: compile_with_context(
                r"^enum\s+([^\s:/]+)(?:\s*:\s*(\w+))?\s*(?://\s*(.*))?$",
                "enum header pattern",
            )?,
            enum_row: compile_with_context(
                r"^([A-Za-z_]\w*)(?:\s*=\s*(-?\d+))?\s*(?://\s*(.*))?$",
                "enum row pattern",
            )?,
        })
    }

    /// Checks a schema, field or enum name.
    pub fn check_name(&self, name: &str, role: &'static str) -> Result<(), DefinitionError> {
        if self.name.is_match(name) {
            Ok(())
        } else {
            Err(DefinitionError::disallowed(name, role))
        }
    }

    pub fn check_partial_name(&self, name: &str) -> Result<(), DefinitionError> {
        if self.partial_name.is_match(name) {
            Ok(())
        } else {
            Err(DefinitionError::disallowed(name, "partial name"))
        }
    }

    /// Builds a field named `name` from the type expression at the start of
    /// `text` and returns it with the unconsumed remainder.
    pub fn build_field_type<'t>(
        &self,
        name: &str,
        text: &'t str,
    ) -> Result<(Field, &'t str), DefinitionError> {
        let text = text.trim_start();
        let invalid = || DefinitionError::InvalidType {
            field: name.to_string(),
            text: text.to_string(),
        };

        if let Some(caps) = self.lookup.captures(text) {
            let target = LookupTarget::new(group(&caps, 1), group(&caps, 2), group(&caps, 3));
            let end = caps.get(0).map_or(0, |m| m.end());
            return Ok((Field::lookup(name, target), &text[end..]));
        }

        if let Some(m) = self.scalar.find(text) {
            let kind = FieldKind::from_keyword(m.as_str()).ok_or_else(invalid)?;
            let mut field = Field::new(name, kind);
            field.type_name = m.as_str().to_string();
            return Ok((field, &text[m.end()..]));
        }

        if let Some(open) = self.list_open.find(text) {
            let (element, rest) = self.build_field_type("", &text[open.end()..])?;
            let close = self.list_close.captures(rest).ok_or_else(invalid)?;
            let count: usize = group(&close, 1).parse().map_err(|_| invalid())?;
            if count == 0 {
                return Err(invalid());
            }

            let close_end = close.get(0).map_or(0, |m| m.end());
            let consumed = text.len() - rest.len() + close_end;
            let mut field = Field::list(name, element, count);
            field.type_name = text[..consumed].to_string();
            return Ok((field, &rest[close_end..]));
        }

        if let Some(m) = self.identifier.find(text) {
            return Ok((Field::unresolved(name, m.as_str()), &text[m.end()..]));
        }

        Err(invalid())
    }

    pub fn parse_enum_header(&self, header: &str) -> Result<EnumHeader, DefinitionError> {
        let header = header.trim();
        let caps = self
            .enum_header
            .captures(header)
            .ok_or_else(|| DefinitionError::InvalidEnumHeader(header.to_string()))?;

        let name = group(&caps, 1).to_string();
        self.check_name(&name, "enum name")?;

        Ok(EnumHeader {
            name,
            kind: caps.get(2).map(|m| m.as_str().to_string()),
            description: caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }

    pub fn parse_enum_row(&self, enum_name: &str, row: &str) -> Result<EnumRow, DefinitionError> {
        let row = row.trim();
        let invalid = || DefinitionError::InvalidEnumRow {
            name: enum_name.to_string(),
            row: row.to_string(),
        };
        let caps = self.enum_row.captures(row).ok_or_else(invalid)?;

        let value = match caps.get(2) {
            Some(m) => Some(m.as_str().parse::<i64>().map_err(|_| invalid())?),
            None => None,
        };

        Ok(EnumRow {
            name: group(&caps, 1).to_string(),
            value,
            comment: group(&caps, 3).trim().to_string(),
        })
    }
}

/// Splits the text after a type into an optional default literal and an
/// optional `//` description.
pub fn split_default_and_description(rest: &str) -> (Option<String>, Option<String>) {
    let (default, description) = match rest.find("//") {
        Some(pos) => (&rest[..pos], Some(rest[pos + 2..].trim())),
        None => (rest, None),
    };

    let default = default.trim();
    let default = (!default.is_empty()).then(|| unquote(default).to_string());
    let description = description.filter(|d| !d.is_empty()).map(str::to_string);
    (default, description)
}

/// Strips a single pair of matching quotes around `text`.
pub fn unquote(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
