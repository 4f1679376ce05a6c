//! Field definitions
//!
//! A `Field` describes one typed attribute of a schema: a scalar, a
//! fixed-arity list of an element template, an embedded schema or a lookup
//! into another table.

pub mod kind;
pub mod names;

pub use kind::FieldKind;
pub use names::{name_key, NameSet};

use super::errors::ValueError;
use super::value::Value;

/// Identity of the row a lookup field points at.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTarget {
    /// Table (or schema) holding the referenced rows
    pub table: String,
    /// Field of the target table matched against the stored cell
    pub key_field: String,
    /// Field of the matched row the lookup yields
    pub picked_field: String,
    /// Kind of the picked field, once known
    pub picked_kind: Option<FieldKind>,
}

impl LookupTarget {
    pub fn new(
        table: impl Into<String>,
        key_field: impl Into<String>,
        picked_field: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            key_field: key_field.into(),
            picked_field: picked_field.into(),
            picked_kind: None,
        }
    }

    /// Returns true when both lookups address the same table, key and picked field.
    pub fn same_target(&self, other: &LookupTarget) -> bool {
        name_key(&self.table) == name_key(&other.table)
            && name_key(&self.key_field) == name_key(&other.key_field)
            && name_key(&self.picked_field) == name_key(&other.picked_field)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    /// Type text as written in the definition, kept for diagnostics and weaving
    pub type_name: String,
    pub description: String,
    pub nullable: bool,
    pub auto_increment: bool,
    pub auto_increment_seed: Option<i64>,
    pub unique: bool,
    pub non_serialized: bool,
    pub groups: NameSet,
    pub disable_tags: NameSet,
    pub composite_keys: NameSet,
    kind: FieldKind,
    null_default: Option<Value>,
    element_template: Option<Box<Field>>,
    element_count: usize,
    target_schema: Option<String>,
    lookup: Option<LookupTarget>,
}

impl Field {
    /// Creates a field of the given kind with no type-specific targets.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            type_name: kind.type_name().to_string(),
            description: String::new(),
            nullable: false,
            auto_increment: false,
            auto_increment_seed: None,
            unique: false,
            non_serialized: false,
            groups: NameSet::new(),
            disable_tags: NameSet::new(),
            composite_keys: NameSet::new(),
            kind,
            null_default: None,
            element_template: None,
            element_count: 0,
            target_schema: None,
            lookup: None,
        }
    }

    /// A fixed-arity list of `count` elements shaped like `element`.
    pub fn list(name: impl Into<String>, element: Field, count: usize) -> Self {
        let mut field = Self::new(name, FieldKind::List);
        field.element_template = Some(Box::new(element));
        field.element_count = count;
        field
    }

    /// A field that inlines the fields of `schema`.
    pub fn embedded(name: impl Into<String>, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        let mut field = Self::new(name, FieldKind::Embedded);
        field.type_name = schema.clone();
        field.target_schema = Some(schema);
        field
    }

    /// A lookup whose storage kind is resolved later from its key field.
    pub fn lookup(name: impl Into<String>, target: LookupTarget) -> Self {
        let mut field = Self::new(name, FieldKind::Lookup);
        field.type_name = format!(
            "{}.{}.${}",
            target.table, target.key_field, target.picked_field
        );
        field.lookup = Some(target);
        field
    }

    /// A forward reference to a schema or enum named `candidate`.
    pub fn unresolved(name: impl Into<String>, candidate: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldKind::Unresolved);
        field.type_name = candidate.into();
        field
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn with_auto_increment(mut self, seed: i64) -> Self {
        self.auto_increment = true;
        self.auto_increment_seed = Some(seed);
        self
    }

    pub fn with_default(mut self, value: Value) -> Result<Self, ValueError> {
        self.set_null_default(Some(value))?;
        Ok(self)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn null_default(&self) -> Option<&Value> {
        self.null_default.as_ref()
    }

    pub fn element_template(&self) -> Option<&Field> {
        self.element_template.as_deref()
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Repeats the element template `element_count` times for list fields.
    pub fn elements(&self) -> impl Iterator<Item = &Field> {
        let count = if self.kind == FieldKind::List {
            self.element_count
        } else {
            0
        };
        self.element_template.iter().flat_map(move |e| std::iter::repeat(e.as_ref()).take(count))
    }

    pub fn target_schema(&self) -> Option<&str> {
        self.target_schema.as_deref()
    }

    pub fn lookup_target(&self) -> Option<&LookupTarget> {
        self.lookup.as_ref()
    }

    pub fn is_scalar(&self) -> bool {
        self.kind.is_scalar()
    }

    /// Scalar storage kind, and if the field is a lookup, a scalar picked kind.
    pub fn is_flat(&self) -> bool {
        self.kind.is_scalar()
            && self
                .lookup
                .as_ref()
                .and_then(|l| l.picked_kind)
                .map_or(true, FieldKind::is_scalar)
    }

    /// True if this field or any nested element still waits for weaving or linking.
    pub fn is_pending(&self) -> bool {
        self.kind.is_pending() || self.element_template().is_some_and(Field::is_pending)
    }

    /// True if this field or any nested element is an unresolved forward reference.
    pub fn is_unresolved(&self) -> bool {
        self.kind == FieldKind::Unresolved
            || self.element_template().is_some_and(Field::is_unresolved)
    }

    /// Sets the value used when a null is stored in this field.
    ///
    /// Scalars coerce the value to their kind. Lists keep it and propagate
    /// it to their element template. Embedded fields never carry a default.
    /// Pending fields keep the raw value until their kind is known.
    pub fn set_null_default(&mut self, value: Option<Value>) -> Result<(), ValueError> {
        let Some(value) = value else {
            self.null_default = None;
            if let Some(element) = self.element_template.as_mut() {
                element.set_null_default(None)?;
            }
            return Ok(());
        };

        match self.kind {
            kind if kind.is_scalar() => {
                self.null_default = Some(value.coerce(kind)?);
            }
            FieldKind::List => {
                if let Some(element) = self.element_template.as_mut() {
                    element.set_null_default(Some(value.clone()))?;
                }
                self.null_default = Some(value);
            }
            FieldKind::Embedded => self.null_default = None,
            _ => self.null_default = Some(value),
        }
        Ok(())
    }

    /// Replaces the element template, handing it this list's default.
    pub fn set_element_template(&mut self, element: Field) -> Result<(), ValueError> {
        let mut element = element;
        if self.null_default.is_some() {
            element.set_null_default(self.null_default.clone())?;
        }
        self.element_template = Some(Box::new(element));
        Ok(())
    }

    /// Turns a forward reference into an embedded schema field.
    pub(crate) fn resolve_embedded(&mut self, schema: &str) {
        self.kind = FieldKind::Embedded;
        self.target_schema = Some(schema.to_string());
        self.null_default = None;
    }

    /// Settles the storage kind of a lookup to its key field's kind.
    pub(crate) fn resolve_lookup(
        &mut self,
        target: LookupTarget,
        key_kind: FieldKind,
    ) -> Result<(), ValueError> {
        let default = self.null_default.take();
        self.kind = key_kind;
        self.lookup = Some(target);
        self.set_null_default(default)
    }

    /// Clone under a new name.
    pub fn renamed(&self, name: impl Into<String>) -> Field {
        let mut field = self.clone();
        field.name = name.into();
        field
    }

    /// Forces the field nullable and drops its default.
    pub fn make_optional(&mut self) {
        self.nullable = true;
        self.null_default = None;
        if let Some(element) = self.element_template.as_mut() {
            element.make_optional();
        }
    }

    /// Returns true when both fields point at the same schema or lookup row.
    pub fn same_reference_target(&self, other: &Field) -> bool {
        match (&self.target_schema, &other.target_schema) {
            (Some(a), Some(b)) if self.kind == FieldKind::Embedded => name_key(a) == name_key(b),
            _ => match (&self.lookup, &other.lookup) {
                (Some(a), Some(b)) => a.same_target(b),
                (None, None) => true,
                _ => false,
            },
        }
    }

    /// Structural compatibility: kind, targets, list shape, flags and tag sets.
    /// Names and descriptions do not take part.
    pub fn is_compatible_with(&self, other: &Field) -> bool {
        if self.kind != other.kind {
            return false;
        }

        match self.kind {
            FieldKind::Embedded | FieldKind::Lookup => {
                if !self.same_reference_target(other) {
                    return false;
                }
            }
            FieldKind::List => {
                let (Some(mine), Some(theirs)) = (self.element_template(), other.element_template())
                else {
                    return false;
                };
                if self.element_count != other.element_count || !mine.is_compatible_with(theirs) {
                    return false;
                }
            }
            _ => {
                if self.lookup.is_some() != other.lookup.is_some() || !self.same_reference_target(other) {
                    return false;
                }
            }
        }

        self.auto_increment == other.auto_increment
            && self.unique == other.unique
            && self.non_serialized == other.non_serialized
            && self.nullable == other.nullable
            && self.groups == other.groups
            && self.disable_tags == other.disable_tags
            && self.composite_keys == other.composite_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_default_is_coerced() {
        let mut field = Field::new("hp", FieldKind::Int16);
        field.set_null_default(Some(Value::from("12"))).unwrap();
        assert_eq!(field.null_default(), Some(&Value::Int16(12)));
        assert!(field.set_null_default(Some(Value::from("twelve"))).is_err());
    }

    #[test]
    fn test_list_default_propagates_to_template() {
        let mut field = Field::list("vals", Field::new("", FieldKind::Int32), 3);
        field.set_null_default(Some(Value::from("7"))).unwrap();
        assert_eq!(
            field.element_template().unwrap().null_default(),
            Some(&Value::Int32(7))
        );
        assert_eq!(field.elements().count(), 3);
    }

    #[test]
    fn test_deep_clone_owns_template() {
        let original = Field::list("vals", Field::new("", FieldKind::Int32), 2);
        let mut copy = original.clone();
        copy.set_element_template(Field::new("", FieldKind::String)).unwrap();
        assert_eq!(original.element_template().unwrap().kind(), FieldKind::Int32);
        assert_eq!(copy.element_template().unwrap().kind(), FieldKind::String);
    }

    #[test]
    fn test_compatibility_ignores_description_and_group_order() {
        let mut a = Field::new("a", FieldKind::Int32).with_description("one");
        let mut b = Field::new("b", FieldKind::Int32).with_description("two");
        a.groups.insert("x");
        a.groups.insert("y");
        b.groups.insert("Y");
        b.groups.insert("x");
        assert!(a.is_compatible_with(&b));

        b.nullable = true;
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_embedded_compatibility_checks_target() {
        let a = Field::embedded("a", "Address");
        let b = Field::embedded("a", "address");
        let c = Field::embedded("a", "Point");
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
    }

    #[test]
    fn test_list_compatibility_checks_arity() {
        let a = Field::list("v", Field::new("", FieldKind::Int8), 2);
        let b = Field::list("v", Field::new("", FieldKind::Int8), 3);
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_resolve_lookup_recoerces_default() {
        let mut field = Field::lookup("item", LookupTarget::new("Items", "id", "name"));
        field.set_null_default(Some(Value::from("3"))).unwrap();
        assert_eq!(field.null_default(), Some(&Value::from("3")));

        field.resolve_lookup(LookupTarget::new("Items", "id", "name"), FieldKind::Int32).unwrap();
        assert_eq!(field.kind(), FieldKind::Int32);
        assert_eq!(field.null_default(), Some(&Value::Int32(3)));
        assert!(field.is_flat());
    }

    #[test]
    fn test_pending_detection_recurses() {
        let field = Field::list("v", Field::unresolved("", "Color"), 2);
        assert!(field.is_pending());
        assert!(field.is_unresolved());
        assert!(!Field::new("x", FieldKind::Bool).is_pending());
    }
}
