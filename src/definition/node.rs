//! Order-preserving JSON tree for definition documents.
//!
//! `serde_json::Value` sorts object keys and collapses duplicates, but field
//! declaration order matters and a repeated field name must be reported, so
//! definitions are read into this tree instead.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

#[derive(Debug, Clone, PartialEq)]
pub enum DefNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<DefNode>),
    /// Entries in document order, duplicates kept
    Object(Vec<(String, DefNode)>),
}

impl DefNode {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Short name of the node shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DefNode::Null => "null",
            DefNode::Bool(_) => "boolean",
            DefNode::Number(_) => "number",
            DefNode::String(_) => "string",
            DefNode::Array(_) => "array",
            DefNode::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DefNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DefNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text form of a scalar node, as used for default literals.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            DefNode::String(s) => Some(s.clone()),
            DefNode::Number(n) => Some(n.to_string()),
            DefNode::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

struct DefNodeVisitor;

impl<'de> Visitor<'de> for DefNodeVisitor {
    type Value = DefNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON definition value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<DefNode, E> {
        Ok(DefNode::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<DefNode, E> {
        Ok(DefNode::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<DefNode, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<DefNode, E> {
        Ok(DefNode::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DefNode, E> {
        Ok(DefNode::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DefNode, E> {
        Ok(DefNode::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DefNode, E> {
        serde_json::Number::from_f64(v)
            .map(DefNode::Number)
            .ok_or_else(|| E::custom(format!("{} is not a valid JSON number", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DefNode, E> {
        Ok(DefNode::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<DefNode, E> {
        Ok(DefNode::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<DefNode, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DefNode::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<DefNode, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, DefNode>()? {
            entries.push((key, value));
        }
        Ok(DefNode::Object(entries))
    }
}

impl<'de> Deserialize<'de> for DefNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DefNodeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_keeps_order_and_duplicates() {
        let node = DefNode::parse(r#"{"z": 1, "a": "x", "z": true}"#).unwrap();
        let DefNode::Object(entries) = node else {
            panic!("expected object");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "z"]);
        assert_eq!(entries[2].1, DefNode::Bool(true));
    }

    #[test]
    fn test_scalar_text() {
        let node = DefNode::parse(r#"[3, 1.5, "x", false, null]"#).unwrap();
        let DefNode::Array(items) = node else {
            panic!("expected array");
        };
        let texts: Vec<_> = items.iter().map(DefNode::scalar_text).collect();
        assert_eq!(
            texts,
            vec![
                Some("3".to_string()),
                Some("1.5".to_string()),
                Some("x".to_string()),
                Some("false".to_string()),
                None
            ]
        );
    }

    #[test]
    fn test_syntax_error_surfaces() {
        assert!(DefNode::parse(r#"{"name": }"#).is_err());
    }
}
