//! Dynamically typed property values.
//!
//! Property maps attach arbitrary JSON-representable data to nodes, edges
//! and graphs. [`PropValue`] is the common value type: a small enum that
//! serializes untagged, so the persisted form is plain JSON (`null`,
//! booleans, numbers, strings, arrays).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A property value attached to a node, edge or graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PropValue>),
}

impl PropValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Default for PropValue {
    fn default() -> Self {
        PropValue::Null
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => write!(f, "null"),
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Int(i) => write!(f, "{}", i),
            PropValue::Float(x) => write!(f, "{}", x),
            PropValue::Str(s) => write!(f, "{}", s),
            PropValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(value: Vec<PropValue>) -> Self {
        PropValue::List(value)
    }
}

impl From<(i64, i64)> for PropValue {
    fn from((a, b): (i64, i64)) -> Self {
        PropValue::List(vec![PropValue::Int(a), PropValue::Int(b)])
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => PropValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(PropValue::from(true), PropValue::Bool(true));
        assert_eq!(PropValue::from(5), PropValue::Int(5));
        assert_eq!(PropValue::from("up"), PropValue::Str("up".to_string()));
        assert_eq!(PropValue::from(None::<i64>), PropValue::Null);
    }

    #[test]
    fn test_untagged_json() {
        let json = serde_json::to_string(&PropValue::Int(42)).unwrap();
        assert_eq!(json, "42");

        let back: PropValue = serde_json::from_str("42").unwrap();
        assert_eq!(back, PropValue::Int(42));

        let back: PropValue = serde_json::from_str("null").unwrap();
        assert_eq!(back, PropValue::Null);

        let back: PropValue = serde_json::from_str(r#"[1, "a"]"#).unwrap();
        assert_eq!(
            back,
            PropValue::List(vec![PropValue::Int(1), PropValue::Str("a".to_string())])
        );
    }

    #[test]
    fn test_int_vs_float_round_trip() {
        let back: PropValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(back, PropValue::Float(2.5));

        let back: PropValue = serde_json::from_str("2").unwrap();
        assert_eq!(back, PropValue::Int(2));
    }
}
