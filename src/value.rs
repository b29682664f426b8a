//! Dynamically-typed value trees for building render contexts.
//!
//! Foreign callers assemble these node by node through the boundary without
//! ever holding a typed reference into the tree. At the boundary, inserting a
//! value into a compound stores an independent clone, so parent and child
//! handles never alias.

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use crate::error::Error;

/// One node of a dynamically-typed data tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Entries keep insertion order; re-setting a key overwrites in place.
    Object(IndexMap<String, Value>),
}

impl Value {
    /// An empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// An empty object.
    pub fn object() -> Self {
        Value::Object(IndexMap::new())
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Object(_) => "dict",
        }
    }

    /// Append `value` to this array.
    pub fn push(&mut self, value: Value) -> Result<(), Error> {
        match self {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(Error::Operation(format!(
                "cannot push into a {} value",
                other.type_name()
            ))),
        }
    }

    /// Insert or overwrite the entry at `key` in this object. Last write wins.
    pub fn insert(&mut self, key: &str, value: Value) -> Result<(), Error> {
        match self {
            Value::Object(entries) => {
                entries.insert(key.to_owned(), value);
                Ok(())
            }
            other => Err(Error::Operation(format!(
                "cannot set a key on a {} value",
                other.type_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

// The engine consumes values through serde, which also gives the JSON context
// path and the builder path one shared representation on the engine side.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(entries) => serializer.collect_map(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_insertion_order() {
        let mut arr = Value::array();
        arr.push(Value::Int(1)).unwrap();
        arr.push(Value::Int(2)).unwrap();
        arr.push(Value::from("three")).unwrap();
        let Value::Array(items) = &arr else {
            panic!("expected array")
        };
        assert_eq!(items[0], Value::Int(1));
        assert_eq!(items[1], Value::Int(2));
        assert_eq!(items[2], Value::String("three".into()));
    }

    #[test]
    fn push_into_scalar_is_rejected() {
        let mut not_an_array = Value::Int(7);
        let err = not_an_array.push(Value::Null).unwrap_err();
        assert!(err.to_string().contains("cannot push into a int value"));
        // The target is left as it was.
        assert_eq!(not_an_array, Value::Int(7));
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut obj = Value::object();
        obj.insert("a", Value::Int(1)).unwrap();
        obj.insert("b", Value::Int(2)).unwrap();
        obj.insert("a", Value::Int(3)).unwrap();
        let Value::Object(entries) = &obj else {
            panic!("expected object")
        };
        let keys: Vec<_> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(entries["a"], Value::Int(3));
    }

    #[test]
    fn insert_on_non_object_is_rejected() {
        let mut arr = Value::array();
        let err = arr.insert("key", Value::Null).unwrap_err();
        assert!(err.to_string().contains("cannot set a key on a list value"));
    }

    #[test]
    fn serializes_like_json() {
        let mut obj = Value::object();
        obj.insert("z", Value::Int(1)).unwrap();
        obj.insert("a", Value::Bool(true)).unwrap();
        let mut arr = Value::array();
        arr.push(Value::Null).unwrap();
        arr.push(Value::Float(1.5)).unwrap();
        obj.insert("items", arr).unwrap();
        // Key order is insertion order, not alphabetical.
        assert_eq!(
            serde_json::to_string(&obj).unwrap(),
            r#"{"z":1,"a":true,"items":[null,1.5]}"#
        );
    }
}
