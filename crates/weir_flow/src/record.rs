//! The mutable record shared by all units of a chain.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::Value;

/// A record flowing through a chain: named fields mapped to dynamic values.
///
/// Units read and mutate the record in place. Field iteration order is the
/// sorted key order, so serializing a record is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if the record has a field with the given name.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Merges every field of `other` into this record.
    ///
    /// Same-named fields are overwritten; fields present here but absent in
    /// `other` are left untouched.
    pub fn absorb(&mut self, other: &Record) {
        for (key, value) in other.iter() {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut rec = Record::new();
        rec.insert("id", "item-1");
        rec.insert("count", 3i64);
        assert_eq!(rec.get("id").and_then(Value::as_str), Some("item-1"));
        assert_eq!(rec.get("count").and_then(Value::as_int), Some(3));
        assert!(rec.get("missing").is_none());
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn insert_overwrites() {
        let mut rec = Record::new();
        rec.insert("id", "old");
        rec.insert("id", "new");
        assert_eq!(rec.get("id").and_then(Value::as_str), Some("new"));
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn absorb_overwrites_and_preserves() {
        let mut rec = Record::new();
        rec.insert("id", "item-1");
        rec.insert("local", 1i64);

        let mut other = Record::new();
        other.insert("id", "item-1");
        other.insert("derived", 2i64);

        rec.absorb(&other);
        assert_eq!(rec.get("derived").and_then(Value::as_int), Some(2));
        // Fields absent from the absorbed record survive.
        assert_eq!(rec.get("local").and_then(Value::as_int), Some(1));
        assert_eq!(rec.len(), 3);
    }

    #[test]
    fn absorb_empty_is_noop() {
        let mut rec = Record::new();
        rec.insert("id", "item-1");
        let before = rec.clone();
        rec.absorb(&Record::new());
        assert_eq!(rec, before);
    }

    #[test]
    fn remove_field() {
        let mut rec = Record::new();
        rec.insert("id", "x");
        assert_eq!(rec.remove("id"), Some(Value::Str("x".to_string())));
        assert!(rec.is_empty());
        assert_eq!(rec.remove("id"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let mut rec = Record::new();
        rec.insert("id", "item-1");
        rec.insert("nested", vec![Value::Int(1), Value::Int(2)]);
        let json = serde_json::to_string(&rec).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
