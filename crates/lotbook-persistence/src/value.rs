//! Typed attribute-document value model
//!
//! An attribute document is a flat map of schema-derived keys to nullable
//! scalars, stored as a JSON column. The valid key set for an item comes from
//! its category's attribute links and is enforced at write time by the
//! catalog service, not by this type.

use std::collections::BTreeMap;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A single attribute value: a small tagged union of scalars
///
/// Serialized untagged so documents read as plain JSON objects
/// (`{"viscosity": 32.5, "grade": "A", "approved": null}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// The per-item attribute document: key → nullable scalar
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AttributeMap(pub BTreeMap<String, ScalarValue>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document containing exactly one key set to null
    pub fn with_null_key(key: &str) -> Self {
        let mut map = Self::new();
        map.insert(key.to_string(), ScalarValue::Null);
        map
    }

    /// A document pre-populated with every given key set to null
    pub fn from_null_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for key in keys {
            map.insert(key.into(), ScalarValue::Null);
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: String, value: ScalarValue) -> Option<ScalarValue> {
        self.0.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<ScalarValue> {
        self.0.remove(key)
    }

    /// Move the value stored under `old_key` to `new_key`
    ///
    /// Returns true when a move happened. A document without `old_key` is
    /// left untouched, which is what makes rename propagation idempotent.
    pub fn rename(&mut self, old_key: &str, new_key: &str) -> bool {
        match self.0.remove(old_key) {
            Some(value) => {
                self.0.insert(new_key.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScalarValue)> {
        self.0.iter()
    }
}
