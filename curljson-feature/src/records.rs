//! Coercion of a resolved value into an ordered record sequence

use serde_json::Value;
use std::fmt;

/// Position of a record in its container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// Array index (a scalar is wrapped as index 0)
    Index(usize),
    /// Object key
    Name(String),
}

impl RecordKey {
    /// JSON form: a number for indices, a string for keys
    pub fn to_value(&self) -> Value {
        match self {
            RecordKey::Index(idx) => Value::from(*idx),
            RecordKey::Name(name) => Value::String(name.clone()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Index(idx) => write!(f, "{}", idx),
            RecordKey::Name(name) => f.write_str(name),
        }
    }
}

/// Iterate `value` as `(key, record)` pairs.
///
/// Arrays yield indices, objects yield keys in insertion order, and any
/// scalar (null included) is a single record at index 0.
pub fn records(value: &Value) -> Box<dyn Iterator<Item = (RecordKey, &Value)> + '_> {
    match value {
        Value::Array(arr) => Box::new(
            arr.iter()
                .enumerate()
                .map(|(idx, v)| (RecordKey::Index(idx), v)),
        ),
        Value::Object(map) => Box::new(
            map.iter()
                .map(|(k, v)| (RecordKey::Name(k.clone()), v)),
        ),
        scalar => Box::new(std::iter::once((RecordKey::Index(0), scalar))),
    }
}
