//! Schema-less order payload and the total accessors every renderer uses.
//!
//! Nothing about the payload shape is guaranteed: a section may be missing,
//! `null`, a string where an object was expected, or an object with a
//! surprising mix of keys. Instead of typed structs with a forest of
//! `Option` fields, the payload stays a [`serde_json::Value`] tree and all
//! reads go through the handful of functions in this module. None of them can
//! fail; a lookup that doesn't make sense simply returns `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An order payload of unknown shape.
///
/// Usually a JSON object with `buildName`, `customerDetails`,
/// `orderMetadata` and `buildConfig`, but any JSON value is accepted. A
/// non-object root behaves like an empty mapping for every lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderPayload(Value);

impl OrderPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// An empty object payload.
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Look up a dotted path such as `"buildConfig.floors"`.
    ///
    /// Returns `None` as soon as a segment is missing or a parent is not an
    /// object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.0, |acc, key| match acc {
            Value::Object(map) => map.get(key),
            _ => None,
        })
    }

    /// The top-level value at `key`, only if it is a JSON object.
    pub fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Like [`section`](Self::section) but also `None` for an empty object.
    pub fn non_empty_section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.section(key).filter(|map| !map.is_empty())
    }

    pub fn build_config(&self) -> Option<&Map<String, Value>> {
        self.section("buildConfig")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for OrderPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// JavaScript-style truthiness.
///
/// Missing, `null`, `false`, `0` and `""` are falsy. Everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// JavaScript `Number()` coercion. `None` stands for `NaN`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
            }
        }
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] => coerce_number(single),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

/// Field `key` of an optional mapping.
pub fn field<'a>(map: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    map.and_then(|m| m.get(key))
}
