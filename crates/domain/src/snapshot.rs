//! Property snapshots: a bag of named device properties handed to read
//! resolvers, either fetched from the hub or synthesized from a delta.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the primary value property.
pub const VALUE: &str = "value";
/// Name of the secondary value property.
pub const VALUE2: &str = "value2";
/// Name of the color property (`"r,g,b,w"`).
pub const COLOR: &str = "color";

/// Device properties keyed by their hub-side name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySnapshot(Map<String, Value>);

impl PropertySnapshot {
    /// An empty snapshot; resolvers fed with it rely on cached capability state.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The primary value, if present.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.get(VALUE)
    }

    /// A property read as a number; numeric strings are accepted since the
    /// hub reports many values as strings.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// A property read as a boolean; `"true"`, `"1"` and non-zero numbers
    /// count as `true`.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                other => other.parse::<f64>().ok().map(|f| f != 0.0),
            },
            _ => None,
        }
    }

    /// A property read as a string slice.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    /// Rewrite a numeric property in place with `f`. Non-numeric values are
    /// left untouched.
    pub fn map_number(&mut self, name: &str, f: impl FnOnce(f64) -> f64) {
        if let Some(n) = self.number(name) {
            if let Some(converted) = serde_json::Number::from_f64(f(n)) {
                self.0.insert(name.to_string(), Value::Number(converted));
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
