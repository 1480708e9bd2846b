//! Property normalization
//!
//! A module's stored settings have had three shapes over time:
//!
//! - a plain boolean (`true`)
//! - an object carrying `isEnabled` plus properties (`{"isEnabled": true, "x": 1}`)
//! - a raw property bag without `isEnabled` (`{"x": 1}`)
//!
//! Every caller that only wants the properties goes through [`normalize`],
//! which strips the enablement flag and nothing else.

use serde_json::{Map, Value};

/// Key carrying the enablement flag in stored settings
pub const ENABLED_KEY: &str = "isEnabled";

/// Module-specific settings without the enablement flag
pub type Properties = Map<String, Value>;

/// Reduce any stored shape to its property bag.
///
/// Absent, falsy, boolean and other non-object values carry no properties.
/// Objects are copied with `isEnabled` removed. The result never contains
/// `isEnabled`, so normalizing twice is the same as normalizing once.
pub fn normalize(value: Option<&Value>) -> Properties {
    match value {
        Some(Value::Object(map)) => {
            let mut properties = map.clone();
            properties.shift_remove(ENABLED_KEY);
            properties
        }
        _ => Properties::new(),
    }
}

/// JavaScript-style truthiness of a stored value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Explicit list of keys a property bag may carry
///
/// Normalizing through a schema drops every key it does not enumerate, so the
/// result is fully determined by the schema and the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySchema {
    keys: &'static [&'static str],
}

impl PropertySchema {
    pub const fn new(keys: &'static [&'static str]) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    pub fn allows(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }

    /// Normalize, then keep only the keys this schema knows about
    pub fn normalize(&self, value: Option<&Value>) -> Properties {
        let mut properties = normalize(value);
        let unknown: Vec<String> = properties
            .keys()
            .filter(|key| !self.allows(key))
            .cloned()
            .collect();
        for key in unknown {
            tracing::debug!(key, "dropping unknown property");
            properties.shift_remove(&key);
        }
        properties
    }
}
