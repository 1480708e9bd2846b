//! Canonical persisted configuration document
//!
//! Stored values are decoded from any historical shape and normalized once at
//! load time into [`ModuleConfig`]. Only the canonical shape
//! `{"isEnabled": bool, ...properties}` is ever written back.

use super::normalize::{is_truthy, normalize, Properties, ENABLED_KEY};
use crate::modules::ModuleId;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// One module's stored settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleConfig {
    pub is_enabled: bool,
    /// Module-specific properties; never contains `isEnabled`
    pub properties: Properties,
}

impl ModuleConfig {
    pub fn enabled() -> Self {
        Self {
            is_enabled: true,
            properties: Properties::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = normalize(Some(&Value::Object(properties)));
        self
    }

    /// Decode any historical stored shape.
    ///
    /// - boolean: the flag itself
    /// - object with `isEnabled`: that flag (by truthiness), other keys become properties
    /// - object without `isEnabled`: enabled, the whole object is the property bag
    /// - anything else: enabled if truthy, no properties
    pub fn from_raw(value: &Value) -> Self {
        let is_enabled = match value {
            Value::Bool(flag) => *flag,
            Value::Object(map) => map.get(ENABLED_KEY).map_or(true, is_truthy),
            other => is_truthy(other),
        };
        Self {
            is_enabled,
            properties: normalize(Some(value)),
        }
    }

    /// Canonical JSON form
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(ENABLED_KEY.to_string(), Value::Bool(self.is_enabled));
        for (key, value) in &self.properties {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// Property value by key
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Fold `other` into `self`: the flag is replaced, properties are merged
    /// recursively so siblings absent from `other` survive.
    pub fn merge(&mut self, other: &ModuleConfig) {
        self.is_enabled = other.is_enabled;
        for (key, value) in &other.properties {
            match self.properties.get_mut(key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.properties.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl Serialize for ModuleConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.properties.len() + 1))?;
        map.serialize_entry(ENABLED_KEY, &self.is_enabled)?;
        for (key, value) in &self.properties {
            if key != ENABLED_KEY {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ModuleConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

/// Recursively merge `patch` into `target`.
///
/// Objects merge key by key; arrays and scalars replace wholesale.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Persisted configuration keyed by module
///
/// A missing key means "never configured", which is different from a key
/// whose `is_enabled` is false.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    modules: BTreeMap<ModuleId, ModuleConfig>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn get(&self, id: ModuleId) -> Option<&ModuleConfig> {
        self.modules.get(&id)
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    pub fn insert(&mut self, id: ModuleId, config: ModuleConfig) -> Option<ModuleConfig> {
        self.modules.insert(id, config)
    }

    /// Builder-style insert
    pub fn with(mut self, id: ModuleId, config: ModuleConfig) -> Self {
        self.insert(id, config);
        self
    }

    /// Entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &ModuleConfig)> {
        self.modules.iter().map(|(id, config)| (*id, config))
    }

    /// Fold a partial document into this one, key by key
    pub fn merge(&mut self, partial: &ConfigDocument) {
        for (id, config) in partial.iter() {
            match self.modules.get_mut(&id) {
                Some(existing) => existing.merge(config),
                None => {
                    self.modules.insert(id, config.clone());
                }
            }
        }
    }

    /// Decode a raw document, dropping keys that do not name a module
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            _ => return Err("configuration must be an object".to_string()),
        };

        let mut document = Self::default();
        for (key, raw) in map {
            match ModuleId::from_key(key) {
                Some(id) => {
                    document.insert(id, ModuleConfig::from_raw(raw));
                }
                None => warn!(key = key.as_str(), "ignoring unknown module in configuration"),
            }
        }
        Ok(document)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.modules
                .iter()
                .map(|(id, config)| (id.key().to_string(), config.to_value()))
                .collect(),
        )
    }
}

impl Serialize for ConfigDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for (id, config) in &self.modules {
            map.serialize_entry(id.key(), config)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ConfigDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_from_raw_shapes() {
        assert_eq!(ModuleConfig::from_raw(&json!(true)), ModuleConfig::enabled());
        assert_eq!(ModuleConfig::from_raw(&json!(false)), ModuleConfig::disabled());
        assert_eq!(ModuleConfig::from_raw(&json!(null)), ModuleConfig::disabled());

        let structured = ModuleConfig::from_raw(&json!({"isEnabled": false, "a": 1}));
        assert!(!structured.is_enabled);
        assert_eq!(structured.property("a"), Some(&json!(1)));

        let bag = ModuleConfig::from_raw(&json!({"a": 1}));
        assert!(bag.is_enabled);
        assert_eq!(bag.properties, props(json!({"a": 1})));
    }

    #[test]
    fn test_canonical_serialization() {
        let config = ModuleConfig::enabled().with_properties(props(json!({"flavor": "typescript"})));
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"isEnabled": true, "flavor": "typescript"})
        );
        assert_eq!(config.to_value(), serde_json::to_value(&config).unwrap());
    }

    #[test]
    fn test_with_properties_strips_enabled_key() {
        let config = ModuleConfig::disabled().with_properties(props(json!({"isEnabled": true})));
        assert!(!config.is_enabled);
        assert!(config.properties.is_empty());
    }

    #[test]
    fn test_deep_merge_objects_and_arrays() {
        let mut target = json!({"a": {"x": 1, "list": [1, 2]}, "b": 1});
        deep_merge(&mut target, &json!({"a": {"y": 2, "list": [3]}, "b": {"c": 1}}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 2, "list": [3]}, "b": {"c": 1}}));
    }

    #[test]
    fn test_document_merge_keeps_siblings() {
        let mut document = ConfigDocument::new().with(
            ModuleId::Eslint,
            ModuleConfig::enabled().with_properties(props(json!({"x": 1}))),
        );
        let partial = ConfigDocument::new().with(
            ModuleId::Eslint,
            ModuleConfig::enabled().with_properties(props(json!({"y": 2}))),
        );
        document.merge(&partial);
        assert_eq!(
            document.to_value(),
            json!({"eslint": {"isEnabled": true, "x": 1, "y": 2}})
        );
    }

    #[test]
    fn test_document_merge_is_idempotent() {
        let start = ConfigDocument::from_value(&json!({
            "eslint": {"isEnabled": true, "flavor": "javascript", "nested": {"a": [1]}},
            "license": true
        }))
        .unwrap();
        let partial = ConfigDocument::from_value(&json!({
            "eslint": {"isEnabled": false, "nested": {"b": 2, "a": [2]}},
            "ci": {"provider": "github"}
        }))
        .unwrap();

        let mut once = start.clone();
        once.merge(&partial);
        let mut twice = start;
        twice.merge(&partial);
        twice.merge(&partial);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let document =
            ConfigDocument::from_value(&json!({"eslint": true, "lintModule": true})).unwrap();
        assert_eq!(document.len(), 1);
        assert!(document.contains(ModuleId::Eslint));
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        assert!(ConfigDocument::from_value(&json!([1])).is_err());
        assert!(ConfigDocument::from_value(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_serialization_uses_registry_order() {
        let document = ConfigDocument::new()
            .with(ModuleId::Gitignore, ModuleConfig::enabled())
            .with(ModuleId::Eslint, ModuleConfig::disabled());
        let json = serde_json::to_string(&document).unwrap();
        assert_eq!(
            json,
            r#"{"eslint":{"isEnabled":false},"gitignore":{"isEnabled":true}}"#
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let document = ConfigDocument::from_value(&json!({
            "ci": {"isEnabled": true, "provider": "gitlab", "submodules": ["lint"]}
        }))
        .unwrap();
        let yaml = serde_yaml::to_string(&document).unwrap();
        let parsed: ConfigDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, document);
    }
}
