//! Pure transforms between the persisted document, invocation flags and setup results

use super::document::{ConfigDocument, ModuleConfig};
use super::normalize::ENABLED_KEY;
use crate::modules::{ModuleId, SetupResult};
use std::collections::BTreeMap;
use tracing::warn;

/// Which modules an invocation asks for
///
/// Only modules that were mentioned carry an entry; an absent module is
/// "not asked for", which reads the same as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationFlags {
    modules: BTreeMap<ModuleId, bool>,
    all: bool,
}

impl InvocationFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: ModuleId, enabled: bool) {
        self.modules.insert(id, enabled);
    }

    /// Builder-style `set`
    pub fn with(mut self, id: ModuleId, enabled: bool) -> Self {
        self.set(id, enabled);
        self
    }

    /// Mark the aggregate "all modules" flag
    pub fn with_all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn all(&self) -> bool {
        self.all
    }

    pub fn get(&self, id: ModuleId) -> Option<bool> {
        self.modules.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// True if the aggregate flag or any module flag is set
    pub fn any_enabled(&self) -> bool {
        self.all || self.modules.values().any(|enabled| *enabled)
    }

    /// Modules flagged true, in registry order
    pub fn enabled(&self) -> Vec<ModuleId> {
        self.modules
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl FromIterator<(ModuleId, bool)> for InvocationFlags {
    fn from_iter<I: IntoIterator<Item = (ModuleId, bool)>>(iter: I) -> Self {
        Self {
            modules: iter.into_iter().collect(),
            all: false,
        }
    }
}

/// Derive invocation flags from a stored document.
///
/// The result carries exactly the keys present in the document.
pub fn to_invocation_flags(document: &ConfigDocument) -> InvocationFlags {
    document
        .iter()
        .map(|(id, config)| (id, config.is_enabled))
        .collect()
}

/// Fold one run's setup results into a document fragment.
///
/// `wasInstalled` is authoritative for `isEnabled`: a custom property with
/// that name is discarded instead of overriding the computed flag.
pub fn from_setup_results(results: &BTreeMap<ModuleId, SetupResult>) -> ConfigDocument {
    let mut fragment = ConfigDocument::new();
    for (id, result) in results {
        if result.custom_properties.contains_key(ENABLED_KEY) {
            warn!(module = %id, "custom properties may not override isEnabled; ignoring it");
        }
        let config = ModuleConfig {
            is_enabled: result.was_installed,
            properties: Default::default(),
        }
        .with_properties(result.custom_properties.clone());
        fragment.insert(*id, config);
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn document(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(&value).unwrap()
    }

    #[test]
    fn test_flag_extraction_from_every_shape() {
        let flags = to_invocation_flags(&document(json!({
            "eslint": true,
            "prettier": false,
            "lintStaged": {"isEnabled": true},
            "commitlint": {"isEnabled": false, "preset": "angular"},
            "ci": {"provider": "github"},
            "license": null
        })));

        assert_eq!(flags.get(ModuleId::Eslint), Some(true));
        assert_eq!(flags.get(ModuleId::Prettier), Some(false));
        assert_eq!(flags.get(ModuleId::LintStaged), Some(true));
        assert_eq!(flags.get(ModuleId::Commitlint), Some(false));
        assert_eq!(flags.get(ModuleId::Ci), Some(true));
        assert_eq!(flags.get(ModuleId::License), Some(false));
    }

    #[test]
    fn test_flags_only_cover_present_keys() {
        let flags = to_invocation_flags(&document(json!({"eslint": {"isEnabled": true}})));
        assert_eq!(flags.len(), 1);
        assert_eq!(flags.get(ModuleId::Gitignore), None);
        assert_eq!(flags.enabled(), vec![ModuleId::Eslint]);
    }

    #[test]
    fn test_is_enabled_flag_extracted_exactly() {
        for flag in [true, false] {
            let flags = to_invocation_flags(&document(json!({"eslint": {"isEnabled": flag}})));
            assert_eq!(flags.get(ModuleId::Eslint), Some(flag));
        }
    }

    #[test]
    fn test_any_enabled() {
        assert!(!InvocationFlags::new().any_enabled());
        assert!(!InvocationFlags::new()
            .with(ModuleId::Eslint, false)
            .any_enabled());
        assert!(InvocationFlags::new().with_all(true).any_enabled());
        assert!(InvocationFlags::new()
            .with(ModuleId::Ci, true)
            .any_enabled());
    }

    #[test]
    fn test_setup_results_to_config() {
        let mut results = BTreeMap::new();
        results.insert(ModuleId::Eslint, SetupResult::skipped());
        results.insert(
            ModuleId::License,
            SetupResult::installed(
                json!({"type": "MIT", "author": "Jane"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
        );

        let fragment = from_setup_results(&results);
        assert_eq!(
            fragment.to_value(),
            json!({
                "eslint": {"isEnabled": false},
                "license": {"isEnabled": true, "type": "MIT", "author": "Jane"}
            })
        );
    }

    #[test]
    fn test_custom_is_enabled_does_not_override() {
        let mut results = BTreeMap::new();
        results.insert(
            ModuleId::Prettier,
            SetupResult::installed(json!({"isEnabled": false}).as_object().cloned().unwrap()),
        );
        let fragment = from_setup_results(&results);
        assert_eq!(
            fragment.to_value(),
            json!({"prettier": {"isEnabled": true}})
        );
    }
}
