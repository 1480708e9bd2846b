//! Project manifest (`package.json`) access
//!
//! Modules add or overwrite entries by exact name and never touch unrelated
//! ones, so the document is kept as an order-preserving JSON object instead of
//! a typed struct.

use crate::project::fs::FileSystem;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name of the project manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Parsed `package.json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl ProjectManifest {
    /// Path of the manifest inside a project root
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(MANIFEST_FILE)
    }

    /// Load the manifest; a missing file yields an empty document
    pub async fn load(fs: &dyn FileSystem, project_root: &Path) -> Result<Self> {
        let path = Self::path_in(project_root);
        if !fs.exists(&path).await {
            return Ok(Self {
                path,
                root: Map::new(),
            });
        }

        let content = fs
            .read_file(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let root = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self { path, root })
    }

    fn parse(content: &str) -> Result<Map<String, Value>> {
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(content)? {
            Value::Object(map) => Ok(map),
            other => anyhow::bail!("expected a JSON object, found {}", type_name(&other)),
        }
    }

    /// Write the manifest back (two-space indent, trailing newline)
    pub async fn save(&self, fs: &dyn FileSystem) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.root)
            .context("Failed to serialize package.json")?;
        content.push('\n');
        fs.write_file(&self.path, &content)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn set_field(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_string(), value);
    }

    /// Remove a top-level field, returning whether it was present
    pub fn remove_field(&mut self, key: &str) -> bool {
        self.root.shift_remove(key).is_some()
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.root
            .get("scripts")
            .and_then(Value::as_object)
            .and_then(|scripts| scripts.get(name))
            .and_then(Value::as_str)
    }

    /// Add or overwrite a script entry by exact name
    pub fn set_script(&mut self, name: &str, command: &str) {
        self.object_entry("scripts")
            .insert(name.to_string(), Value::String(command.to_string()));
    }

    pub fn remove_script(&mut self, name: &str) -> bool {
        self.root
            .get_mut("scripts")
            .and_then(Value::as_object_mut)
            .is_some_and(|scripts| scripts.shift_remove(name).is_some())
    }

    /// Entry of the nested `config` object
    pub fn config_entry(&self, key: &str) -> Option<&Value> {
        self.root
            .get("config")
            .and_then(Value::as_object)
            .and_then(|config| config.get(key))
    }

    pub fn set_config_entry(&mut self, key: &str, value: Value) {
        self.object_entry("config").insert(key.to_string(), value);
    }

    /// Get a top-level object, replacing a non-object value with an empty one
    fn object_entry(&mut self, key: &str) -> &mut Map<String, Value> {
        let entry = self
            .root
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("entry was just replaced with an object"),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
