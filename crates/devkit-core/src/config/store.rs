//! Configuration store: discovery, caching and persistence
//!
//! The store is an explicit value shared by reference with every consumer.
//! It caches both the discovered location and the parsed document;
//! [`ConfigStore::invalidate`] drops both.

use super::document::{ConfigDocument, ModuleConfig};
use crate::error::{StoreError, StoreResult};
use crate::modules::ModuleId;
use crate::product::ProductConfig;
use crate::project::{FileSystem, ProjectManifest};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// Where a configuration document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A standalone file in the hidden project directory
    File { path: PathBuf, format: Format },
    /// A namespaced key inside `package.json`
    Manifest { path: PathBuf, key: String },
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::File { path, .. } | ConfigSource::Manifest { path, .. } => path,
        }
    }
}

/// Candidate file names inside the configuration directory, in priority order
const CANDIDATE_FILES: &[(&str, Format)] = &[
    ("config.json", Format::Json),
    ("config.yaml", Format::Yaml),
    ("config.yml", Format::Yaml),
];

/// Candidate locations for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocations {
    project_root: PathBuf,
    config_dir: PathBuf,
    manifest_key: String,
}

impl ConfigLocations {
    pub fn new(
        project_root: impl Into<PathBuf>,
        config_dir: impl AsRef<Path>,
        manifest_key: impl Into<String>,
    ) -> Self {
        let project_root = project_root.into();
        let config_dir = project_root.join(config_dir);
        Self {
            project_root,
            config_dir,
            manifest_key: manifest_key.into(),
        }
    }

    pub fn from_product<C: ProductConfig>(config: &C, project_root: impl Into<PathBuf>) -> Self {
        Self::new(project_root, config.config_dir(), config.manifest_key())
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// All candidates in discovery order
    pub fn candidates(&self) -> Vec<ConfigSource> {
        let mut candidates: Vec<ConfigSource> = CANDIDATE_FILES
            .iter()
            .map(|(name, format)| ConfigSource::File {
                path: self.config_dir.join(name),
                format: *format,
            })
            .collect();
        candidates.push(ConfigSource::Manifest {
            path: ProjectManifest::path_in(&self.project_root),
            key: self.manifest_key.clone(),
        });
        candidates
    }

    /// Location used when nothing has been written yet
    pub fn default_source(&self) -> ConfigSource {
        let (name, format) = CANDIDATE_FILES[0];
        ConfigSource::File {
            path: self.config_dir.join(name),
            format,
        }
    }
}

/// Discovers, reads, caches and persists the project's configuration document
pub struct ConfigStore {
    locations: ConfigLocations,
    fs: Arc<dyn FileSystem>,
    document: Mutex<Option<ConfigDocument>>,
    discovered: Mutex<Option<Option<ConfigSource>>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("locations", &self.locations)
            .field("document", &*self.document.lock())
            .finish()
    }
}

impl ConfigStore {
    pub fn new(locations: ConfigLocations, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            locations,
            fs,
            document: Mutex::new(None),
            discovered: Mutex::new(None),
        }
    }

    pub fn locations(&self) -> &ConfigLocations {
        &self.locations
    }

    /// Drop the cached document and the cached location
    pub fn invalidate(&self) {
        *self.document.lock() = None;
        *self.discovered.lock() = None;
    }

    /// First candidate that currently holds a document, cached
    pub async fn discover(&self) -> Option<ConfigSource> {
        let cached = self.discovered.lock().clone();
        if let Some(cached) = cached {
            return cached;
        }

        let mut found = None;
        for candidate in self.locations.candidates() {
            if self.is_present(&candidate).await {
                found = Some(candidate);
                break;
            }
        }
        debug!(source = ?found, "configuration discovery finished");

        *self.discovered.lock() = Some(found.clone());
        found
    }

    async fn is_present(&self, source: &ConfigSource) -> bool {
        match source {
            ConfigSource::File { path, .. } => self.fs.exists(path).await,
            ConfigSource::Manifest { key, .. } => {
                match ProjectManifest::load(self.fs.as_ref(), &self.locations.project_root).await
                {
                    Ok(manifest) => manifest.field(key).is_some(),
                    Err(e) => {
                        debug!(error = %format!("{e:#}"), "manifest unreadable during discovery");
                        false
                    }
                }
            }
        }
    }

    /// Read the discovered document, bypassing the document cache
    async fn load(&self) -> StoreResult<ConfigDocument> {
        let Some(source) = self.discover().await else {
            return Ok(ConfigDocument::new());
        };

        let raw = match &source {
            ConfigSource::File { path, format } => {
                let content = self
                    .fs
                    .read_file(path)
                    .await
                    .map_err(|e| StoreError::io(path, e))?;
                if content.trim().is_empty() {
                    return Ok(ConfigDocument::new());
                }
                match format {
                    Format::Json => serde_json::from_str::<Value>(&content)
                        .map_err(|e| StoreError::parse(path, e))?,
                    Format::Yaml => serde_yaml::from_str::<Value>(&content)
                        .map_err(|e| StoreError::parse(path, e))?,
                }
            }
            ConfigSource::Manifest { path, key } => {
                let manifest =
                    ProjectManifest::load(self.fs.as_ref(), &self.locations.project_root)
                        .await
                        .map_err(|e| StoreError::parse(path, format!("{e:#}")))?;
                manifest.field(key).cloned().unwrap_or(Value::Null)
            }
        };

        ConfigDocument::from_value(&raw).map_err(|message| StoreError::parse(source.path(), message))
    }

    /// True only if a document was found and it is non-empty
    pub async fn exists(&self) -> bool {
        if self.discover().await.is_none() {
            return false;
        }
        !self.get().await.is_empty()
    }

    /// The current document; empty if nothing was found or it could not be read
    pub async fn get(&self) -> ConfigDocument {
        let cached = self.document.lock().clone();
        if let Some(cached) = cached {
            return cached;
        }

        let document = match self.load().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "could not read configuration, using an empty one");
                ConfigDocument::new()
            }
        };
        *self.document.lock() = Some(document.clone());
        document
    }

    /// Stored settings of one module
    pub async fn get_property(&self, id: ModuleId) -> Option<ModuleConfig> {
        self.get().await.get(id).cloned()
    }

    /// Stored settings of one module decoded into `T`; `None` on absence or mismatch
    pub async fn get_module_config<T: DeserializeOwned>(&self, id: ModuleId) -> Option<T> {
        let config = self.get_property(id).await?;
        match serde_json::from_value(config.to_value()) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!(module = %id, error = %e, "stored settings do not match the expected shape");
                None
            }
        }
    }

    /// Absent → false; present → enabled unless explicitly disabled
    pub async fn is_module_enabled(&self, id: ModuleId) -> bool {
        self.get_property(id)
            .await
            .is_some_and(|config| config.is_enabled)
    }

    /// Persist the full document to the discovered location, or the default one
    pub async fn set(&self, document: &ConfigDocument) -> StoreResult<()> {
        let source = self
            .discover()
            .await
            .unwrap_or_else(|| self.locations.default_source());

        match &source {
            ConfigSource::File { path, format } => {
                let content = match format {
                    Format::Json => serde_json::to_string_pretty(document)
                        .map(|mut s| {
                            s.push('\n');
                            s
                        })
                        .map_err(|e| StoreError::Serialize(e.to_string()))?,
                    Format::Yaml => serde_yaml::to_string(document)
                        .map_err(|e| StoreError::Serialize(e.to_string()))?,
                };
                if let Some(parent) = path.parent() {
                    self.fs
                        .create_directory(parent)
                        .await
                        .map_err(|e| StoreError::io(parent, e))?;
                }
                self.fs
                    .write_file(path, &content)
                    .await
                    .map_err(|e| StoreError::io(path, e))?;
            }
            ConfigSource::Manifest { path, key } => {
                let mut manifest =
                    ProjectManifest::load(self.fs.as_ref(), &self.locations.project_root)
                        .await
                        .map_err(|e| StoreError::parse(path, format!("{e:#}")))?;
                manifest.set_field(key, document.to_value());
                manifest
                    .save(self.fs.as_ref())
                    .await
                    .map_err(|e| StoreError::parse(path, format!("{e:#}")))?;
            }
        }
        debug!(path = %source.path().display(), modules = document.len(), "configuration saved");

        *self.document.lock() = Some(document.clone());
        *self.discovered.lock() = None;
        Ok(())
    }

    /// Read-modify-write merge of a partial document.
    ///
    /// If the current document cannot be read, `partial` is persisted on its
    /// own and whatever was stored before is lost.
    pub async fn merge(&self, partial: &ConfigDocument) -> StoreResult<()> {
        let merged = match self.load().await {
            Ok(mut current) => {
                current.merge(partial);
                current
            }
            Err(e) => {
                warn!(error = %e, "could not read configuration before merge, writing the new settings alone");
                partial.clone()
            }
        };
        self.set(&merged).await
    }

    /// Replace one module's stored settings
    pub async fn set_property(&self, id: ModuleId, config: ModuleConfig) -> StoreResult<()> {
        let mut document = self.get().await;
        document.insert(id, config);
        self.set(&document).await
    }
}
