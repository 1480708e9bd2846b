//! Tooling modules and their lifecycle
//!
//! Every module implements [`ModuleService`]. Only [`ModuleService::install`]
//! is called from outside; it composes the other two phases:
//!
//! 1. `should_install`: ask the user, defaulting to the stored enablement
//! 2. `handle_existing_setup`: find artifacts that would be overwritten and
//!    offer to delete them
//! 3. `setup`: the module's actual work
//!
//! A "no" at either of the first two phases yields a skipped result with no
//! side effects. Errors from the side-effecting phases are reported to the
//! user and returned unchanged.

pub mod ci;
pub mod commitlint;
pub mod editor_config;
pub mod eslint;
pub mod git_hooks;
pub mod gitignore;
pub mod id;
pub mod license;
pub mod lint_staged;
pub mod prettier;
pub mod registry;
pub mod semantic_release;

pub use id::ModuleId;
pub use registry::ModuleRegistry;

use crate::config::{normalize, ConfigStore, Properties};
use crate::project::{FileSystem, ProjectManifest};
use crate::prompt::{Choice, Prompter};
use crate::runtime::{CommandExecutor, PackageManager};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output of one module's `install` for the current run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupResult {
    pub was_installed: bool,
    pub custom_properties: Properties,
}

impl SetupResult {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn installed(custom_properties: Properties) -> Self {
        Self {
            was_installed: true,
            custom_properties,
        }
    }
}

/// Something on disk a module would overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// File path relative to the project root
    File(String),
    /// Entry of `package.json` `scripts`
    Script(String),
    /// Top-level `package.json` field
    ManifestField(String),
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::File(path) => write!(f, "{}", path),
            Artifact::Script(name) => write!(f, "package.json script \"{}\"", name),
            Artifact::ManifestField(key) => write!(f, "package.json field \"{}\"", key),
        }
    }
}

/// Everything a module needs to run
pub struct ModuleContext<'a> {
    pub project_root: &'a Path,
    pub fs: &'a dyn FileSystem,
    pub prompter: &'a dyn Prompter,
    pub executor: &'a dyn CommandExecutor,
    pub store: &'a ConfigStore,
    pub package_manager: PackageManager,
}

impl ModuleContext<'_> {
    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_root.join(relative)
    }

    pub async fn manifest(&self) -> Result<ProjectManifest> {
        ProjectManifest::load(self.fs, self.project_root).await
    }

    /// Stored properties of a module, whatever shape they were stored in
    pub async fn stored_properties(&self, id: ModuleId) -> Properties {
        self.store
            .get_property(id)
            .await
            .map(|config| config.properties)
            .unwrap_or_default()
    }

    /// Write a project file, creating parent directories
    pub async fn write(&self, relative: &str, contents: &str) -> Result<()> {
        write_file(self.fs, &self.path(relative), contents).await
    }

    /// Write several independent files concurrently.
    ///
    /// Every write is attempted. Files that were written stay written even
    /// when a sibling fails; the failures are listed in the returned error.
    pub async fn write_all(&self, files: &[(String, String)]) -> Result<Vec<String>> {
        let writes = files.iter().map(|(relative, contents)| async move {
            let outcome = write_file(self.fs, &self.path(relative), contents).await;
            (relative.clone(), outcome)
        });
        let outcomes = futures::future::join_all(writes).await;

        let (written, failed): (Vec<_>, Vec<_>) =
            outcomes.into_iter().partition(|(_, outcome)| outcome.is_ok());
        let written: Vec<String> = written.into_iter().map(|(path, _)| path).collect();

        if failed.is_empty() {
            return Ok(written);
        }

        let details = failed
            .into_iter()
            .map(|(path, outcome)| match outcome {
                Err(e) => format!("  - {}: {:#}", path, e),
                Ok(()) => format!("  - {}", path),
            })
            .collect::<Vec<_>>()
            .join("\n");
        anyhow::bail!(
            "Failed to write {} of {} files:\n{}",
            files.len() - written.len(),
            files.len(),
            details
        )
    }

    /// Files among `candidates` that exist in the project
    pub async fn existing_files(&self, candidates: &[&str]) -> Vec<Artifact> {
        let mut found = Vec::new();
        for candidate in candidates {
            if self.fs.exists(&self.path(candidate)).await {
                found.push(Artifact::File(candidate.to_string()));
            }
        }
        found
    }

    /// `package.json` fields and scripts among the given names that are present
    pub async fn manifest_markers(&self, fields: &[&str], scripts: &[&str]) -> Vec<Artifact> {
        let manifest = match self.manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!(error = %format!("{e:#}"), "manifest unreadable, no markers detected");
                return Vec::new();
            }
        };
        let fields = fields
            .iter()
            .filter(|field| manifest.field(field).is_some())
            .map(|field| Artifact::ManifestField(field.to_string()));
        let scripts = scripts
            .iter()
            .filter(|script| manifest.script(script).is_some())
            .map(|script| Artifact::Script(script.to_string()));
        fields.chain(scripts).collect()
    }

    /// Delete files and strip manifest entries
    pub async fn remove_artifacts(&self, artifacts: &[Artifact]) -> Result<()> {
        let mut manifest: Option<ProjectManifest> = None;
        for artifact in artifacts {
            match artifact {
                Artifact::File(relative) => {
                    let path = self.path(relative);
                    self.fs
                        .delete_file(&path)
                        .await
                        .with_context(|| format!("Failed to delete {}", path.display()))?;
                }
                Artifact::Script(name) => {
                    if manifest.is_none() {
                        manifest = Some(self.manifest().await?);
                    }
                    if let Some(manifest) = manifest.as_mut() {
                        manifest.remove_script(name);
                    }
                }
                Artifact::ManifestField(key) => {
                    if manifest.is_none() {
                        manifest = Some(self.manifest().await?);
                    }
                    if let Some(manifest) = manifest.as_mut() {
                        manifest.remove_field(key);
                    }
                }
            }
        }
        if let Some(manifest) = manifest {
            manifest.save(self.fs).await?;
        }
        Ok(())
    }

    /// Install npm packages as dev dependencies with the detected package manager
    pub async fn install_dev_dependencies(&self, packages: &[&str]) -> Result<()> {
        let command = self.package_manager.install_dev_command(packages);
        let spinner = self.prompter.spinner(&format!("Installing {}...", packages.join(", ")));

        let outcome = match self.executor.execute(&command, self.project_root).await {
            Ok(outcome) => outcome,
            Err(e) => {
                spinner.error("Could not run the package manager");
                return Err(e);
            }
        };

        if outcome.success {
            spinner.stop(&format!("Installed {}", packages.join(", ")));
            Ok(())
        } else {
            spinner.error(&format!("`{}` failed", command));
            anyhow::bail!("`{}` failed: {}", command, outcome.stderr)
        }
    }

    /// Choose one option; failures fall through to the caller
    pub fn select(&self, message: &str, choices: &[Choice], initial: Option<&str>) -> Result<String> {
        self.prompter
            .select(message, choices, initial)
            .with_context(|| format!("Failed to read answer to \"{}\"", message))
    }

    pub fn multiselect(
        &self,
        message: &str,
        choices: &[Choice],
        initial: &[String],
        required: bool,
    ) -> Result<Vec<String>> {
        self.prompter
            .multiselect(message, choices, initial, required)
            .with_context(|| format!("Failed to read answer to \"{}\"", message))
    }

    pub fn confirm(&self, message: &str, initial: bool) -> Result<bool> {
        self.prompter
            .confirm(message, initial)
            .with_context(|| format!("Failed to read answer to \"{}\"", message))
    }

    pub fn text(
        &self,
        message: &str,
        default: &str,
        validator: crate::prompt::Validator,
    ) -> Result<String> {
        self.prompter
            .text(message, default, validator)
            .with_context(|| format!("Failed to read answer to \"{}\"", message))
    }
}

async fn write_file(fs: &dyn FileSystem, path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs.create_directory(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs.write_file(path, contents)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// String property, falling back to `default`
pub(crate) fn string_property(properties: &Properties, key: &str, default: &str) -> String {
    properties
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// String-list property, falling back to `default`
pub(crate) fn list_property(properties: &Properties, key: &str, default: &[&str]) -> Vec<String> {
    match properties.get(key).and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

pub(crate) fn bool_property(properties: &Properties, key: &str, default: bool) -> bool {
    properties
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

/// Convert a list of strings to a JSON array
pub(crate) fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// The three-phase lifecycle every module implements
#[async_trait]
pub trait ModuleService: Send + Sync {
    fn id(&self) -> ModuleId;

    /// Artifacts that setting up this module would overwrite
    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact>;

    /// The module's work; returns the properties to persist
    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties>;

    /// Ask whether to set this module up; interaction failures count as "no"
    async fn should_install(&self, ctx: &ModuleContext<'_>) -> bool {
        let id = self.id();
        let enabled = ctx.store.is_module_enabled(id).await;
        match ctx
            .prompter
            .confirm(&format!("Set up {}?", id.display_name()), enabled)
        {
            Ok(answer) => answer,
            Err(e) => {
                ctx.prompter
                    .error(&format!("Could not ask about {}: {}", id.display_name(), e));
                false
            }
        }
    }

    /// Offer to delete existing artifacts. `Ok(false)` aborts this module.
    async fn handle_existing_setup(&self, ctx: &ModuleContext<'_>) -> Result<bool> {
        let existing = self.existing_artifacts(ctx).await;
        if existing.is_empty() {
            return Ok(true);
        }

        let listing = existing
            .iter()
            .map(|artifact| format!("- {}", artifact))
            .collect::<Vec<_>>()
            .join("\n");
        ctx.prompter.note(
            &format!("Existing {} setup", self.id().display_name()),
            &listing,
        );

        let delete = match ctx
            .prompter
            .confirm("Delete these and continue?", false)
        {
            Ok(answer) => answer,
            Err(e) => {
                ctx.prompter.error(&format!("Could not read your answer: {}", e));
                false
            }
        };
        if !delete {
            ctx.prompter.info(&format!(
                "Keeping the existing {} setup",
                self.id().display_name()
            ));
            return Ok(false);
        }

        ctx.remove_artifacts(&existing).await?;
        Ok(true)
    }

    async fn install(&self, ctx: &ModuleContext<'_>) -> Result<SetupResult> {
        let id = self.id();
        if !self.should_install(ctx).await {
            debug!(module = %id, "skipped by user");
            return Ok(SetupResult::skipped());
        }

        let outcome = match self.handle_existing_setup(ctx).await {
            Ok(true) => self.setup(ctx).await,
            Ok(false) => return Ok(SetupResult::skipped()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(properties) => {
                ctx.prompter
                    .success(&format!("{} configured", id.display_name()));
                Ok(SetupResult::installed(normalize(Some(&Value::Object(properties)))))
            }
            Err(e) => {
                ctx.prompter
                    .error(&format!("Failed to set up {}: {:#}", id.display_name(), e));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, Harness};
    use serde_json::json;

    struct FakeModule {
        fail: bool,
    }

    #[async_trait]
    impl ModuleService for FakeModule {
        fn id(&self) -> ModuleId {
            ModuleId::Prettier
        }

        async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
            let mut found = ctx.existing_files(&[".prettierrc"]).await;
            found.extend(ctx.manifest_markers(&["prettier"], &["format"]).await);
            found
        }

        async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            ctx.write(".prettierrc.json", "{}").await?;
            Ok(json!({"printWidth": 80}).as_object().cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_declined_module_has_no_side_effects() {
        let harness = Harness::new().answers([Answer::Confirm(false)]);
        let result = FakeModule { fail: false }
            .install(&harness.context())
            .await
            .unwrap();
        assert_eq!(result, SetupResult::skipped());
        assert_eq!(harness.fs.write_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_defaults_to_stored_enablement() {
        let harness = Harness::new()
            .with_file("/project/.devkit/config.json", r#"{"prettier": {"isEnabled": true}}"#);
        let result = FakeModule { fail: false }
            .install(&harness.context())
            .await
            .unwrap();
        assert!(result.was_installed);
        assert_eq!(result.custom_properties.get("printWidth"), Some(&json!(80)));
        assert!(harness.fs.file("/project/.prettierrc.json").is_some());
    }

    #[tokio::test]
    async fn test_prompt_failure_counts_as_no() {
        let harness = Harness::new().answers([Answer::Fail]);
        let result = FakeModule { fail: false }
            .install(&harness.context())
            .await
            .unwrap();
        assert!(!result.was_installed);
        assert_eq!(harness.prompter.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_keeping_existing_setup_aborts_module() {
        let harness = Harness::new()
            .with_file("/project/.prettierrc", "{}")
            .answers([Answer::Confirm(true), Answer::Confirm(false)]);
        let result = FakeModule { fail: false }
            .install(&harness.context())
            .await
            .unwrap();
        assert_eq!(result, SetupResult::skipped());
        assert_eq!(harness.fs.write_count(), 0);
        assert!(harness.fs.file("/project/.prettierrc").is_some());
        assert_eq!(harness.prompter.notes().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_existing_setup_continues() {
        let harness = Harness::new()
            .with_file("/project/.prettierrc", "{}")
            .with_file(
                "/project/package.json",
                r#"{"name":"demo","prettier":{},"scripts":{"format":"x","build":"tsc"}}"#,
            )
            .answers([Answer::Confirm(true), Answer::Confirm(true)]);
        let result = FakeModule { fail: false }
            .install(&harness.context())
            .await
            .unwrap();
        assert!(result.was_installed);
        assert!(harness.fs.file("/project/.prettierrc").is_none());

        let manifest: Value =
            serde_json::from_str(&harness.fs.file("/project/package.json").unwrap()).unwrap();
        assert_eq!(manifest, json!({"name": "demo", "scripts": {"build": "tsc"}}));
    }

    #[tokio::test]
    async fn test_setup_failure_is_reported_and_returned() {
        let harness = Harness::new().answers([Answer::Confirm(true)]);
        let err = FakeModule { fail: true }
            .install(&harness.context())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert_eq!(harness.prompter.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_write_all_reports_partial_failure() {
        let harness = Harness::new();
        harness.fs.fail_writes_under("/project/.zed");
        let ctx = harness.context();
        let files = vec![
            (".editorconfig".to_string(), "root = true\n".to_string()),
            (".zed/settings.json".to_string(), "{}".to_string()),
        ];
        let err = ctx.write_all(&files).await.unwrap_err();
        assert!(err.to_string().contains("Failed to write 1 of 2 files"));
        assert!(harness.fs.file("/project/.editorconfig").is_some());
    }

    #[tokio::test]
    async fn test_install_dev_dependencies_failure() {
        let harness = Harness::new();
        harness.executor.fail_on("npm install");
        let err = harness
            .context()
            .install_dev_dependencies(&["eslint"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("npm install --save-dev eslint"));
    }

    #[test]
    fn test_property_helpers() {
        let properties = json!({"name": "x", "list": ["a", 1, "b"], "flag": true})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(string_property(&properties, "name", "y"), "x");
        assert_eq!(string_property(&properties, "missing", "y"), "y");
        assert_eq!(list_property(&properties, "list", &[]), vec!["a", "b"]);
        assert_eq!(list_property(&properties, "missing", &["z"]), vec!["z"]);
        assert!(bool_property(&properties, "flag", false));
        assert_eq!(string_array(&["a".to_string()]), json!(["a"]));
    }
}
