//! semantic-release configuration

use super::{bool_property, list_property, string_array, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::{comma_list, split_list};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

const CONFIG_FILE: &str = ".releaserc.json";
const RELEASE_SCRIPT: &str = "release";

const CONFIG_FILES: &[&str] = &[
    CONFIG_FILE,
    ".releaserc",
    ".releaserc.yml",
    ".releaserc.yaml",
    ".releaserc.js",
    ".releaserc.cjs",
    "release.config.js",
    "release.config.cjs",
    "release.config.mjs",
];

fn build_config(branches: &[String], npm_publish: bool) -> Value {
    json!({
        "branches": branches,
        "plugins": [
            "@semantic-release/commit-analyzer",
            "@semantic-release/release-notes-generator",
            ["@semantic-release/npm", { "npmPublish": npm_publish }],
            "@semantic-release/github",
        ],
    })
}

/// Sets up semantic-release
#[derive(Debug, Default)]
pub struct SemanticReleaseModule;

#[async_trait]
impl ModuleService for SemanticReleaseModule {
    fn id(&self) -> ModuleId {
        ModuleId::SemanticRelease
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let mut found = ctx.existing_files(CONFIG_FILES).await;
        found.extend(ctx.manifest_markers(&["release"], &[RELEASE_SCRIPT]).await);
        found
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::SemanticRelease).await;
        let default_branches = list_property(&stored, "branches", &["main"]).join(", ");

        let answer = ctx.text("Release branches (comma separated)", &default_branches, comma_list)?;
        let branches = split_list(&answer);
        let npm_publish = ctx.confirm(
            "Publish to the npm registry?",
            bool_property(&stored, "npmPublish", false),
        )?;

        ctx.install_dev_dependencies(&["semantic-release"]).await?;

        let mut content = serde_json::to_string_pretty(&build_config(&branches, npm_publish))?;
        content.push('\n');
        ctx.write(CONFIG_FILE, &content).await?;

        let mut manifest = ctx.manifest().await?;
        manifest.set_script(RELEASE_SCRIPT, "semantic-release");
        manifest.save(ctx.fs).await?;

        let mut properties = Properties::new();
        properties.insert("branches".to_string(), string_array(&branches));
        properties.insert("npmPublish".to_string(), Value::Bool(npm_publish));
        Ok(properties)
    }
}
