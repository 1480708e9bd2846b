//! commitlint configuration

use super::{string_property, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::Choice;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

const CONFIG_FILE: &str = "commitlint.config.js";

/// Commitizen adapter that builds its prompt from the commitlint rules
const CZ_ADAPTER: &str = "@commitlint/cz-commitlint";

const CONFIG_FILES: &[&str] = &[
    CONFIG_FILE,
    "commitlint.config.cjs",
    "commitlint.config.mjs",
    "commitlint.config.ts",
    ".commitlintrc",
    ".commitlintrc.json",
    ".commitlintrc.js",
    ".commitlintrc.yml",
    ".commitlintrc.yaml",
];

/// Shareable config package for a preset name
fn preset_package(preset: &str) -> Option<&'static str> {
    match preset {
        "conventional" => Some("@commitlint/config-conventional"),
        "angular" => Some("@commitlint/config-angular"),
        _ => None,
    }
}

fn render_config(package: &str) -> String {
    format!(
        "export default {{\n  extends: [\"{}\"],\n}};\n",
        package
    )
}

/// Sets up commitlint to validate commit messages
#[derive(Debug, Default)]
pub struct CommitlintModule;

#[async_trait]
impl ModuleService for CommitlintModule {
    fn id(&self) -> ModuleId {
        ModuleId::Commitlint
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let mut found = ctx.existing_files(CONFIG_FILES).await;
        found.extend(ctx.manifest_markers(&["commitlint"], &[]).await);
        found
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::Commitlint).await;
        let initial = string_property(&stored, "preset", "conventional");
        let choices = [
            Choice::new("conventional", "Conventional Commits").with_hint("feat:, fix:, chore: ..."),
            Choice::new("angular", "Angular"),
        ];
        let preset = ctx.select("Which commit convention?", &choices, Some(&initial))?;
        let package = preset_package(&preset)
            .ok_or_else(|| anyhow::anyhow!("Unknown commit convention: {}", preset))?;

        ctx.install_dev_dependencies(&["@commitlint/cli", package, CZ_ADAPTER, "commitizen"])
            .await?;
        ctx.write(CONFIG_FILE, &render_config(package)).await?;

        // `npx cz` reads its adapter from package.json `config.commitizen`
        let mut manifest = ctx.manifest().await?;
        manifest.set_config_entry("commitizen", json!({ "path": CZ_ADAPTER }));
        manifest.save(ctx.fs).await?;

        if !ctx.store.is_module_enabled(ModuleId::GitHooks).await {
            ctx.prompter.info(
                "Enable Git hooks to run commitlint on every commit (commit-msg hook)",
            );
        }

        let mut properties = Properties::new();
        properties.insert("preset".to_string(), Value::String(preset));
        Ok(properties)
    }
}
