//! lint-staged configuration

use super::eslint::stored_flavor_is_typescript;
use super::{list_property, string_array, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::Choice;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

const CONFIG_FILE: &str = ".lintstagedrc.json";

const CONFIG_FILES: &[&str] = &[
    CONFIG_FILE,
    ".lintstagedrc",
    ".lintstagedrc.js",
    ".lintstagedrc.cjs",
    ".lintstagedrc.mjs",
    ".lintstagedrc.yml",
    ".lintstagedrc.yaml",
    "lint-staged.config.js",
    "lint-staged.config.mjs",
];

const TASK_LINT: &str = "lint";
const TASK_FORMAT: &str = "format";

/// Build the glob → commands map for the selected tasks
fn build_config(tasks: &[String], typescript: bool) -> Value {
    let lint = tasks.iter().any(|t| t == TASK_LINT);
    let format = tasks.iter().any(|t| t == TASK_FORMAT);
    let scripts_glob = if typescript {
        "*.{js,jsx,ts,tsx}"
    } else {
        "*.{js,jsx,mjs,cjs}"
    };

    let mut config = Map::new();
    let mut script_commands = Vec::new();
    if lint {
        script_commands.push("eslint --fix");
    }
    if format {
        script_commands.push("prettier --write");
    }
    if !script_commands.is_empty() {
        config.insert(scripts_glob.to_string(), json!(script_commands));
    }
    if format {
        config.insert(
            "*.{json,md,css,scss,yml,yaml}".to_string(),
            json!(["prettier --write"]),
        );
    }
    Value::Object(config)
}

/// Sets up lint-staged to run linters on staged files
#[derive(Debug, Default)]
pub struct LintStagedModule;

#[async_trait]
impl ModuleService for LintStagedModule {
    fn id(&self) -> ModuleId {
        ModuleId::LintStaged
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let mut found = ctx.existing_files(CONFIG_FILES).await;
        found.extend(ctx.manifest_markers(&["lint-staged"], &[]).await);
        found
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::LintStaged).await;
        let mut suggested = Vec::new();
        if ctx.store.is_module_enabled(ModuleId::Eslint).await {
            suggested.push(TASK_LINT);
        }
        if ctx.store.is_module_enabled(ModuleId::Prettier).await {
            suggested.push(TASK_FORMAT);
        }
        if suggested.is_empty() {
            suggested = vec![TASK_LINT, TASK_FORMAT];
        }
        let initial = list_property(&stored, "tasks", &suggested);

        let choices = [
            Choice::new(TASK_LINT, "Lint staged scripts").with_hint("eslint --fix"),
            Choice::new(TASK_FORMAT, "Format staged files").with_hint("prettier --write"),
        ];
        let tasks = ctx.multiselect("What should run on staged files?", &choices, &initial, true)?;

        let eslint = ctx.stored_properties(ModuleId::Eslint).await;
        let config = build_config(&tasks, stored_flavor_is_typescript(&eslint));

        ctx.install_dev_dependencies(&["lint-staged"]).await?;
        let mut content = serde_json::to_string_pretty(&config)?;
        content.push('\n');
        ctx.write(CONFIG_FILE, &content).await?;

        let mut properties = Properties::new();
        properties.insert("tasks".to_string(), string_array(&tasks));
        Ok(properties)
    }
}
