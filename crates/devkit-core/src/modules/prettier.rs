//! Prettier config, ignore file and format scripts

use super::{bool_property, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

const CONFIG_FILE: &str = ".prettierrc.json";
const IGNORE_FILE: &str = ".prettierignore";

const CONFIG_FILES: &[&str] = &[
    CONFIG_FILE,
    ".prettierrc",
    ".prettierrc.js",
    ".prettierrc.cjs",
    ".prettierrc.mjs",
    ".prettierrc.yml",
    ".prettierrc.yaml",
    ".prettierrc.toml",
    "prettier.config.js",
    "prettier.config.cjs",
    "prettier.config.mjs",
    IGNORE_FILE,
];

const SCRIPTS: &[(&str, &str)] = &[
    ("format", "prettier --write ."),
    ("format:check", "prettier --check ."),
];

const IGNORE_CONTENT: &str = "node_modules
dist
build
coverage
package-lock.json
pnpm-lock.yaml
yarn.lock
";

const DEFAULT_PRINT_WIDTH: u64 = 80;

fn validate_print_width(input: &str) -> Result<(), String> {
    match input.trim().parse::<u64>() {
        Ok(width) if (40..=200).contains(&width) => Ok(()),
        Ok(_) => Err("Print width must be between 40 and 200".to_string()),
        Err(_) => Err("Print width must be a number".to_string()),
    }
}

/// Sets up Prettier
#[derive(Debug, Default)]
pub struct PrettierModule;

#[async_trait]
impl ModuleService for PrettierModule {
    fn id(&self) -> ModuleId {
        ModuleId::Prettier
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let mut found = ctx.existing_files(CONFIG_FILES).await;
        found.extend(ctx.manifest_markers(&["prettier"], &[]).await);
        found
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::Prettier).await;
        let default_width = stored
            .get("printWidth")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_PRINT_WIDTH);

        let width = ctx.text(
            "Print width",
            &default_width.to_string(),
            validate_print_width,
        )?;
        let print_width: u64 = width
            .trim()
            .parse()
            .with_context(|| format!("Invalid print width: {}", width))?;
        let single_quote = ctx.confirm(
            "Use single quotes?",
            bool_property(&stored, "singleQuote", false),
        )?;

        ctx.install_dev_dependencies(&["prettier"]).await?;

        let config = json!({
            "printWidth": print_width,
            "singleQuote": single_quote,
            "semi": true,
            "trailingComma": "all",
        });
        let mut content = serde_json::to_string_pretty(&config)?;
        content.push('\n');
        ctx.write(CONFIG_FILE, &content).await?;
        ctx.write(IGNORE_FILE, IGNORE_CONTENT).await?;

        let mut manifest = ctx.manifest().await?;
        for (name, command) in SCRIPTS {
            manifest.set_script(name, command);
        }
        manifest.save(ctx.fs).await?;

        let mut properties = Properties::new();
        properties.insert("printWidth".to_string(), json!(print_width));
        properties.insert("singleQuote".to_string(), json!(single_quote));
        Ok(properties)
    }
}
