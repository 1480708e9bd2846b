//! ESLint flat config and lint scripts

use super::{string_property, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::Choice;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

const CONFIG_FILE: &str = "eslint.config.js";

/// Config files from every ESLint generation
const CONFIG_FILES: &[&str] = &[
    CONFIG_FILE,
    "eslint.config.mjs",
    "eslint.config.cjs",
    "eslint.config.ts",
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.json",
    ".eslintrc.yml",
    ".eslintrc.yaml",
];

const SCRIPTS: &[(&str, &str)] = &[("lint", "eslint ."), ("lint:fix", "eslint . --fix")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    JavaScript,
    TypeScript,
}

impl Flavor {
    fn as_str(&self) -> &'static str {
        match self {
            Flavor::JavaScript => "javascript",
            Flavor::TypeScript => "typescript",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "javascript" | "js" => Some(Flavor::JavaScript),
            "typescript" | "ts" => Some(Flavor::TypeScript),
            _ => None,
        }
    }

    fn packages(&self) -> &'static [&'static str] {
        match self {
            Flavor::JavaScript => &["eslint", "@eslint/js", "globals"],
            Flavor::TypeScript => &["eslint", "@eslint/js", "globals", "typescript-eslint"],
        }
    }

    fn config(&self) -> &'static str {
        match self {
            Flavor::JavaScript => {
                r#"import js from "@eslint/js";
import globals from "globals";

export default [
  js.configs.recommended,
  {
    languageOptions: {
      globals: { ...globals.node, ...globals.browser },
    },
  },
  {
    ignores: ["dist/", "build/", "coverage/"],
  },
];
"#
            }
            Flavor::TypeScript => {
                r#"import js from "@eslint/js";
import globals from "globals";
import tseslint from "typescript-eslint";

export default tseslint.config(
  js.configs.recommended,
  ...tseslint.configs.recommended,
  {
    languageOptions: {
      globals: { ...globals.node, ...globals.browser },
    },
  },
  {
    ignores: ["dist/", "build/", "coverage/"],
  },
);
"#
            }
        }
    }
}

/// Sets up ESLint with a flat config
#[derive(Debug, Default)]
pub struct EslintModule;

impl EslintModule {
    /// TypeScript when the project already carries a tsconfig
    async fn default_flavor(&self, ctx: &ModuleContext<'_>) -> Flavor {
        let stored = ctx.stored_properties(ModuleId::Eslint).await;
        if let Some(flavor) = stored
            .get("flavor")
            .and_then(Value::as_str)
            .and_then(Flavor::parse)
        {
            return flavor;
        }
        if ctx.fs.exists(&ctx.path("tsconfig.json")).await {
            Flavor::TypeScript
        } else {
            Flavor::JavaScript
        }
    }
}

#[async_trait]
impl ModuleService for EslintModule {
    fn id(&self) -> ModuleId {
        ModuleId::Eslint
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let mut found = ctx.existing_files(CONFIG_FILES).await;
        found.extend(ctx.manifest_markers(&["eslintConfig"], &[]).await);
        found
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let initial = self.default_flavor(ctx).await;
        let choices = [
            Choice::new(Flavor::JavaScript.as_str(), "JavaScript"),
            Choice::new(Flavor::TypeScript.as_str(), "TypeScript").with_hint("typescript-eslint"),
        ];
        let answer = ctx.select("Which ESLint setup?", &choices, Some(initial.as_str()))?;
        let flavor = Flavor::parse(&answer).unwrap_or(initial);

        ctx.install_dev_dependencies(flavor.packages()).await?;
        ctx.write(CONFIG_FILE, flavor.config()).await?;

        let mut manifest = ctx.manifest().await?;
        for (name, command) in SCRIPTS {
            manifest.set_script(name, command);
        }
        manifest.save(ctx.fs).await?;

        let mut properties = Properties::new();
        properties.insert(
            "flavor".to_string(),
            Value::String(flavor.as_str().to_string()),
        );
        Ok(properties)
    }
}

/// Stored flavor, used by other modules to pick file globs
pub(crate) fn stored_flavor_is_typescript(properties: &Properties) -> bool {
    string_property(properties, "flavor", "javascript") == Flavor::TypeScript.as_str()
}
