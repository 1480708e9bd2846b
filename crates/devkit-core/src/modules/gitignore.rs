//! `.gitignore` for Node.js projects

use super::{list_property, string_array, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::Choice;
use anyhow::Result;
use async_trait::async_trait;

const GITIGNORE: &str = ".gitignore";

const BASE: &[&str] = &[
    "# Dependencies",
    "node_modules/",
    "",
    "# Build output",
    "dist/",
    "build/",
    "",
    "# Logs",
    "*.log",
    "npm-debug.log*",
    "yarn-debug.log*",
    "yarn-error.log*",
    "pnpm-debug.log*",
    "",
    "# OS",
    ".DS_Store",
    "Thumbs.db",
];

const EXTRAS: &[(&str, &str, &[&str])] = &[
    ("env", "Environment files", &["# Environment", ".env", ".env.*", "!.env.example"]),
    ("coverage", "Test coverage", &["# Coverage", "coverage/", ".nyc_output/"]),
    ("ide", "Editor folders", &["# Editors", ".idea/", "*.swp", ".vscode/*", "!.vscode/settings.json", "!.vscode/extensions.json"]),
];

fn render(extras: &[String]) -> String {
    let mut lines: Vec<&str> = BASE.to_vec();
    for (key, _, entries) in EXTRAS {
        if extras.iter().any(|extra| extra == key) {
            lines.push("");
            lines.extend_from_slice(entries);
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes `.gitignore`
#[derive(Debug, Default)]
pub struct GitignoreModule;

#[async_trait]
impl ModuleService for GitignoreModule {
    fn id(&self) -> ModuleId {
        ModuleId::Gitignore
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        ctx.existing_files(&[GITIGNORE]).await
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::Gitignore).await;
        let initial = list_property(&stored, "extras", &["env", "coverage"]);
        let choices: Vec<Choice> = EXTRAS
            .iter()
            .map(|(key, label, _)| Choice::new(*key, *label))
            .collect();
        let extras = ctx.multiselect("Also ignore", &choices, &initial, false)?;

        ctx.write(GITIGNORE, &render(&extras)).await?;

        let mut properties = Properties::new();
        properties.insert("extras".to_string(), string_array(&extras));
        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, Harness};
    use serde_json::json;

    #[test]
    fn test_render_base_only() {
        let text = render(&[]);
        assert!(text.starts_with("# Dependencies\nnode_modules/\n"));
        assert!(!text.contains(".env"));
        assert!(text.ends_with(".DS_Store\nThumbs.db\n"));
    }

    #[tokio::test]
    async fn test_extras_appended() {
        let harness = Harness::new().answers([Answer::Confirm(true), Answer::multi(&["coverage"])]);
        let result = GitignoreModule.install(&harness.context()).await.unwrap();

        assert_eq!(result.custom_properties.get("extras"), Some(&json!(["coverage"])));
        let text = harness.fs.file("/project/.gitignore").unwrap();
        assert!(text.ends_with("\n\n# Coverage\ncoverage/\n.nyc_output/\n"));
        assert!(harness.executor.commands().is_empty());
    }

    #[tokio::test]
    async fn test_existing_gitignore_kept_when_declined() {
        let harness = Harness::new()
            .with_file("/project/.gitignore", "target/\n")
            .answers([Answer::Confirm(true), Answer::Confirm(false)]);
        let result = GitignoreModule.install(&harness.context()).await.unwrap();
        assert!(!result.was_installed);
        assert_eq!(harness.fs.file("/project/.gitignore").unwrap(), "target/\n");
    }
}
