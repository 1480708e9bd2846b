//! Shared editor settings: `.editorconfig`, VS Code and Zed

use super::{list_property, string_array, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::Choice;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

const EDITORCONFIG: &str = "editorconfig";
const VSCODE: &str = "vscode";
const ZED: &str = "zed";

const EDITORCONFIG_CONTENT: &str = "root = true

[*]
charset = utf-8
end_of_line = lf
indent_style = space
indent_size = 2
insert_final_newline = true
trim_trailing_whitespace = true

[*.md]
trim_trailing_whitespace = false
";

/// Files each editor choice produces
fn editor_files(editor: &str) -> &'static [&'static str] {
    match editor {
        EDITORCONFIG => &[".editorconfig"],
        VSCODE => &[".vscode/settings.json", ".vscode/extensions.json"],
        ZED => &[".zed/settings.json"],
        _ => &[],
    }
}

fn pretty(value: &Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// Rendered files for one editor, with settings tuned to the enabled tools
fn render(editor: &str, eslint: bool, prettier: bool) -> Result<Vec<(String, String)>> {
    let files = match editor {
        EDITORCONFIG => vec![(".editorconfig".to_string(), EDITORCONFIG_CONTENT.to_string())],
        VSCODE => {
            let mut settings = json!({
                "editor.formatOnSave": prettier,
                "files.eol": "\n",
            });
            let mut extensions = vec!["editorconfig.editorconfig"];
            if prettier {
                settings["editor.defaultFormatter"] = json!("esbenp.prettier-vscode");
                extensions.push("esbenp.prettier-vscode");
            }
            if eslint {
                settings["editor.codeActionsOnSave"] = json!({"source.fixAll.eslint": "explicit"});
                extensions.push("dbaeumer.vscode-eslint");
            }
            vec![
                (".vscode/settings.json".to_string(), pretty(&settings)?),
                (
                    ".vscode/extensions.json".to_string(),
                    pretty(&json!({ "recommendations": extensions }))?,
                ),
            ]
        }
        ZED => {
            let format_on_save = if prettier { "on" } else { "off" };
            let mut settings = json!({
                "format_on_save": format_on_save,
                "tab_size": 2,
            });
            if prettier {
                settings["formatter"] = json!({
                    "external": {
                        "command": "prettier",
                        "arguments": ["--stdin-filepath", "{buffer_path}"],
                    }
                });
            }
            if eslint {
                settings["code_actions_on_format"] = json!({"source.fixAll.eslint": true});
            }
            vec![(".zed/settings.json".to_string(), pretty(&settings)?)]
        }
        other => anyhow::bail!("Unknown editor: {}", other),
    };
    Ok(files)
}

/// Writes editor settings for the selected editors
#[derive(Debug, Default)]
pub struct EditorConfigModule;

#[async_trait]
impl ModuleService for EditorConfigModule {
    fn id(&self) -> ModuleId {
        ModuleId::EditorConfig
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let candidates: Vec<&str> = [EDITORCONFIG, VSCODE, ZED]
            .iter()
            .flat_map(|editor| editor_files(editor).iter().copied())
            .collect();
        ctx.existing_files(&candidates).await
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::EditorConfig).await;
        let initial = list_property(&stored, "editors", &[EDITORCONFIG, VSCODE]);
        let choices = [
            Choice::new(EDITORCONFIG, "EditorConfig").with_hint(".editorconfig"),
            Choice::new(VSCODE, "VS Code").with_hint(".vscode/"),
            Choice::new(ZED, "Zed").with_hint(".zed/settings.json"),
        ];
        let editors = ctx.multiselect("Which editors?", &choices, &initial, true)?;

        let eslint = ctx.store.is_module_enabled(ModuleId::Eslint).await;
        let prettier = ctx.store.is_module_enabled(ModuleId::Prettier).await;
        let mut files = Vec::new();
        for editor in &editors {
            files.extend(render(editor, eslint, prettier)?);
        }
        ctx.write_all(&files).await?;

        let mut properties = Properties::new();
        properties.insert("editors".to_string(), string_array(&editors));
        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Answer, Harness};

    #[test]
    fn test_vscode_follows_enabled_tools() {
        let files = render(VSCODE, true, false).unwrap();
        let settings: Value = serde_json::from_str(&files[0].1).unwrap();
        assert_eq!(settings["editor.formatOnSave"], json!(false));
        assert!(settings.get("editor.defaultFormatter").is_none());

        let extensions: Value = serde_json::from_str(&files[1].1).unwrap();
        assert_eq!(
            extensions["recommendations"],
            json!(["editorconfig.editorconfig", "dbaeumer.vscode-eslint"])
        );
        assert!(render("vim", false, false).is_err());
    }

    #[tokio::test]
    async fn test_selected_editors_fan_out() {
        let harness = Harness::new()
            .with_file("/project/.devkit/config.json", r#"{"prettier": true}"#)
            .answers([Answer::Confirm(true), Answer::multi(&["editorconfig", "zed"])]);
        let result = EditorConfigModule.install(&harness.context()).await.unwrap();

        assert_eq!(
            result.custom_properties.get("editors"),
            Some(&json!(["editorconfig", "zed"]))
        );
        assert_eq!(
            harness.fs.file("/project/.editorconfig").unwrap(),
            EDITORCONFIG_CONTENT
        );
        let zed: Value =
            serde_json::from_str(&harness.fs.file("/project/.zed/settings.json").unwrap()).unwrap();
        assert_eq!(zed["format_on_save"], json!("on"));
        assert!(harness.fs.file("/project/.vscode/settings.json").is_none());
    }

    #[tokio::test]
    async fn test_failed_editor_keeps_siblings() {
        let harness = Harness::new().answers([
            Answer::Confirm(true),
            Answer::multi(&["editorconfig", "vscode", "zed"]),
        ]);
        harness.fs.fail_writes_under("/project/.vscode");
        let err = EditorConfigModule
            .install(&harness.context())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to write 2 of 4 files"));
        assert!(harness.fs.file("/project/.editorconfig").is_some());
        assert!(harness.fs.file("/project/.zed/settings.json").is_some());
    }

    #[tokio::test]
    async fn test_existing_editor_files_detected() {
        let harness = Harness::new().with_file("/project/.vscode/extensions.json", "{}");
        let found = EditorConfigModule
            .existing_artifacts(&harness.context())
            .await;
        assert_eq!(
            found,
            vec![Artifact::File(".vscode/extensions.json".to_string())]
        );
    }
}
