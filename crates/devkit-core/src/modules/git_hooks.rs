//! Git hooks managed by Husky

use super::{list_property, string_array, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::Properties;
use crate::prompt::Choice;
use crate::runtime::PackageManager;
use anyhow::Result;
use async_trait::async_trait;

const HOOK_DIR: &str = ".husky";
const PREPARE_SCRIPT: &str = "prepare";

/// Hooks this module knows how to write
const HOOKS: &[&str] = &["pre-commit", "commit-msg", "pre-push"];

/// Hook body for the current project state
fn hook_body(
    hook: &str,
    package_manager: PackageManager,
    lint_staged: bool,
    commitlint: bool,
) -> String {
    match hook {
        "pre-commit" if lint_staged => format!("{}\n", package_manager.exec_command("lint-staged")),
        "pre-commit" => format!("{}\n", package_manager.run_command("lint")),
        "commit-msg" if commitlint => format!(
            "{} --edit \"$1\"\n",
            package_manager.exec_command("commitlint")
        ),
        "commit-msg" => "# add commit message checks here\n".to_string(),
        _ => format!("{}\n", package_manager.run_command("test")),
    }
}

/// Sets up Husky-managed git hooks
#[derive(Debug, Default)]
pub struct GitHooksModule;

#[async_trait]
impl ModuleService for GitHooksModule {
    fn id(&self) -> ModuleId {
        ModuleId::GitHooks
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let hook_files: Vec<String> = HOOKS
            .iter()
            .map(|hook| format!("{}/{}", HOOK_DIR, hook))
            .collect();
        let candidates: Vec<&str> = hook_files.iter().map(String::as_str).collect();
        let mut found = ctx.existing_files(&candidates).await;
        found.extend(ctx.manifest_markers(&["husky"], &[PREPARE_SCRIPT]).await);
        found
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let stored = ctx.stored_properties(ModuleId::GitHooks).await;
        let lint_staged = ctx.store.is_module_enabled(ModuleId::LintStaged).await;
        let commitlint = ctx.store.is_module_enabled(ModuleId::Commitlint).await;

        let mut suggested = vec!["pre-commit"];
        if commitlint {
            suggested.push("commit-msg");
        }
        let initial = list_property(&stored, "hooks", &suggested);
        let choices: Vec<Choice> = HOOKS
            .iter()
            .map(|hook| Choice::new(*hook, *hook))
            .collect();
        let hooks = ctx.multiselect("Which git hooks?", &choices, &initial, true)?;

        ctx.install_dev_dependencies(&["husky"]).await?;

        let files: Vec<(String, String)> = hooks
            .iter()
            .map(|hook| {
                (
                    format!("{}/{}", HOOK_DIR, hook),
                    hook_body(hook, ctx.package_manager, lint_staged, commitlint),
                )
            })
            .collect();
        ctx.write_all(&files).await?;

        let mut manifest = ctx.manifest().await?;
        manifest.set_script(PREPARE_SCRIPT, "husky");
        manifest.save(ctx.fs).await?;

        let mut properties = Properties::new();
        properties.insert("hooks".to_string(), string_array(&hooks));
        Ok(properties)
    }
}
