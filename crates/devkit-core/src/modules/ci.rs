//! CI workflows, one file per selected sub-module
//!
//! Stored settings look like
//!
//! ```json
//! {
//!   "provider": "github",
//!   "submodules": ["lint", "test"],
//!   "submoduleProperties": {
//!     "lint": { "isEnabled": true, "nodeVersion": "20", "branches": ["main"] },
//!     "test": true
//!   }
//! }
//! ```
//!
//! Each `submoduleProperties` entry may be a boolean, a canonical object or a
//! bare property bag. All three are read through [`SUBMODULE_SCHEMA`]; an
//! entry that yields no properties is prompted for again with the built-in
//! defaults.

use super::{string_array, Artifact, ModuleContext, ModuleId, ModuleService};
use crate::config::{ModuleConfig, Properties, PropertySchema, ENABLED_KEY};
use crate::prompt::{comma_list, non_empty, split_list, Choice};
use crate::runtime::PackageManager;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Properties a CI sub-module accepts
pub const SUBMODULE_SCHEMA: PropertySchema = PropertySchema::new(&["nodeVersion", "branches"]);

const SUBMODULES: &[(&str, &str)] = &[
    ("lint", "Lint"),
    ("test", "Test"),
    ("build", "Build"),
    ("release", "Release"),
];

const DEFAULT_SUBMODULES: &[&str] = &["lint", "test"];
const DEFAULT_NODE_VERSION: &str = "20";
const DEFAULT_BRANCHES: &str = "main";

const GITLAB_ROOT_FILE: &str = ".gitlab-ci.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    GitHub,
    GitLab,
}

impl Provider {
    fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "github" => Some(Provider::GitHub),
            "gitlab" => Some(Provider::GitLab),
            _ => None,
        }
    }

    fn workflow_path(&self, submodule: &str) -> String {
        match self {
            Provider::GitHub => format!(".github/workflows/{}.yml", submodule),
            Provider::GitLab => format!(".gitlab/ci/{}.yml", submodule),
        }
    }
}

/// Stored `ci` settings
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CiSettings {
    provider: Option<String>,
    submodules: Option<Vec<String>>,
    submodule_properties: Map<String, Value>,
}

impl CiSettings {
    /// Sub-modules to preselect: the stored list, else the enabled entries of
    /// `submoduleProperties`, else the defaults
    fn initial_submodules(&self) -> Vec<String> {
        if let Some(submodules) = &self.submodules {
            return submodules.clone();
        }
        let enabled: Vec<String> = SUBMODULES
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| {
                self.submodule_properties
                    .get(*name)
                    .is_some_and(|raw| ModuleConfig::from_raw(raw).is_enabled)
            })
            .map(str::to_string)
            .collect();
        if enabled.is_empty() {
            DEFAULT_SUBMODULES.iter().map(|s| s.to_string()).collect()
        } else {
            enabled
        }
    }

    fn submodule(&self, name: &str) -> Properties {
        SUBMODULE_SCHEMA.normalize(self.submodule_properties.get(name))
    }
}

/// Settings of one workflow
#[derive(Debug, Clone, PartialEq, Eq)]
struct Workflow {
    name: String,
    node_version: String,
    branches: Vec<String>,
}

impl Workflow {
    fn properties(&self) -> Value {
        json!({
            ENABLED_KEY: true,
            "nodeVersion": self.node_version,
            "branches": self.branches,
        })
    }

    /// Shell commands the job runs
    fn commands(&self, package_manager: PackageManager) -> Vec<String> {
        let run = match self.name.as_str() {
            "release" => package_manager.exec_command("semantic-release"),
            script => package_manager.run_command(script),
        };
        vec![package_manager.clean_install_command().to_string(), run]
    }

    fn title(&self) -> String {
        SUBMODULES
            .iter()
            .find(|(name, _)| *name == self.name)
            .map(|(_, title)| title.to_string())
            .unwrap_or_else(|| self.name.clone())
    }

    fn render_github(&self, package_manager: PackageManager) -> String {
        let branches = self.branches.join(", ");
        let mut out = format!("name: {}\n\non:\n  push:\n    branches: [{}]\n", self.title(), branches);
        if self.name == "release" {
            out.push_str("\npermissions:\n  contents: write\n  issues: write\n  pull-requests: write\n");
        } else {
            out.push_str(&format!("  pull_request:\n    branches: [{}]\n", branches));
        }
        out.push_str(&format!(
            "\njobs:\n  {}:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v4\n",
            self.name
        ));
        if package_manager == PackageManager::Pnpm {
            out.push_str("      - uses: pnpm/action-setup@v4\n");
        }
        out.push_str(&format!(
            "      - uses: actions/setup-node@v4\n        with:\n          node-version: \"{}\"\n",
            self.node_version
        ));
        let commands = self.commands(package_manager);
        let last = commands.len() - 1;
        for (i, command) in commands.iter().enumerate() {
            out.push_str(&format!("      - run: {}\n", command));
            if self.name == "release" && i == last {
                out.push_str(
                    "        env:\n          GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}\n          NPM_TOKEN: ${{ secrets.NPM_TOKEN }}\n",
                );
            }
        }
        out
    }

    fn render_gitlab(&self, package_manager: PackageManager) -> String {
        let mut out = format!(
            "{}:\n  image: node:{}\n  rules:\n",
            self.name, self.node_version
        );
        for branch in &self.branches {
            out.push_str(&format!("    - if: $CI_COMMIT_BRANCH == \"{}\"\n", branch));
        }
        if self.name != "release" {
            out.push_str("    - if: $CI_PIPELINE_SOURCE == \"merge_request_event\"\n");
        }
        out.push_str("  script:\n");
        for command in self.commands(package_manager) {
            out.push_str(&format!("    - {}\n", command));
        }
        out
    }
}

fn render_gitlab_root(workflows: &[Workflow]) -> String {
    let mut out = String::from("include:\n");
    for workflow in workflows {
        out.push_str(&format!(
            "  - local: {}\n",
            Provider::GitLab.workflow_path(&workflow.name)
        ));
    }
    out
}

/// Branches may be stored as a list or as a comma-separated string
fn stored_branches(properties: &Properties) -> Option<String> {
    match properties.get("branches")? {
        Value::Array(items) => {
            let branches: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!branches.is_empty()).then(|| branches.join(", "))
        }
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Sets up CI workflows
#[derive(Debug, Default)]
pub struct CiModule;

impl CiModule {
    async fn prompt_workflow(
        &self,
        ctx: &ModuleContext<'_>,
        settings: &CiSettings,
        name: &str,
    ) -> Result<Workflow> {
        let stored = settings.submodule(name);
        if stored.is_empty() {
            debug!(submodule = name, "no stored properties, using built-in defaults");
        }
        let node_default = stored
            .get("nodeVersion")
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_NODE_VERSION.to_string());
        let branches_default =
            stored_branches(&stored).unwrap_or_else(|| DEFAULT_BRANCHES.to_string());

        let node_version = ctx.text(
            &format!("Node.js version for the {} workflow", name),
            &node_default,
            non_empty,
        )?;
        let branches = ctx.text(
            &format!("Branches triggering the {} workflow (comma separated)", name),
            &branches_default,
            comma_list,
        )?;

        Ok(Workflow {
            name: name.to_string(),
            node_version: node_version.trim().to_string(),
            branches: split_list(&branches),
        })
    }
}

#[async_trait]
impl ModuleService for CiModule {
    fn id(&self) -> ModuleId {
        ModuleId::Ci
    }

    async fn existing_artifacts(&self, ctx: &ModuleContext<'_>) -> Vec<Artifact> {
        let mut candidates: Vec<String> = Vec::new();
        for provider in [Provider::GitHub, Provider::GitLab] {
            candidates.extend(SUBMODULES.iter().map(|(name, _)| provider.workflow_path(name)));
        }
        candidates.push(GITLAB_ROOT_FILE.to_string());
        let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
        ctx.existing_files(&candidates).await
    }

    async fn setup(&self, ctx: &ModuleContext<'_>) -> Result<Properties> {
        let settings: CiSettings = ctx
            .store
            .get_module_config(ModuleId::Ci)
            .await
            .unwrap_or_default();

        let initial_provider = settings
            .provider
            .as_deref()
            .and_then(Provider::parse)
            .unwrap_or(Provider::GitHub);
        let choices = [
            Choice::new(Provider::GitHub.as_str(), "GitHub Actions"),
            Choice::new(Provider::GitLab.as_str(), "GitLab CI"),
        ];
        let answer = ctx.select("Which CI provider?", &choices, Some(initial_provider.as_str()))?;
        let provider = Provider::parse(&answer).unwrap_or(initial_provider);

        let choices: Vec<Choice> = SUBMODULES
            .iter()
            .map(|(name, title)| Choice::new(*name, *title))
            .collect();
        let submodules = ctx.multiselect(
            "Which workflows?",
            &choices,
            &settings.initial_submodules(),
            true,
        )?;

        let mut workflows = Vec::with_capacity(submodules.len());
        for name in &submodules {
            workflows.push(self.prompt_workflow(ctx, &settings, name).await?);
        }

        let mut files: Vec<(String, String)> = workflows
            .iter()
            .map(|workflow| {
                let contents = match provider {
                    Provider::GitHub => workflow.render_github(ctx.package_manager),
                    Provider::GitLab => workflow.render_gitlab(ctx.package_manager),
                };
                (provider.workflow_path(&workflow.name), contents)
            })
            .collect();
        if provider == Provider::GitLab && !workflows.is_empty() {
            files.push((GITLAB_ROOT_FILE.to_string(), render_gitlab_root(&workflows)));
        }
        let written = ctx.write_all(&files).await?;
        debug!(files = ?written, "workflows written");

        // deselected sub-modules are recorded as disabled so a merge cannot revive them
        let submodule_properties: Map<String, Value> = SUBMODULES
            .iter()
            .map(|(name, _)| {
                let entry = match workflows.iter().find(|workflow| workflow.name == *name) {
                    Some(workflow) => workflow.properties(),
                    None => json!({ ENABLED_KEY: false }),
                };
                (name.to_string(), entry)
            })
            .collect();

        let mut properties = Properties::new();
        properties.insert(
            "provider".to_string(),
            Value::String(provider.as_str().to_string()),
        );
        properties.insert("submodules".to_string(), string_array(&submodules));
        properties.insert(
            "submoduleProperties".to_string(),
            Value::Object(submodule_properties),
        );
        Ok(properties)
    }
}
