//! Module identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every supported module kind.
///
/// Declaration order is the registry order: modules run in this order and
/// persisted documents list them in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleId {
    Eslint,
    Prettier,
    LintStaged,
    Commitlint,
    GitHooks,
    SemanticRelease,
    Ci,
    License,
    EditorConfig,
    Gitignore,
}

impl ModuleId {
    /// The closed set, in registry order
    pub const ALL: [ModuleId; 10] = [
        ModuleId::Eslint,
        ModuleId::Prettier,
        ModuleId::LintStaged,
        ModuleId::Commitlint,
        ModuleId::GitHooks,
        ModuleId::SemanticRelease,
        ModuleId::Ci,
        ModuleId::License,
        ModuleId::EditorConfig,
        ModuleId::Gitignore,
    ];

    /// Key used in the persisted configuration
    pub fn key(&self) -> &'static str {
        match self {
            ModuleId::Eslint => "eslint",
            ModuleId::Prettier => "prettier",
            ModuleId::LintStaged => "lintStaged",
            ModuleId::Commitlint => "commitlint",
            ModuleId::GitHooks => "gitHooks",
            ModuleId::SemanticRelease => "semanticRelease",
            ModuleId::Ci => "ci",
            ModuleId::License => "license",
            ModuleId::EditorConfig => "editorConfig",
            ModuleId::Gitignore => "gitignore",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleId::Eslint => "ESLint",
            ModuleId::Prettier => "Prettier",
            ModuleId::LintStaged => "lint-staged",
            ModuleId::Commitlint => "commitlint",
            ModuleId::GitHooks => "Git hooks (Husky)",
            ModuleId::SemanticRelease => "semantic-release",
            ModuleId::Ci => "CI workflows",
            ModuleId::License => "License",
            ModuleId::EditorConfig => "Editor config",
            ModuleId::Gitignore => ".gitignore",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("Unknown module: {}", s))
    }
}
