//! Module lookup by identifier

use super::ci::CiModule;
use super::commitlint::CommitlintModule;
use super::editor_config::EditorConfigModule;
use super::eslint::EslintModule;
use super::git_hooks::GitHooksModule;
use super::gitignore::GitignoreModule;
use super::license::LicenseModule;
use super::lint_staged::LintStagedModule;
use super::prettier::PrettierModule;
use super::semantic_release::SemanticReleaseModule;
use super::{ModuleId, ModuleService};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered modules, iterated in [`ModuleId::ALL`] order
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<ModuleId, Arc<dyn ModuleService>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in module
    pub fn builtin() -> Self {
        Self::new()
            .register(EslintModule)
            .register(PrettierModule)
            .register(LintStagedModule)
            .register(CommitlintModule)
            .register(GitHooksModule)
            .register(SemanticReleaseModule)
            .register(CiModule)
            .register(LicenseModule)
            .register(EditorConfigModule)
            .register(GitignoreModule)
    }

    /// Add a module, replacing any registered under the same id
    pub fn register(mut self, module: impl ModuleService + 'static) -> Self {
        self.modules.insert(module.id(), Arc::new(module));
        self
    }

    pub fn get(&self, id: ModuleId) -> Option<Arc<dyn ModuleService>> {
        self.modules.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.ids())
            .finish()
    }
}
