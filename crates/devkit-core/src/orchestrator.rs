//! Top-level driver of one `init` run
//!
//! Picks the target modules, installs them one after another in registry
//! order and folds their results into the configuration with a single merge
//! at the end. A module failure propagates immediately: later modules are not
//! attempted and nothing from the run is persisted.

use crate::config::{from_setup_results, to_invocation_flags, InvocationFlags};
use crate::modules::{ModuleContext, ModuleId, ModuleRegistry, SetupResult};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every stored module is disabled and nothing was requested
    Aborted,
    /// Every targeted module ran; results keyed by module
    Completed(BTreeMap<ModuleId, SetupResult>),
}

impl RunOutcome {
    /// Modules installed during the run, in registry order
    pub fn installed(&self) -> Vec<ModuleId> {
        match self {
            RunOutcome::Aborted => Vec::new(),
            RunOutcome::Completed(results) => results
                .iter()
                .filter(|(_, result)| result.was_installed)
                .map(|(id, _)| *id)
                .collect(),
        }
    }
}

/// Runs modules against one project
pub struct Orchestrator<'a> {
    context: ModuleContext<'a>,
    registry: &'a ModuleRegistry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(context: ModuleContext<'a>, registry: &'a ModuleRegistry) -> Self {
        Self { context, registry }
    }

    /// Modules to install for the given flags; `None` means there is nothing
    /// to do
    pub async fn targets(&self, flags: &InvocationFlags) -> Option<Vec<ModuleId>> {
        let has_document = self.context.store.exists().await;
        let target_flags = if flags.any_enabled() || !has_document {
            flags.clone()
        } else {
            let derived = to_invocation_flags(&self.context.store.get().await);
            debug!(modules = derived.len(), "targets derived from stored configuration");
            derived
        };

        if !target_flags.any_enabled() && has_document {
            return None;
        }
        if target_flags.all() || !target_flags.any_enabled() {
            return Some(ModuleId::ALL.to_vec());
        }
        Some(target_flags.enabled())
    }

    pub async fn run(&self, flags: &InvocationFlags) -> Result<RunOutcome> {
        self.run_with_preflight(flags, || Ok(())).await
    }

    /// Like [`run`](Self::run), calling `preflight` once the run is known to
    /// go ahead and before the first module starts. An aborted run never
    /// calls it.
    pub async fn run_with_preflight<F>(&self, flags: &InvocationFlags, preflight: F) -> Result<RunOutcome>
    where
        F: FnOnce() -> Result<()>,
    {
        let Some(targets) = self.targets(flags).await else {
            self.context
                .prompter
                .info("Every configured module is disabled. Pass a module flag or --all to set one up.");
            return Ok(RunOutcome::Aborted);
        };
        preflight()?;
        debug!(?targets, "running modules");

        let mut results = BTreeMap::new();
        for id in targets {
            let module = self
                .registry
                .get(id)
                .with_context(|| format!("No module registered for {}", id))?;
            let result = module.install(&self.context).await?;
            debug!(module = %id, installed = result.was_installed, "module finished");
            results.insert(id, result);
        }

        let partial = from_setup_results(&results);
        if let Err(e) = self.context.store.merge(&partial).await {
            warn!(error = %e, "failed to save configuration");
            self.context
                .prompter
                .warning(&format!("Could not save the configuration: {}", e));
        }

        Ok(RunOutcome::Completed(results))
    }
}
