//! `init` and `analyze` flows using cliclack

use super::prompter::CliclackPrompter;
use crate::config::{ConfigLocations, ConfigStore, InvocationFlags};
use crate::modules::{ModuleContext, ModuleId, ModuleRegistry, SetupResult};
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::product::ProductConfig;
use crate::project::{FileSystem, TokioFileSystem};
use crate::runtime::{check_package_manager, detect_package_manager, PackageManager, ShellExecutor};
use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Modules requested on the command line
    pub flags: InvocationFlags,

    /// Project directory; defaults to the current directory
    pub cwd: Option<PathBuf>,
}

fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let root = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", root.display());
    }
    Ok(root)
}

/// Run the init command with interactive prompts
pub async fn run_init<C: ProductConfig>(config: &C, args: InitArgs) -> Result<()> {
    cliclack::intro(format!("{} init", config.display_name()))?;

    let root = project_root(args.cwd.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(TokioFileSystem);

    // Step 1: Package manager; its version is only checked once modules will run
    let package_manager = detect_package_manager(fs.as_ref(), &root).await;

    // Step 2: Run the modules
    let store = ConfigStore::new(ConfigLocations::from_product(config, &root), fs.clone());
    let prompter = CliclackPrompter::new();
    let executor = ShellExecutor;
    let registry = ModuleRegistry::builtin();
    let context = ModuleContext {
        project_root: &root,
        fs: fs.as_ref(),
        prompter: &prompter,
        executor: &executor,
        store: &store,
        package_manager,
    };
    let outcome = Orchestrator::new(context, &registry)
        .run_with_preflight(&args.flags, || check_runtime(package_manager))
        .await?;

    // Step 3: Summary and next steps
    let results = match &outcome {
        RunOutcome::Aborted => {
            cliclack::outro("Nothing to do")?;
            return Ok(());
        }
        RunOutcome::Completed(results) => results,
    };
    print_summary(results);
    print_next_steps(config, &outcome.installed(), package_manager)?;

    Ok(())
}

fn check_runtime(package_manager: PackageManager) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking package manager...");

    let info = check_package_manager(package_manager);
    if info.available {
        spinner.stop(format!(
            "Using {} ({})",
            info.name,
            info.version.as_deref().unwrap_or("unknown")
        ));
    } else {
        spinner.stop(format!("{} not found", info.name));
        cliclack::log::warning(format!(
            "Dependencies will be installed with `{}`; install it first or those steps will fail",
            package_manager.command()
        ))?;
    }
    Ok(())
}

fn print_summary(results: &BTreeMap<ModuleId, SetupResult>) {
    println!();
    println!("  {}", "Summary".bold());
    println!();
    for (id, result) in results {
        if result.was_installed {
            println!("  {} {}", "✔".green(), id.display_name());
        } else {
            println!("  {} {}", "-".dimmed(), id.display_name().dimmed());
        }
    }
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    installed: &[ModuleId],
    package_manager: PackageManager,
) -> Result<()> {
    let steps = config.next_steps(installed, package_manager);

    if !steps.is_empty() {
        println!();
        println!("  Next steps");
        println!();

        for (i, step) in steps.iter().enumerate() {
            println!("  {}.  {}", i + 1, step);
        }
        println!();
    }

    cliclack::outro(format!("Docs: {}", config.docs_url()))?;

    Ok(())
}

/// List every module with its stored state; never writes
pub async fn run_analyze<C: ProductConfig>(config: &C, cwd: Option<PathBuf>) -> Result<()> {
    cliclack::intro(format!("{} analyze", config.display_name()))?;

    let root = project_root(cwd.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(TokioFileSystem);
    let store = ConfigStore::new(ConfigLocations::from_product(config, &root), fs);

    match store.discover().await {
        Some(source) => cliclack::log::info(format!(
            "Configuration: {}",
            source.path().display()
        ))?,
        None => cliclack::log::info("No configuration found")?,
    }

    let document = store.get().await;
    let lines: Vec<String> = ModuleId::ALL
        .iter()
        .map(|id| {
            let state = match document.get(*id) {
                Some(module) if module.is_enabled => "enabled".green(),
                Some(_) => "disabled".yellow(),
                None => "not configured".dimmed(),
            };
            format!("{:<20} {}", id.display_name(), state)
        })
        .collect();
    cliclack::note("Modules", lines.join("\n"))?;

    cliclack::outro(format!(
        "Run `{} init` to set up modules",
        config.name()
    ))?;
    Ok(())
}
