//! Devkit CLI - Development tooling setup for JavaScript projects

use anyhow::Result;
use clap::{Parser, Subcommand};
use devkit_core::tui::InitArgs;
use devkit_core::{InvocationFlags, ModuleId, PackageManager, ProductConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Devkit product configuration
#[derive(Clone)]
pub struct DevkitConfig;

impl ProductConfig for DevkitConfig {
    fn name(&self) -> &'static str {
        "devkit"
    }

    fn display_name(&self) -> &'static str {
        "Devkit"
    }

    fn config_dir(&self) -> &'static str {
        ".devkit"
    }

    fn log_env(&self) -> &'static str {
        "DEVKIT_LOG"
    }

    fn docs_url(&self) -> &'static str {
        "https://github.com/devkit-dev/devkit#readme"
    }

    fn cli_description(&self) -> &'static str {
        "Set up linting, formatting, git hooks, releases and CI in a JavaScript project"
    }

    fn next_steps(&self, installed: &[ModuleId], package_manager: PackageManager) -> Vec<String> {
        let mut steps = Vec::new();
        let has = |id: ModuleId| installed.contains(&id);

        if has(ModuleId::Eslint) {
            steps.push(package_manager.run_command("lint"));
        }
        if has(ModuleId::Prettier) {
            steps.push(package_manager.run_command("format"));
        }
        if has(ModuleId::GitHooks) {
            steps.push(format!(
                "{} (once, if hooks are not active yet)",
                package_manager.run_command("prepare")
            ));
        }
        if has(ModuleId::Commitlint) {
            steps.push("Write commit messages like \"feat: add login page\"".to_string());
        }
        if has(ModuleId::SemanticRelease) || has(ModuleId::Ci) {
            steps.push("Commit the new files and push to trigger the workflows".to_string());
        }
        if has(ModuleId::SemanticRelease) {
            steps.push("Add an NPM_TOKEN secret to your CI settings before the first release".to_string());
        }

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "devkit")]
#[command(about = "Set up linting, formatting, git hooks, releases and CI in a JavaScript project")]
#[command(version)]
pub struct Args {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set up tooling modules in a project
    Init(CliInitArgs),
    /// Show which modules are configured
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug, Default)]
pub struct CliInitArgs {
    /// Set up ESLint
    #[arg(long)]
    pub eslint: bool,

    /// Set up Prettier
    #[arg(long)]
    pub prettier: bool,

    /// Set up lint-staged
    #[arg(long = "lint-staged")]
    pub lint_staged: bool,

    /// Set up commitlint
    #[arg(long)]
    pub commitlint: bool,

    /// Set up git hooks with Husky
    #[arg(long = "git-hooks")]
    pub git_hooks: bool,

    /// Set up semantic-release
    #[arg(long = "semantic-release")]
    pub semantic_release: bool,

    /// Set up CI workflows
    #[arg(long)]
    pub ci: bool,

    /// Add a LICENSE file
    #[arg(long)]
    pub license: bool,

    /// Add editor settings
    #[arg(long = "editor-config")]
    pub editor_config: bool,

    /// Add a .gitignore
    #[arg(long)]
    pub gitignore: bool,

    /// Set up every module
    #[arg(short, long)]
    pub all: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        let flags = InvocationFlags::new()
            .with(ModuleId::Eslint, args.eslint)
            .with(ModuleId::Prettier, args.prettier)
            .with(ModuleId::LintStaged, args.lint_staged)
            .with(ModuleId::Commitlint, args.commitlint)
            .with(ModuleId::GitHooks, args.git_hooks)
            .with(ModuleId::SemanticRelease, args.semantic_release)
            .with(ModuleId::Ci, args.ci)
            .with(ModuleId::License, args.license)
            .with(ModuleId::EditorConfig, args.editor_config)
            .with(ModuleId::Gitignore, args.gitignore)
            .with_all(args.all);
        InitArgs {
            flags,
            cwd: args.cwd,
        }
    }
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

fn init_logging(config: &DevkitConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(config.log_env()).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = DevkitConfig;
    init_logging(&config, args.verbose);
    tracing::debug!(version = CLI_VERSION, "starting");

    let result = match args.command {
        Some(Command::Init(init_args)) => devkit_core::run_init(&config, init_args.into()).await,
        Some(Command::Analyze(analyze_args)) => {
            devkit_core::run_analyze(&config, analyze_args.cwd).await
        }
        // No subcommand provided, default to init with no flags
        None => devkit_core::run_init(&config, InitArgs::default()).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
