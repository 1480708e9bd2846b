//! Devkit Core - Shared library for configuring project development tooling
//!
//! This library sets up tooling modules (linters, formatters, git hooks,
//! release automation, CI workflows, license, editor settings) in a JavaScript
//! project and remembers what was configured between runs.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Collaborators** - File system, process execution and prompting
//!   capabilities (`project`, `runtime`, `prompt`)
//! - **Layer 2: Configuration** - Discovery, normalization and persistence of the
//!   project-local configuration document (`config`)
//! - **Layer 3: Modules** - One lifecycle implementation per tooling module and
//!   the registry that enumerates them (`modules`)
//! - **Layer 4: Orchestration** - Target selection, sequential installs and the
//!   single end-of-run merge (`orchestrator`)
//! - **Layer 5: CLI/TUI Interface** - Optional cliclack-based flows (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompter and command flows
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use devkit_core::{ConfigLocations, ConfigStore, ModuleId, TokioFileSystem};
//! use std::sync::Arc;
//!
//! let store = ConfigStore::new(
//!     ConfigLocations::new("/path/to/project", ".devkit", "devkit"),
//!     Arc::new(TokioFileSystem),
//! );
//! if store.is_module_enabled(ModuleId::Eslint).await {
//!     // ...
//! }
//! ```

pub mod config;
pub mod error;
pub mod modules;
pub mod orchestrator;
pub mod product;
pub mod project;
pub mod prompt;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::{ConfigDocument, ConfigLocations, ConfigStore, InvocationFlags, ModuleConfig};
pub use error::{StoreError, StoreResult};
pub use modules::{ModuleContext, ModuleId, ModuleRegistry, ModuleService, SetupResult};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use product::ProductConfig;
pub use project::{FileSystem, ProjectManifest, TokioFileSystem};
pub use prompt::Prompter;
pub use runtime::{CommandExecutor, PackageManager, ShellExecutor};

#[cfg(feature = "tui")]
pub use tui::{run_analyze, run_init, InitArgs};
