//! Runtime detection and external process execution
//!
//! This module provides:
//! - Package manager detection (npm, pnpm, yarn, bun)
//! - The process-execution capability used to install dependencies

pub mod check;
pub mod executor;

pub use check::{check_package_manager, detect_package_manager, PackageManager, RuntimeInfo};
pub use executor::{CommandExecutor, CommandOutcome, ShellExecutor};
