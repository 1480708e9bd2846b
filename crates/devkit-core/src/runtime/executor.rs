//! External process execution
//!
//! Commands run through `sh -c` in the project directory. There is no timeout:
//! a hung installer keeps the run waiting until the user interrupts it.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// Result of running an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Captured standard error, used in failure reports
    pub stderr: String,
}

impl CommandOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stderr: stderr.into(),
        }
    }
}

/// Process-execution capability
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a shell command in `cwd`.
    ///
    /// `Err` means the command could not be started at all; a command that ran
    /// and exited non-zero is reported through `CommandOutcome::success`.
    async fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutcome>;
}

/// `CommandExecutor` spawning `sh -c <command>`
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutcome> {
        debug!(command, cwd = %cwd.display(), "running command");

        let output = TokioCommand::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to start `{}`", command))?;

        if output.status.success() {
            Ok(CommandOutcome::succeeded())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(
                command,
                code = output.status.code().unwrap_or(-1),
                "command failed"
            );
            Ok(CommandOutcome::failed(stderr))
        }
    }
}
