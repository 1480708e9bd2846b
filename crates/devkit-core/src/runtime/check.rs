//! Package manager detection for npm, pnpm, yarn and bun

use crate::project::FileSystem;
use std::fmt;
use std::path::Path;
use std::process::Command;

/// Supported JavaScript package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

/// Lockfiles in detection priority order
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("package-lock.json", PackageManager::Npm),
];

impl PackageManager {
    /// Binary name
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "Yarn",
            PackageManager::Bun => "Bun",
        }
    }

    /// Command installing the given packages as dev dependencies
    pub fn install_dev_command(&self, packages: &[&str]) -> String {
        let base = match self {
            PackageManager::Npm => "npm install --save-dev",
            PackageManager::Pnpm => "pnpm add --save-dev",
            PackageManager::Yarn => "yarn add --dev",
            PackageManager::Bun => "bun add --dev",
        };
        format!("{} {}", base, packages.join(" "))
    }

    /// Lockfile-exact install, as run on CI
    pub fn clean_install_command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm ci",
            PackageManager::Pnpm => "pnpm install --frozen-lockfile",
            PackageManager::Yarn => "yarn install --frozen-lockfile",
            PackageManager::Bun => "bun install --frozen-lockfile",
        }
    }

    /// Command running a `package.json` script
    pub fn run_command(&self, script: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm run {}", script),
            _ => format!("{} {}", self.command(), script),
        }
    }

    /// Command executing a package binary without installing it globally
    pub fn exec_command(&self, binary: &str) -> String {
        match self {
            PackageManager::Npm => format!("npx {}", binary),
            PackageManager::Pnpm => format!("pnpm exec {}", binary),
            PackageManager::Yarn => format!("yarn {}", binary),
            PackageManager::Bun => format!("bunx {}", binary),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Detect the package manager from the lockfile in the project root, defaulting to npm
pub async fn detect_package_manager(fs: &dyn FileSystem, project_root: &Path) -> PackageManager {
    for (lockfile, manager) in LOCKFILES {
        if fs.exists(&project_root.join(lockfile)).await {
            return *manager;
        }
    }
    PackageManager::default()
}

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether the package manager binary is available
pub fn check_package_manager(manager: PackageManager) -> RuntimeInfo {
    let output = Command::new(manager.command()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name: manager.display_name(),
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name: manager.display_name(),
            version: None,
            available: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFileSystem;

    #[tokio::test]
    async fn test_detect_defaults_to_npm() {
        let fs = MemoryFileSystem::new();
        let manager = detect_package_manager(&fs, Path::new("/project")).await;
        assert_eq!(manager, PackageManager::Npm);
    }

    #[tokio::test]
    async fn test_detect_prefers_pnpm_lockfile() {
        let fs = MemoryFileSystem::new()
            .with_file("/project/package-lock.json", "{}")
            .with_file("/project/pnpm-lock.yaml", "");
        let manager = detect_package_manager(&fs, Path::new("/project")).await;
        assert_eq!(manager, PackageManager::Pnpm);
    }

    #[tokio::test]
    async fn test_detect_bun_text_lockfile() {
        let fs = MemoryFileSystem::new().with_file("/project/bun.lock", "");
        let manager = detect_package_manager(&fs, Path::new("/project")).await;
        assert_eq!(manager, PackageManager::Bun);
    }

    #[test]
    fn test_install_dev_commands() {
        assert_eq!(
            PackageManager::Npm.install_dev_command(&["eslint", "@eslint/js"]),
            "npm install --save-dev eslint @eslint/js"
        );
        assert_eq!(
            PackageManager::Yarn.install_dev_command(&["prettier"]),
            "yarn add --dev prettier"
        );
    }

    #[test]
    fn test_run_and_exec_commands() {
        assert_eq!(PackageManager::Npm.run_command("lint"), "npm run lint");
        assert_eq!(PackageManager::Pnpm.run_command("lint"), "pnpm lint");
        assert_eq!(PackageManager::Bun.exec_command("husky"), "bunx husky");
        assert_eq!(PackageManager::Npm.clean_install_command(), "npm ci");
    }

    #[test]
    fn test_check_package_manager_reports_name() {
        let info = check_package_manager(PackageManager::Npm);
        assert_eq!(info.name, "npm");
        assert_eq!(info.available, info.version.is_some());
    }
}
