//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface the binary implements to brand the tool
//! and to decide where project-local configuration lives.

use crate::modules::ModuleId;
use crate::runtime::PackageManager;

/// Configuration trait for the CLI product
///
/// The binary implements this trait to define:
/// - Product identity (name, display name)
/// - Where the persisted configuration is discovered
/// - Documentation links
/// - Post-setup instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Hidden project directory holding the persisted configuration
    fn config_dir(&self) -> &'static str;

    /// Namespaced key inside `package.json` that may hold the configuration
    fn manifest_key(&self) -> &'static str {
        self.name()
    }

    /// Environment variable holding the tracing filter
    fn log_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Generate the "next steps" instructions after a run
    fn next_steps(&self, installed: &[ModuleId], package_manager: PackageManager) -> Vec<String>;
}
