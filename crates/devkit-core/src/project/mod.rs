//! Project-facing primitives
//!
//! This module provides:
//! - The file-system capability used by every module (`FileSystem`)
//! - The `package.json` document wrapper (`ProjectManifest`)

pub mod fs;
pub mod manifest;

pub use fs::{FileSystem, TokioFileSystem};
pub use manifest::{ProjectManifest, MANIFEST_FILE};
