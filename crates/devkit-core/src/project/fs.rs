//! File-system capability

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

/// File operations the core depends on
///
/// Paths are absolute; callers join them onto the project root.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    async fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Write a file, replacing any previous content. Parent directories must exist.
    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    async fn delete_file(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all of its missing parents
    async fn create_directory(&self, path: &Path) -> io::Result<()>;
}

/// `FileSystem` backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents).await
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn create_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem;
        let nested = dir.path().join("a/b");
        let file = nested.join("c.txt");

        fs.create_directory(&nested).await.unwrap();
        fs.write_file(&file, "hello").await.unwrap();
        assert!(fs.exists(&file).await);
        assert_eq!(fs.read_file(&file).await.unwrap(), "hello");

        fs.delete_file(&file).await.unwrap();
        assert!(!fs.exists(&file).await);
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = TokioFileSystem.read_file(&dir.path().join("missing")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
