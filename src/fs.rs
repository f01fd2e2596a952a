//! File system abstraction for testability.

use async_trait::async_trait;
use std::path::Path;

/// Abstraction over the file system operations the planner and fetcher need.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Creates all directories in the given path. Existing directories are
    /// not an error.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Creates (or truncates) a file at the given path for writing.
    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File>;

    /// Removes a file.
    async fn remove_file(&self, path: &Path) -> std::io::Result<()>;
}

/// Default file system implementation using `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    /// Creates a new `TokioFileSystem` instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::create(path).await
    }

    async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// File system used for dry runs: directories are never created and files
/// cannot be opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunFileSystem;

#[async_trait]
impl FileSystem for DryRunFileSystem {
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        log::debug!("Dry run: would create {}", path.display());
        Ok(())
    }

    async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            format!("dry run: not writing {}", path.display()),
        ))
    }

    async fn remove_file(&self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

/// Recording file system shared by planner and fetcher tests.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records directory and removal calls. Files are really created so
    /// fetch tests can stream into them.
    #[derive(Default)]
    pub struct RecordingFs {
        dirs: Mutex<Vec<PathBuf>>,
        removed: Mutex<Vec<PathBuf>>,
        fail_dirs: AtomicBool,
    }

    impl RecordingFs {
        pub fn failing_dirs() -> Self {
            let fs = Self::default();
            fs.fail_dirs.store(true, Ordering::SeqCst);
            fs
        }

        pub fn dirs(&self) -> Vec<PathBuf> {
            self.dirs.lock().unwrap().clone()
        }

        pub fn removed(&self) -> Vec<PathBuf> {
            self.removed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FileSystem for RecordingFs {
        async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
            if self.fail_dirs.load(Ordering::SeqCst) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                ));
            }
            self.dirs.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        async fn create_file(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
            tokio::fs::File::create(path).await
        }

        async fn remove_file(&self, path: &Path) -> std::io::Result<()> {
            self.removed.lock().unwrap().push(path.to_path_buf());
            tokio::fs::remove_file(path).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn tokio_fs_create_dir_all() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("Show (2020) [tmdbid-1]/Season 01");

        let fs = TokioFileSystem::new();
        fs.create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn tokio_fs_create_dir_all_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");

        let fs = TokioFileSystem::new();
        fs.create_dir_all(&nested).await.unwrap();
        fs.create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn tokio_fs_create_and_remove_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.mkv");

        let fs = TokioFileSystem::new();
        let _file = fs.create_file(&path).await.unwrap();
        assert!(path.is_file());

        fs.remove_file(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dry_run_fs_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("Show (2020) [tmdbid-1]/Season 01");

        let fs = DryRunFileSystem;
        fs.create_dir_all(&nested).await.unwrap();
        assert!(!nested.exists());

        let err = fs.create_file(&nested.join("ep.mkv")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
    }
}
