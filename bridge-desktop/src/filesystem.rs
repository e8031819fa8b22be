//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

const APP_DIR: &str = "hymnal-core";

/// Tokio-based file system implementation
///
/// All paths are used as given; the cache directory defaults to the OS cache
/// location (`~/.cache/hymnal-core` on Linux).
pub struct TokioFileSystem {
    cache_dir: PathBuf,
}

impl TokioFileSystem {
    /// Create a new file system accessor with the platform cache directory
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);

        Self { cache_dir }
    }

    /// Create a new file system accessor rooted somewhere else
    pub fn with_cache_directory(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }

    fn to_utc(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
        time.ok().map(DateTime::<Utc>::from)
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn get_cache_directory(&self) -> Result<PathBuf> {
        if !fs::try_exists(&self.cache_dir)
            .await
            .map_err(Self::map_io_error)?
        {
            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(Self::map_io_error)?;
            debug!(path = ?self.cache_dir, "Created cache directory");
        }
        Ok(self.cache_dir.clone())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::metadata(path).await.map_err(Self::map_io_error)?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: Self::to_utc(metadata.modified()),
            is_directory: metadata.is_dir(),
        })
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(Self::map_io_error)
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        fs::write(path, data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            self.create_dir_all(parent).await?;
        }

        fs::rename(from, to).await.map_err(Self::map_io_error)?;
        debug!(from = ?from, to = ?to, "Renamed file");
        Ok(())
    }

    async fn set_modified(&self, path: &Path, time: DateTime<Utc>) -> Result<()> {
        let path = path.to_path_buf();
        let stamp = SystemTime::from(time);

        // std exposes set_modified on File only; run it off the executor.
        tokio::task::spawn_blocking(move || {
            std::fs::OpenOptions::new()
                .write(true)
                .open(&path)?
                .set_modified(stamp)
        })
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("set_modified task failed: {}", e)))?
        .map_err(Self::map_io_error)
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }

    async fn delete_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted directory");
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(path).await.map_err(Self::map_io_error)?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(Self::map_io_error)?
        {
            entries.push(entry.path());
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_custom_cache_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("cache");
        let fs = TokioFileSystem::with_cache_directory(&root);

        assert_eq!(fs.get_cache_directory().await.unwrap(), root);
        assert!(fs.exists(&root).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_read_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path());
        let file = dir.path().join("audio_cache").join("1985_001.mp3");

        let data = Bytes::from_static(b"ID3 fake mp3");
        fs.write_file(&file, data.clone()).await.unwrap();
        assert_eq!(fs.read_file(&file).await.unwrap(), data);
        assert_eq!(fs.metadata(&file).await.unwrap().size, data.len() as u64);

        fs.delete_file(&file).await.unwrap();
        assert!(!fs.exists(&file).await.unwrap());
        assert!(fs.read_file(&file).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_rename_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path());
        let staged = dir.path().join(".staging").join("a.part");
        let target = dir.path().join("sheet-music").join("page.png");

        fs.write_file(&target, Bytes::from_static(b"old")).await.unwrap();
        fs.write_file(&staged, Bytes::from_static(b"new")).await.unwrap();
        fs.rename(&staged, &target).await.unwrap();

        assert_eq!(fs.read_file(&target).await.unwrap(), Bytes::from_static(b"new"));
        assert!(!fs.exists(&staged).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_modified_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path());
        let file = dir.path().join("stamp.bin");
        fs.write_file(&file, Bytes::from_static(b"x")).await.unwrap();

        let stamp = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();
        fs.set_modified(&file, stamp).await.unwrap();

        let modified = fs.metadata(&file).await.unwrap().modified_at.unwrap();
        assert_eq!(modified.timestamp(), stamp.timestamp());
    }

    #[tokio::test]
    async fn test_directory_size_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_cache_directory(dir.path());

        fs.write_file(&dir.path().join("a.bin"), Bytes::from(vec![0u8; 10]))
            .await
            .unwrap();
        fs.write_file(&dir.path().join("sub").join("b.bin"), Bytes::from(vec![0u8; 5]))
            .await
            .unwrap();

        assert_eq!(fs.directory_size(dir.path()).await.unwrap(), 15);
    }
}
