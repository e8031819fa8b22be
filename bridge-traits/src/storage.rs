//! File System Abstraction
//!
//! The disk cache and the playback temp-file handling only ever touch the
//! filesystem through [`FileSystemAccess`], so hosts can sandbox it and tests
//! can point it at a scratch directory.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
    pub is_directory: bool,
}

/// File system access trait
///
/// Abstracts file I/O so the cache can run against:
/// - Desktop: direct filesystem access
/// - iOS/Android: sandboxed app cache directories
///
/// Implementations must make [`rename`](FileSystemAccess::rename) atomic when
/// source and destination live on the same volume; the cache relies on it to
/// publish entries without exposing partial writes.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn cache_page(fs: &dyn FileSystemAccess, data: bytes::Bytes) -> Result<()> {
///     let root = fs.get_cache_directory().await?;
///     fs.write_file(&root.join("sheet-music").join("page.png"), data).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Get the application's cache directory
    ///
    /// Contents may be purged by the OS when storage is low.
    async fn get_cache_directory(&self) -> Result<PathBuf>;

    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file, creating or truncating it
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Move `from` to `to`, replacing any existing file at `to`
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Overwrite the modification time of a file
    async fn set_modified(&self, path: &Path, time: DateTime<Utc>) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Delete a directory and all its contents
    async fn delete_dir_all(&self, path: &Path) -> Result<()>;

    /// List all entries in a directory
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Calculate total size of a directory recursively
    async fn directory_size(&self, path: &Path) -> Result<u64> {
        let mut total = 0u64;
        for entry in self.list_directory(path).await? {
            let metadata = self.metadata(&entry).await?;
            if metadata.is_directory {
                total += self.directory_size(&entry).await?;
            } else {
                total += metadata.size;
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_metadata() {
        let metadata = FileMetadata {
            size: 2048,
            modified_at: DateTime::from_timestamp(1_700_000_000, 0),
            is_directory: false,
        };

        assert_eq!(metadata.size, 2048);
        assert_eq!(
            metadata.modified_at.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert!(!metadata.is_directory);
    }
}
