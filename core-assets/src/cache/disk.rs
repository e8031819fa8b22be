//! Partitioned on-disk cache with LRU trimming.

use super::config::CacheConfig;
use super::stats::CacheStats;
use crate::error::CacheError;
use bridge_traits::{storage::FileSystemAccess, time::Clock};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const STAGING_DIR: &str = ".staging";
const INTEGRITY_DIR: &str = ".integrity";

type Result<T> = std::result::Result<T, CacheError>;

/// One cached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub partition: String,
    pub size_bytes: u64,
    /// Last store or successful retrieve
    pub last_access: DateTime<Utc>,
}

/// Outcome of a trim pass over one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimReport {
    pub partition: String,
    /// Keys removed, least recently used first
    pub evicted: Vec<String>,
    pub freed_bytes: u64,
    pub remaining_bytes: u64,
}

impl TrimReport {
    /// Returns true if nothing was evicted.
    pub fn is_noop(&self) -> bool {
        self.evicted.is_empty()
    }
}

/// Key-addressed byte store, one directory per partition.
///
/// Entries are published with a staged write followed by an atomic rename, so
/// readers only ever observe complete files. A store holds its key's lock
/// until both the data and its checksum are in place, and a reader that sees
/// a mismatch takes the same lock before deciding the entry is corrupt.
/// Trimming is serialized per partition.
pub struct DiskCache {
    fs: Arc<dyn FileSystemAccess>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    root: PathBuf,
    trim_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    entry_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    event_bus: Option<Arc<EventBus>>,
}

impl DiskCache {
    /// Open (and lay out) the cache.
    ///
    /// Creates every configured partition directory and discards staging
    /// files left behind by an interrupted process.
    #[instrument(skip_all)]
    pub async fn open(
        fs: Arc<dyn FileSystemAccess>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Result<Self> {
        config.validate().map_err(CacheError::Config)?;

        let root = match &config.root {
            Some(root) => root.clone(),
            None => fs
                .get_cache_directory()
                .await
                .map_err(|e| CacheError::io("locate", PathBuf::new(), e))?,
        };

        for partition in &config.partitions {
            let dir = root.join(&partition.name);
            fs.create_dir_all(&dir)
                .await
                .map_err(|e| CacheError::io("create", &dir, e))?;
        }

        let staging = root.join(STAGING_DIR);
        if fs.exists(&staging).await.unwrap_or(false) {
            if let Err(e) = fs.delete_dir_all(&staging).await {
                warn!(error = %e, "Failed to discard stale staging files");
            }
        }
        fs.create_dir_all(&staging)
            .await
            .map_err(|e| CacheError::io("create", &staging, e))?;

        info!(
            root = ?root,
            partitions = config.partitions.len(),
            integrity = config.verify_integrity,
            "Disk cache opened"
        );

        Ok(Self {
            fs,
            clock,
            config,
            root,
            trim_locks: Mutex::new(HashMap::new()),
            entry_locks: Mutex::new(HashMap::new()),
            event_bus: None,
        })
    }

    /// Publish trim and integrity notifications on `event_bus`.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Configured budget of `partition`.
    pub fn budget(&self, partition: &str) -> Option<u64> {
        self.config.budget(partition)
    }

    /// Whether a write of `size` bytes should be followed by a trim.
    pub fn is_large_write(&self, size: u64) -> bool {
        size >= self.config.large_write_threshold
    }

    /// Read an entry and mark it as recently used.
    ///
    /// Returns `Ok(None)` on a miss, including an entry whose checksum no
    /// longer matches (the entry is dropped).
    #[instrument(skip(self))]
    pub async fn retrieve(&self, key: &str, partition: &str) -> Result<Option<Bytes>> {
        let path = self.entry_path(key, partition)?;

        let Some(mut data) = self.read_entry(&path).await? else {
            debug!("Cache miss");
            return Ok(None);
        };

        if self.config.verify_integrity && !self.checksum_matches(key, partition, &data).await {
            // The mismatch may be a store caught between its data and checksum
            // renames; once the key's lock is free both are settled.
            let lock = self.entry_lock(key, partition);
            let _guard = lock.lock().await;

            data = match self.read_entry(&path).await? {
                Some(data) => data,
                None => return Ok(None),
            };

            if !self.checksum_matches(key, partition, &data).await {
                warn!("Cache entry failed integrity check, dropping it");
                if let Err(e) = self.delete_entry(key, partition).await {
                    warn!(error = %e, "Failed to drop corrupted entry");
                }
                self.emit(CacheEvent::IntegrityFailure {
                    partition: partition.to_string(),
                    key: key.to_string(),
                });
                return Ok(None);
            }
        }

        if let Err(e) = self.fs.set_modified(&path, self.clock.now()).await {
            warn!(error = %e, "Failed to refresh entry access time");
        }

        debug!(size = data.len(), "Cache hit");
        Ok(Some(data))
    }

    /// Write an entry, replacing any previous value for the key.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn store(&self, data: Bytes, key: &str, partition: &str) -> Result<()> {
        let path = self.entry_path(key, partition)?;
        let partition_dir = self.root.join(partition);
        self.fs
            .create_dir_all(&partition_dir)
            .await
            .map_err(|e| CacheError::io("create", &partition_dir, e))?;

        let checksum = self.config.verify_integrity.then(|| checksum(&data));

        let lock = self.entry_lock(key, partition);
        let _guard = lock.lock().await;

        self.publish(data, &path).await?;

        if let Err(e) = self.fs.set_modified(&path, self.clock.now()).await {
            warn!(error = %e, "Failed to stamp entry access time");
        }

        if let Some(checksum) = checksum {
            let sidecar = self.checksum_path(key, partition);
            if let Err(e) = self.publish(Bytes::from(checksum), &sidecar).await {
                warn!(error = %e, "Failed to write entry checksum");
            }
        }

        debug!("Stored cache entry");
        Ok(())
    }

    /// Returns true if `key` is present in `partition`.
    pub async fn contains(&self, key: &str, partition: &str) -> Result<bool> {
        let path = self.entry_path(key, partition)?;
        self.fs
            .exists(&path)
            .await
            .map_err(|e| CacheError::io("stat", path, e))
    }

    /// Remove one entry. Returns false if it was not cached.
    #[instrument(skip(self))]
    pub async fn remove(&self, key: &str, partition: &str) -> Result<bool> {
        self.entry_path(key, partition)?;
        let lock = self.entry_lock(key, partition);
        let _guard = lock.lock().await;
        self.delete_entry(key, partition).await
    }

    /// All entries of a partition, least recently used first.
    ///
    /// Ties on access time are ordered by key.
    pub async fn entries(&self, partition: &str) -> Result<Vec<CacheEntry>> {
        validate_name(partition)?;
        let dir = self.root.join(partition);

        let paths = match self.fs.list_directory(&dir).await {
            Ok(paths) => paths,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io("list", dir, e)),
        };

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(key) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            let metadata = match self.fs.metadata(&path).await {
                Ok(metadata) => metadata,
                // Removed between listing and stat.
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(CacheError::io("stat", path, e)),
            };
            if metadata.is_directory {
                continue;
            }

            entries.push(CacheEntry {
                key: key.to_string(),
                partition: partition.to_string(),
                size_bytes: metadata.size,
                last_access: metadata.modified_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            });
        }

        entries.sort_by(|a, b| {
            a.last_access
                .cmp(&b.last_access)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(entries)
    }

    /// Sum of entry sizes in a partition.
    pub async fn partition_size(&self, partition: &str) -> Result<u64> {
        Ok(self
            .entries(partition)
            .await?
            .iter()
            .map(|entry| entry.size_bytes)
            .sum())
    }

    /// Usage of a partition against its configured budget.
    pub async fn stats(&self, partition: &str) -> Result<CacheStats> {
        let entries = self.entries(partition).await?;

        Ok(CacheStats {
            partition: partition.to_string(),
            entry_count: entries.len(),
            total_bytes: entries.iter().map(|entry| entry.size_bytes).sum(),
            max_bytes: self.budget(partition).unwrap_or(0),
            oldest_access: entries.first().map(|entry| entry.last_access),
            newest_access: entries.last().map(|entry| entry.last_access),
        })
    }

    /// Evict least recently used entries while the partition is at or over
    /// `max_bytes`. Runs only when the partition exceeds `max_bytes`.
    ///
    /// Concurrent calls for the same partition run one at a time. Entries that
    /// fail to delete are skipped.
    #[instrument(skip(self))]
    pub async fn trim_if_needed(&self, partition: &str, max_bytes: u64) -> Result<TrimReport> {
        let lock = self.trim_lock(partition);
        let _guard = lock.lock().await;

        let entries = self.entries(partition).await?;
        let total: u64 = entries.iter().map(|entry| entry.size_bytes).sum();

        let mut report = TrimReport {
            partition: partition.to_string(),
            evicted: Vec::new(),
            freed_bytes: 0,
            remaining_bytes: total,
        };

        if total <= max_bytes {
            debug!(total, max_bytes, "Partition within budget");
            return Ok(report);
        }

        info!(total, max_bytes, "Trimming partition");

        for entry in entries {
            if report.remaining_bytes < max_bytes {
                break;
            }

            let entry_lock = self.entry_lock(&entry.key, partition);
            let _entry_guard = entry_lock.lock().await;
            match self.delete_entry(&entry.key, partition).await {
                Ok(_) => {
                    debug!(key = %entry.key, size = entry.size_bytes, "Evicted entry");
                    report.remaining_bytes = report.remaining_bytes.saturating_sub(entry.size_bytes);
                    report.freed_bytes += entry.size_bytes;
                    report.evicted.push(entry.key);
                }
                Err(e) => warn!(key = %entry.key, error = %e, "Failed to evict entry"),
            }
        }

        info!(
            evicted = report.evicted.len(),
            freed_bytes = report.freed_bytes,
            remaining_bytes = report.remaining_bytes,
            "Trim complete"
        );

        self.emit(CacheEvent::Trimmed {
            partition: partition.to_string(),
            evicted: report.evicted.len(),
            freed_bytes: report.freed_bytes,
            remaining_bytes: report.remaining_bytes,
        });

        Ok(report)
    }

    /// Trim every configured partition against its own budget.
    pub async fn trim_all(&self) -> Result<Vec<TrimReport>> {
        let mut reports = Vec::with_capacity(self.config.partitions.len());
        for partition in &self.config.partitions {
            reports.push(self.trim_if_needed(&partition.name, partition.max_bytes).await?);
        }
        Ok(reports)
    }

    /// Remove every entry of a partition. Returns the number removed.
    #[instrument(skip(self))]
    pub async fn clear(&self, partition: &str) -> Result<usize> {
        let lock = self.trim_lock(partition);
        let _guard = lock.lock().await;

        let mut removed = 0;
        for entry in self.entries(partition).await? {
            let entry_lock = self.entry_lock(&entry.key, partition);
            let _entry_guard = entry_lock.lock().await;
            if self.delete_entry(&entry.key, partition).await? {
                removed += 1;
            }
        }

        let checksums = self.root.join(INTEGRITY_DIR).join(partition);
        if self.fs.exists(&checksums).await.unwrap_or(false) {
            if let Err(e) = self.fs.delete_dir_all(&checksums).await {
                warn!(error = %e, "Failed to remove checksum directory");
            }
        }

        info!(removed, "Partition cleared");
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn entry_path(&self, key: &str, partition: &str) -> Result<PathBuf> {
        validate_name(partition)?;
        validate_name(key)?;
        Ok(self.root.join(partition).join(key))
    }

    fn checksum_path(&self, key: &str, partition: &str) -> PathBuf {
        self.root
            .join(INTEGRITY_DIR)
            .join(partition)
            .join(format!("{key}.sha256"))
    }

    fn trim_lock(&self, partition: &str) -> Arc<AsyncMutex<()>> {
        self.trim_locks
            .lock()
            .entry(partition.to_string())
            .or_default()
            .clone()
    }

    fn entry_lock(&self, key: &str, partition: &str) -> Arc<AsyncMutex<()>> {
        self.entry_locks
            .lock()
            .entry(format!("{partition}/{key}"))
            .or_default()
            .clone()
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<Bytes>> {
        match self.fs.read_file(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(CacheError::io("read", path, e)),
        }
    }

    /// Stage `data` under a unique name and move it onto `target`.
    async fn publish(&self, data: Bytes, target: &Path) -> Result<()> {
        let staged = self
            .root
            .join(STAGING_DIR)
            .join(format!("{}.part", Uuid::new_v4()));

        self.fs
            .write_file(&staged, data)
            .await
            .map_err(|e| CacheError::io("write", &staged, e))?;

        if let Err(e) = self.fs.rename(&staged, target).await {
            if let Err(cleanup) = self.fs.delete_file(&staged).await {
                debug!(error = %cleanup, "Failed to remove staging file");
            }
            return Err(CacheError::io("publish", target, e));
        }

        Ok(())
    }

    /// Entries without a checksum are accepted.
    async fn checksum_matches(&self, key: &str, partition: &str, data: &[u8]) -> bool {
        let sidecar = self.checksum_path(key, partition);
        match self.fs.read_file(&sidecar).await {
            Ok(expected) => {
                let expected = String::from_utf8_lossy(&expected);
                expected.trim() == checksum(data)
            }
            Err(e) => {
                if !e.is_not_found() {
                    debug!(error = %e, "Checksum unreadable, accepting entry");
                }
                true
            }
        }
    }

    async fn delete_entry(&self, key: &str, partition: &str) -> Result<bool> {
        let path = self.root.join(partition).join(key);
        let removed = match self.fs.delete_file(&path).await {
            Ok(()) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => return Err(CacheError::io("delete", path, e)),
        };

        let sidecar = self.checksum_path(key, partition);
        if let Err(e) = self.fs.delete_file(&sidecar).await {
            if !e.is_not_found() {
                debug!(error = %e, "Failed to remove entry checksum");
            }
        }

        Ok(removed)
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Cache(event)).ok();
        }
    }
}

fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Keys and partitions are single path components that are not hidden.
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(|c| matches!(c, '/' | '\\' | '\0'));

    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioFileSystem;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    struct StepClock(parking_lot::Mutex<DateTime<Utc>>);

    impl StepClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(parking_lot::Mutex::new(
                DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            )))
        }

        fn advance(&self, minutes: i64) {
            *self.0.lock() += ChronoDuration::minutes(minutes);
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    async fn open(dir: &TempDir, clock: Arc<StepClock>, config: CacheConfig) -> DiskCache {
        let fs = Arc::new(TokioFileSystem::with_cache_directory(dir.path()));
        DiskCache::open(fs, clock, config.with_root(dir.path()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn store_then_retrieve() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir, StepClock::new(), CacheConfig::default()).await;

        cache
            .store(Bytes::from_static(b"mp3"), "1985_007.mp3", "audio_cache")
            .await
            .unwrap();

        let data = cache.retrieve("1985_007.mp3", "audio_cache").await.unwrap();
        assert_eq!(data, Some(Bytes::from_static(b"mp3")));
        assert!(dir.path().join("audio_cache/1985_007.mp3").exists());
        assert!(dir.path().join(".integrity/audio_cache/1985_007.mp3.sha256").exists());
        assert_eq!(cache.partition_size("audio_cache").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn missing_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir, StepClock::new(), CacheConfig::default()).await;

        assert_eq!(cache.retrieve("1941_001.mp3", "audio_cache").await.unwrap(), None);
        assert!(cache.entries("never-created").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_keys_that_escape_the_partition() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir, StepClock::new(), CacheConfig::default()).await;

        for key in ["", "../secrets", ".hidden", "a/b", "a\\b"] {
            let err = cache
                .store(Bytes::from_static(b"x"), key, "audio_cache")
                .await
                .unwrap_err();
            assert!(matches!(err, CacheError::InvalidKey(_)), "{key:?}");
        }
        assert!(cache.retrieve("ok.mp3", "..").await.is_err());
    }

    #[tokio::test]
    async fn corrupted_entry_is_dropped() {
        let dir = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new(16));
        let mut events = bus.subscribe();
        let cache = open(&dir, StepClock::new(), CacheConfig::default())
            .await
            .with_event_bus(bus.clone());

        cache
            .store(Bytes::from_static(b"original"), "PianoSheet_NewHymnal_en_001.png", "sheet-music")
            .await
            .unwrap();
        std::fs::write(
            dir.path().join("sheet-music/PianoSheet_NewHymnal_en_001.png"),
            b"tampered",
        )
        .unwrap();

        let data = cache
            .retrieve("PianoSheet_NewHymnal_en_001.png", "sheet-music")
            .await
            .unwrap();
        assert_eq!(data, None);
        assert!(!dir.path().join("sheet-music/PianoSheet_NewHymnal_en_001.png").exists());
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Cache(CacheEvent::IntegrityFailure {
                partition: "sheet-music".to_string(),
                key: "PianoSheet_NewHymnal_en_001.png".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn integrity_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let cache = open(
            &dir,
            StepClock::new(),
            CacheConfig::default().with_integrity(false),
        )
        .await;

        cache
            .store(Bytes::from_static(b"one"), "1985_001.mp3", "audio_cache")
            .await
            .unwrap();
        std::fs::write(dir.path().join("audio_cache/1985_001.mp3"), b"two").unwrap();

        assert!(!dir.path().join(".integrity").join("audio_cache").exists());
        assert_eq!(
            cache.retrieve("1985_001.mp3", "audio_cache").await.unwrap(),
            Some(Bytes::from_static(b"two"))
        );
    }

    #[tokio::test]
    async fn retrieve_refreshes_recency() {
        let dir = TempDir::new().unwrap();
        let clock = StepClock::new();
        let cache = open(&dir, clock.clone(), CacheConfig::default()).await;

        for key in ["a", "b", "c"] {
            cache.store(Bytes::from_static(b"x"), key, "audio_cache").await.unwrap();
            clock.advance(1);
        }
        cache.retrieve("a", "audio_cache").await.unwrap();

        let order: Vec<_> = cache
            .entries("audio_cache")
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        assert_eq!(order, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn trim_evicts_least_recent_first_with_key_tiebreak() {
        let dir = TempDir::new().unwrap();
        let clock = StepClock::new();
        let cache = open(&dir, clock.clone(), CacheConfig::default()).await;

        // "b" and "a" share a timestamp; "a" sorts first.
        cache.store(Bytes::from(vec![0u8; 40]), "b", "audio_cache").await.unwrap();
        cache.store(Bytes::from(vec![0u8; 40]), "a", "audio_cache").await.unwrap();
        clock.advance(1);
        cache.store(Bytes::from(vec![0u8; 40]), "c", "audio_cache").await.unwrap();

        let report = cache.trim_if_needed("audio_cache", 100).await.unwrap();
        // 120 > 100: evicting "a" leaves 80.
        assert_eq!(report.evicted, ["a"]);
        assert_eq!(report.freed_bytes, 40);
        assert_eq!(report.remaining_bytes, 80);
        assert!(cache.contains("b", "audio_cache").await.unwrap());
        assert!(!cache.contains("a", "audio_cache").await.unwrap());
    }

    #[tokio::test]
    async fn trim_within_budget_is_noop() {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir, StepClock::new(), CacheConfig::default()).await;

        cache.store(Bytes::from(vec![0u8; 100]), "a", "audio_cache").await.unwrap();
        let report = cache.trim_if_needed("audio_cache", 100).await.unwrap();
        assert!(report.is_noop());
        assert_eq!(report.remaining_bytes, 100);
    }

    #[tokio::test]
    async fn concurrent_stores_leave_one_complete_entry() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(open(&dir, StepClock::new(), CacheConfig::default()).await);
        let payload = Bytes::from(vec![7u8; 64 * 1024]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let payload = payload.clone();
                tokio::spawn(async move {
                    cache.store(payload, "1985_100.mp3", "audio_cache").await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(
            cache.retrieve("1985_100.mp3", "audio_cache").await.unwrap(),
            Some(payload)
        );
        assert_eq!(std::fs::read_dir(dir.path().join(".staging")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn open_discards_stale_staging_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".staging")).unwrap();
        std::fs::write(dir.path().join(".staging/leftover.part"), b"partial").unwrap();

        let cache = open(&dir, StepClock::new(), CacheConfig::default()).await;
        assert_eq!(std::fs::read_dir(dir.path().join(".staging")).unwrap().count(), 0);
        assert!(cache.entries("audio_cache").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_and_stats() {
        let dir = TempDir::new().unwrap();
        let clock = StepClock::new();
        let cache = open(
            &dir,
            clock.clone(),
            CacheConfig::default().with_partition("audio_cache", 1000),
        )
        .await;

        cache.store(Bytes::from(vec![1u8; 300]), "x", "audio_cache").await.unwrap();
        clock.advance(5);
        cache.store(Bytes::from(vec![1u8; 650]), "y", "audio_cache").await.unwrap();

        let stats = cache.stats("audio_cache").await.unwrap();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.total_bytes, 950);
        assert_eq!(stats.max_bytes, 1000);
        assert!(stats.is_near_capacity());
        assert!(stats.oldest_access < stats.newest_access);

        assert_eq!(cache.clear("audio_cache").await.unwrap(), 2);
        assert_eq!(cache.partition_size("audio_cache").await.unwrap(), 0);
        assert!(!cache.remove("x", "audio_cache").await.unwrap());
    }
}
