//! Cache configuration and budgets

use crate::resolver::{AUDIO_PARTITION, SHEET_PARTITION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const MIB: u64 = 1024 * 1024;

/// Byte budget of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionBudget {
    pub name: String,
    pub max_bytes: u64,
}

impl PartitionBudget {
    pub fn new(name: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            name: name.into(),
            max_bytes,
        }
    }
}

/// Configuration for [`DiskCache`](super::DiskCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache root. `None` uses the filesystem bridge's cache directory.
    pub root: Option<PathBuf>,

    /// Partitions trimmed by `trim_all` (default: audio 100 MiB, sheets 200 MiB)
    pub partitions: Vec<PartitionBudget>,

    /// Keep SHA-256 sidecars and verify them on read (default: true)
    pub verify_integrity: bool,

    /// Writes at least this large trigger an opportunistic trim (default: 1 MiB)
    pub large_write_threshold: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            partitions: vec![
                PartitionBudget::new(AUDIO_PARTITION, 100 * MIB),
                PartitionBudget::new(SHEET_PARTITION, 200 * MIB),
            ],
            verify_integrity: true,
            large_write_threshold: MIB,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set (or add) the budget of a partition.
    pub fn with_partition(mut self, name: impl Into<String>, max_bytes: u64) -> Self {
        let name = name.into();
        match self.partitions.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.max_bytes = max_bytes,
            None => self.partitions.push(PartitionBudget::new(name, max_bytes)),
        }
        self
    }

    pub fn with_integrity(mut self, enabled: bool) -> Self {
        self.verify_integrity = enabled;
        self
    }

    pub fn with_large_write_threshold(mut self, bytes: u64) -> Self {
        self.large_write_threshold = bytes;
        self
    }

    /// Budget of `partition`, if configured.
    pub fn budget(&self, partition: &str) -> Option<u64> {
        self.partitions
            .iter()
            .find(|p| p.name == partition)
            .map(|p| p.max_bytes)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.partitions.is_empty() {
            return Err("at least one partition must be configured".to_string());
        }

        for partition in &self.partitions {
            if partition.name.is_empty() || partition.name.starts_with('.') {
                return Err(format!("invalid partition name '{}'", partition.name));
            }
            if partition.max_bytes == 0 {
                return Err(format!(
                    "partition '{}' must have a budget greater than 0",
                    partition.name
                ));
            }
        }

        Ok(())
    }
}
