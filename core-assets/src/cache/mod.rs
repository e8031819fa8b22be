//! # Disk Cache
//!
//! Key-addressed byte store on local disk, split into partitions that each
//! have their own byte budget.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   audio_cache/1985_007.mp3
//!   sheet-music/PianoSheet_NewHymnal_en_007.png
//!   .staging/<uuid>.part                       (in-flight writes)
//!   .integrity/<partition>/<key>.sha256        (optional checksums)
//! ```
//!
//! A partition's size is exactly the sum of the files named by cache keys;
//! bookkeeping lives in dot-directories beside the partitions. Recency is the
//! file's modification time, refreshed on every hit.

mod config;
mod disk;
mod stats;

pub use config::{CacheConfig, PartitionBudget};
pub use disk::{CacheEntry, DiskCache, TrimReport};
pub use stats::CacheStats;
