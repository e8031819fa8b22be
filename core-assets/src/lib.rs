//! # Hymnal Assets
//!
//! Everything between a logical request ("audio for hymn 7, 1985 edition")
//! and the bytes on disk:
//!
//! - [`edition`] - the hymnal catalogue and per-edition capabilities
//! - [`resolver`] - pure mapping to remote paths and cache keys
//! - [`fetcher`] - remote retrieval over the `HttpClient` bridge
//! - [`cache`] - partitioned, size-bounded disk cache with LRU trimming
//! - [`store`] - fetch-through-cache with a bounded fetch timeout
//! - [`sheet`] - multi-page sheet music loading and validation
//!
//! ## Flow
//!
//! ```text
//! AssetResolver ──> AssetStore ──> DiskCache (hit) ──> bytes
//!                       │
//!                       └──> AssetFetcher (miss) ──> DiskCache::store
//! ```

pub mod cache;
pub mod edition;
pub mod error;
pub mod fetcher;
pub mod resolver;
pub mod sheet;
pub mod store;

pub use cache::{CacheConfig, CacheEntry, CacheStats, DiskCache, PartitionBudget, TrimReport};
pub use edition::Edition;
pub use error::{AssetError, CacheError, FetchError, ResolveError, Result};
pub use fetcher::{AssetFetcher, HttpAssetFetcher};
pub use resolver::{AssetKind, AssetReference, AssetResolver};
pub use sheet::{SheetMusic, SheetMusicLoader, SheetPage};
pub use store::AssetStore;
