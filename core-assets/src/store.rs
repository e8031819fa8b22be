//! Fetch-through-cache asset access.

use crate::cache::DiskCache;
use crate::edition::Edition;
use crate::error::{AssetError, Result};
use crate::fetcher::AssetFetcher;
use crate::resolver::{AssetReference, AssetResolver};
use bytes::Bytes;
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Serves asset bytes from the disk cache, fetching and caching on a miss.
///
/// Cache failures never fail a load: unreadable entries are treated as
/// misses and failed writes are logged, so the caller still gets the bytes.
pub struct AssetStore {
    cache: Arc<DiskCache>,
    fetcher: Arc<dyn AssetFetcher>,
    resolver: AssetResolver,
    fetch_timeout: Duration,
    event_bus: Option<Arc<EventBus>>,
}

impl AssetStore {
    pub fn new(cache: Arc<DiskCache>, fetcher: Arc<dyn AssetFetcher>, fetch_timeout: Duration) -> Self {
        Self {
            cache,
            fetcher,
            resolver: AssetResolver::new(),
            fetch_timeout,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn cache(&self) -> &Arc<DiskCache> {
        &self.cache
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Bytes of `reference`, from the cache when possible.
    #[instrument(skip(self, reference), fields(key = %reference.cache_key))]
    pub async fn load(&self, reference: &AssetReference) -> Result<Bytes> {
        match self
            .cache
            .retrieve(&reference.cache_key, reference.partition)
            .await
        {
            Ok(Some(data)) => return Ok(data),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache read failed, fetching instead"),
        }

        debug!(path = %reference.remote_path, "Fetching asset");
        let data = match tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(&reference.remote_path),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(after = ?self.fetch_timeout, "Asset fetch timed out");
                return Err(AssetError::Timeout {
                    path: reference.remote_path.clone(),
                    after: self.fetch_timeout,
                });
            }
        };

        self.persist(reference, data.clone()).await;
        Ok(data)
    }

    /// Audio track of a hymn.
    pub async fn audio(&self, hymn: u16, edition: Edition) -> Result<Bytes> {
        let reference = self.resolver.resolve_audio(hymn, edition)?;
        self.load(&reference).await
    }

    /// One sheet-music page image (undecoded).
    pub async fn sheet_page(&self, hymn: u16, edition: Edition, page: u32) -> Result<Bytes> {
        let reference = self.resolver.resolve_sheet_page(hymn, edition, page)?;
        self.load(&reference).await
    }

    /// Returns true if `reference` is already on disk. Never fetches.
    pub async fn is_cached(&self, reference: &AssetReference) -> bool {
        self.cache
            .contains(&reference.cache_key, reference.partition)
            .await
            .unwrap_or(false)
    }

    async fn persist(&self, reference: &AssetReference, data: Bytes) {
        let size = data.len() as u64;
        let partition = reference.partition;

        if let Err(e) = self.cache.store(data, &reference.cache_key, partition).await {
            warn!(error = %e, "Failed to cache fetched asset");
            if let Some(bus) = &self.event_bus {
                bus.emit(CoreEvent::Cache(CacheEvent::StoreFailed {
                    partition: partition.to_string(),
                    key: reference.cache_key.clone(),
                    message: e.to_string(),
                }))
                .ok();
            }
            return;
        }

        if !self.cache.is_large_write(size) {
            return;
        }

        if let Some(budget) = self.cache.budget(partition) {
            if let Err(e) = self.cache.trim_if_needed(partition, budget).await {
                warn!(error = %e, "Opportunistic trim failed");
            }
        }
    }
}
