//! The [`HymnalCore`] handle.

use crate::error::{CoreError, Result};
use crate::CoreDependencies;
use core_assets::cache::{CacheConfig, CacheStats, DiskCache, TrimReport};
use core_assets::resolver::{AUDIO_PARTITION, SHEET_PARTITION};
use core_assets::{AssetFetcher, AssetStore, Edition, HttpAssetFetcher, SheetMusic, SheetMusicLoader};
use core_playback::{
    CompletionInfo, PlaybackConfig, PlaybackDependencies, PlaybackSessionManager,
    PlaybackSnapshot,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, HymnalEvent, DEFAULT_EVENT_BUFFER_SIZE};
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Selection {
    edition: Edition,
    hymn: Option<u16>,
}

/// Entry point for host applications.
///
/// Owns the asset cache, the sheet loader and the playback session manager,
/// and tracks which edition and hymn the user is looking at.
pub struct HymnalCore {
    cache: Arc<DiskCache>,
    sheets: SheetMusicLoader,
    playback: Arc<PlaybackSessionManager>,
    selection: Arc<Mutex<Selection>>,
    event_bus: Arc<EventBus>,
}

impl HymnalCore {
    /// Validate `config`, open the cache and start the session manager.
    ///
    /// When `trim_on_startup` is set every partition is brought under its
    /// budget before this returns; trim failures are logged, not fatal.
    #[instrument(skip_all)]
    pub async fn bootstrap(config: CoreConfig, deps: CoreDependencies) -> Result<Self> {
        config.validate()?;

        let event_bus = Arc::new(EventBus::new(DEFAULT_EVENT_BUFFER_SIZE));

        let mut cache_config = CacheConfig::new()
            .with_partition(AUDIO_PARTITION, config.audio_cache_budget)
            .with_partition(SHEET_PARTITION, config.sheet_cache_budget)
            .with_integrity(config.verify_integrity);
        if let Some(dir) = &config.cache_dir {
            cache_config = cache_config.with_root(dir.clone());
        }

        let cache = Arc::new(
            DiskCache::open(config.file_system.clone(), deps.clock.clone(), cache_config)
                .await?
                .with_event_bus(event_bus.clone()),
        );

        if config.trim_on_startup {
            trim_partitions(&cache).await;
        }

        let fetcher: Arc<dyn AssetFetcher> = match deps.asset_fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpAssetFetcher::new(
                config.http_client.clone(),
                config.asset_base_url.clone(),
            )),
        };

        let store = Arc::new(
            AssetStore::new(cache.clone(), fetcher, config.fetch_timeout)
                .with_event_bus(event_bus.clone()),
        );

        let mut playback_deps = PlaybackDependencies::new(store.clone(), deps.audio_engine)
            .with_event_bus(event_bus.clone());
        playback_deps = match deps.media_probe {
            Some(probe) => playback_deps.with_probe(probe),
            None => playback_deps.without_probe(),
        };
        if let Some(controls) = deps.media_controls {
            playback_deps = playback_deps.with_media_controls(controls);
        }

        let mut playback_config =
            PlaybackConfig::default().with_progress_interval(config.progress_interval);
        if let Some(dir) = &config.playback_temp_dir {
            playback_config = playback_config.with_temp_dir(dir.clone());
        }

        let playback = Arc::new(PlaybackSessionManager::spawn(playback_deps, playback_config)?);

        let core = Self {
            cache,
            sheets: SheetMusicLoader::new(store, config.max_sheet_pages),
            playback,
            selection: Arc::new(Mutex::new(Selection::default())),
            event_bus,
        };
        core.set_auto_advance(config.auto_advance);

        info!(root = ?core.cache.root(), "Hymnal core ready");
        Ok(core)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn current_edition(&self) -> Edition {
        self.selection.lock().edition
    }

    /// Hymn last selected or played in the current edition.
    pub fn current_hymn(&self) -> Option<u16> {
        self.selection.lock().hymn
    }

    /// Switch editions. Stops playback and forgets the selected hymn when
    /// the edition actually changes.
    #[instrument(skip(self))]
    pub async fn set_edition(&self, edition: Edition) -> Result<()> {
        let previous = {
            let mut selection = self.selection.lock();
            if selection.edition == edition {
                return Ok(());
            }
            let previous = selection.edition;
            selection.edition = edition;
            selection.hymn = None;
            previous
        };

        info!(from = previous.id(), to = edition.id(), "Edition changed");
        self.emit(HymnalEvent::EditionChanged {
            previous: previous.id().to_string(),
            current: edition.id().to_string(),
        });

        self.sheets.clear_memo();
        if self.playback.snapshot().state.is_active() {
            self.playback.stop().await?;
        }
        Ok(())
    }

    /// Select a hymn of the current edition.
    ///
    /// If another hymn of this edition is loaded or playing, playback
    /// follows the selection.
    #[instrument(skip(self))]
    pub async fn select_hymn(&self, hymn: u16) -> Result<()> {
        let edition = self.current_edition();
        check_hymn(hymn, edition)?;

        self.selection.lock().hymn = Some(hymn);
        self.emit(HymnalEvent::HymnSelected {
            edition: edition.id().to_string(),
            hymn,
        });

        let snapshot = self.playback.snapshot();
        if snapshot.state.is_active()
            && snapshot.edition == Some(edition)
            && snapshot.hymn != Some(hymn)
        {
            debug!(from = ?snapshot.hymn, "Playback follows selection");
            self.playback.play(hymn, edition).await?;
        }
        Ok(())
    }

    /// Play a hymn of the current edition and select it.
    #[instrument(skip(self))]
    pub async fn play_hymn(&self, hymn: u16) -> Result<()> {
        let edition = self.current_edition();
        check_hymn(hymn, edition)?;

        self.selection.lock().hymn = Some(hymn);
        self.playback.play(hymn, edition).await?;
        Ok(())
    }

    /// All sheet-music pages of a hymn of the current edition.
    pub async fn sheet_music(&self, hymn: u16) -> Result<Arc<SheetMusic>> {
        let edition = self.current_edition();
        check_hymn(hymn, edition)?;
        Ok(self.sheets.get_pages(hymn, edition).await?)
    }

    pub fn has_sheet_music(&self) -> bool {
        self.sheets.has_sheet_music(self.current_edition())
    }

    pub fn next_hymn_number(&self, current: u16) -> Option<u16> {
        next_in(self.current_edition(), current)
    }

    pub fn previous_hymn_number(&self, current: u16) -> Option<u16> {
        previous_in(self.current_edition(), current)
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Session manager for pause, seek, stop and platform events.
    pub fn playback(&self) -> &PlaybackSessionManager {
        &self.playback
    }

    pub fn playback_updates(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.playback.subscribe()
    }

    /// Start the next hymn whenever one plays to the end.
    ///
    /// Stops after the last hymn of editions with a known hymn count, and
    /// does nothing once the user has switched to another edition.
    pub fn set_auto_advance(&self, enabled: bool) {
        if !enabled {
            self.playback.clear_on_completion();
            return;
        }

        let playback: Weak<PlaybackSessionManager> = Arc::downgrade(&self.playback);
        let selection = self.selection.clone();
        let event_bus = self.event_bus.clone();

        self.playback.set_on_completion(move |info: CompletionInfo| {
            let Some(next) = next_in(info.edition, info.hymn) else {
                debug!(hymn = info.hymn, "Last hymn finished, not advancing");
                return;
            };
            {
                let mut selection = selection.lock();
                if selection.edition != info.edition {
                    return;
                }
                selection.hymn = Some(next);
            }
            event_bus
                .emit(CoreEvent::Hymnal(HymnalEvent::HymnSelected {
                    edition: info.edition.id().to_string(),
                    hymn: next,
                }))
                .ok();

            let playback = playback.clone();
            tokio::spawn(async move {
                let Some(playback) = playback.upgrade() else {
                    return;
                };
                if let Err(e) = playback.play(next, info.edition).await {
                    if !e.is_superseded() {
                        warn!(hymn = next, error = %e, "Auto-advance failed");
                    }
                }
            });
        });
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Usage of every cache partition.
    pub async fn cache_stats(&self) -> Result<Vec<CacheStats>> {
        let mut stats = Vec::new();
        for partition in &self.cache.config().partitions {
            stats.push(self.cache.stats(&partition.name).await?);
        }
        Ok(stats)
    }

    /// Bring every partition under its budget.
    pub async fn trim_cache(&self) -> Vec<TrimReport> {
        trim_partitions(&self.cache).await
    }

    /// Delete every cached asset. Returns the number of entries removed.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> Result<usize> {
        let mut removed = 0;
        for partition in &self.cache.config().partitions {
            removed += self.cache.clear(&partition.name).await?;
        }
        self.sheets.clear_memo();
        Ok(removed)
    }

    // ========================================================================
    // Events & lifecycle
    // ========================================================================

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Stop playback and end the session task.
    pub async fn shutdown(&self) {
        self.playback.clear_on_completion();
        self.playback.shutdown().await;
        info!("Hymnal core shut down");
    }

    fn emit(&self, event: HymnalEvent) {
        self.event_bus.emit(CoreEvent::Hymnal(event)).ok();
    }
}

/// Trim every configured partition concurrently.
async fn trim_partitions(cache: &DiskCache) -> Vec<TrimReport> {
    let trims = cache
        .config()
        .partitions
        .iter()
        .map(|partition| cache.trim_if_needed(&partition.name, partition.max_bytes));

    let mut reports = Vec::new();
    for result in join_all(trims).await {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => warn!(error = %e, "Cache trim failed"),
        }
    }
    reports
}

fn check_hymn(hymn: u16, edition: Edition) -> Result<()> {
    let in_range = hymn >= 1 && edition.hymn_count().map_or(true, |count| hymn <= count);
    if in_range {
        Ok(())
    } else {
        Err(CoreError::UnknownHymn { hymn, edition })
    }
}

fn next_in(edition: Edition, current: u16) -> Option<u16> {
    check_hymn(current, edition).ok()?;
    let next = current.checked_add(1)?;
    check_hymn(next, edition).ok().map(|_| next)
}

fn previous_in(edition: Edition, current: u16) -> Option<u16> {
    check_hymn(current, edition).ok()?;
    current.checked_sub(1).filter(|&previous| previous >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stops_at_last_hymn() {
        assert_eq!(next_in(Edition::English1985, 7), Some(8));
        assert_eq!(next_in(Edition::English1985, 694), Some(695));
        assert_eq!(next_in(Edition::English1985, 695), None);
        assert_eq!(next_in(Edition::English1941, 695), Some(696));
    }

    #[test]
    fn previous_stops_at_first_hymn() {
        assert_eq!(previous_in(Edition::English1985, 2), Some(1));
        assert_eq!(previous_in(Edition::English1985, 1), None);
    }

    #[test]
    fn out_of_range_has_no_neighbours() {
        assert_eq!(next_in(Edition::English1985, 0), None);
        assert_eq!(previous_in(Edition::English1985, 900), None);
    }

    #[test]
    fn uncounted_editions_are_open_ended() {
        assert_eq!(next_in(Edition::Spanish2009, 613), Some(614));
        assert_eq!(next_in(Edition::Spanish2009, u16::MAX), None);
    }

    #[test]
    fn unknown_hymn_is_unavailable() {
        let err = check_hymn(0, Edition::Russian2020).unwrap_err();
        assert!(err.is_unavailable());
        assert!(check_hymn(704, Edition::English1941).is_err());
    }
}
