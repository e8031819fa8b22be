//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridges (HTTP, filesystem, audio engine,
//! media controls) into the shared Rust core and exposes one handle,
//! [`HymnalCore`], that host UIs talk to. Desktop apps typically enable the
//! `desktop-shims` feature, which injects the `bridge-desktop` adapters for
//! any bridge the host leaves out.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::{CoreDependencies, HymnalCore};
//!
//! let config = CoreConfig::builder().cache_dir(cache_dir).build()?;
//! let core = HymnalCore::bootstrap(config, CoreDependencies::new(engine)).await?;
//! core.play_hymn(7).await?;
//! ```

pub mod error;
mod hymnal;

pub use error::{CoreError, Result};
pub use hymnal::HymnalCore;

pub use core_assets::{CacheStats, Edition, SheetMusic, SheetPage, TrimReport};
pub use core_playback::{CompletionInfo, PlaybackSnapshot, PlaybackState};
pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};
pub use core_runtime::events::{CoreEvent, EventBus, HymnalEvent, PlaybackEvent};

use std::sync::Arc;

use bridge_traits::{
    media::MediaControls,
    playback::AudioEngine,
    time::{Clock, SystemClock},
};
use core_assets::AssetFetcher;
use core_playback::MediaProbe;

/// Host collaborators that are not part of [`CoreConfig`].
pub struct CoreDependencies {
    /// Plays the files the session manager prepares
    pub audio_engine: Arc<dyn AudioEngine>,
    /// System now-playing surface. `None` disables now-playing updates.
    pub media_controls: Option<Arc<dyn MediaControls>>,
    /// Duration probe. `None` hands files to the engine unprobed.
    pub media_probe: Option<Arc<dyn MediaProbe>>,
    /// Cache recency clock
    pub clock: Arc<dyn Clock>,
    /// Replaces the HTTP fetcher built from the config (mirrors, bundles, tests)
    pub asset_fetcher: Option<Arc<dyn AssetFetcher>>,
}

impl CoreDependencies {
    /// Dependency bundle with the platform defaults for everything but the
    /// audio engine.
    pub fn new(audio_engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            audio_engine,
            media_controls: default_media_controls(),
            media_probe: default_media_probe(),
            clock: Arc::new(SystemClock),
            asset_fetcher: None,
        }
    }

    pub fn with_media_controls(mut self, controls: Arc<dyn MediaControls>) -> Self {
        self.media_controls = Some(controls);
        self
    }

    pub fn without_media_controls(mut self) -> Self {
        self.media_controls = None;
        self
    }

    pub fn with_media_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.media_probe = Some(probe);
        self
    }

    pub fn without_media_probe(mut self) -> Self {
        self.media_probe = None;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_asset_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.asset_fetcher = Some(fetcher);
        self
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn default_media_controls() -> Option<Arc<dyn MediaControls>> {
    Some(Arc::new(bridge_desktop::LoggingMediaControls::new()))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn default_media_controls() -> Option<Arc<dyn MediaControls>> {
    None
}

#[cfg(feature = "symphonia-probe")]
fn default_media_probe() -> Option<Arc<dyn MediaProbe>> {
    Some(Arc::new(core_playback::SymphoniaProbe::new()))
}

#[cfg(not(feature = "symphonia-probe"))]
fn default_media_probe() -> Option<Arc<dyn MediaProbe>> {
    None
}
