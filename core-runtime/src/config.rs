//! # Core Configuration Module
//!
//! Configuration management for the hymnal core.
//!
//! ## Overview
//!
//! A [`CoreConfig`] is assembled through [`CoreConfigBuilder`] and validated
//! before anything touches the disk or the network. It carries the bridges
//! every component needs (HTTP and filesystem) plus the tunables of the asset
//! cache and the playback session.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - Asset downloads (desktop default: reqwest)
//! - `FileSystemAccess` - Cache directory I/O (desktop default: tokio fs)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected automatically if not provided. Without it, a missing bridge fails
//! the build with [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .cache_dir("/path/to/cache")
//!     .audio_cache_budget(50 * 1024 * 1024)
//!     .fetch_timeout(Duration::from_secs(15))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{FileSystemAccess, HttpClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Host serving the hymnal audio and sheet images.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://adventisthymnarium.rockvilletollandsda.church";

const MIB: u64 = 1024 * 1024;

/// Default byte budget of the audio partition (100 MiB).
pub const DEFAULT_AUDIO_CACHE_BUDGET: u64 = 100 * MIB;

/// Default byte budget of the sheet-music partition (200 MiB).
pub const DEFAULT_SHEET_CACHE_BUDGET: u64 = 200 * MIB;

/// Default bound on a single remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cadence of playback progress updates.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Progress updates slower than this are rejected.
pub const MAX_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of sheet pages probed per hymn.
pub const DEFAULT_MAX_SHEET_PAGES: u32 = 20;

/// Core configuration for the hymnal core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Cache root. `None` uses the filesystem bridge's cache directory.
    pub cache_dir: Option<PathBuf>,

    /// Byte budget of `audio_cache/`
    pub audio_cache_budget: u64,

    /// Byte budget of `sheet-music/`
    pub sheet_cache_budget: u64,

    /// Upper bound on each remote fetch
    pub fetch_timeout: Duration,

    /// How often playback position is published while playing
    pub progress_interval: Duration,

    /// Base URL that remote asset paths are joined to
    pub asset_base_url: String,

    /// Write and check SHA-256 sidecars for cache entries
    pub verify_integrity: bool,

    /// Trim every partition to its budget during bootstrap
    pub trim_on_startup: bool,

    /// Start the next hymn automatically when one finishes
    pub auto_advance: bool,

    /// Maximum number of sheet pages probed per hymn
    pub max_sheet_pages: u32,

    /// Directory for scoped playback files. `None` uses the OS temp dir.
    pub playback_temp_dir: Option<PathBuf>,

    /// HTTP client used for asset downloads
    pub http_client: Arc<dyn HttpClient>,

    /// File system access abstraction
    pub file_system: Arc<dyn FileSystemAccess>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("cache_dir", &self.cache_dir)
            .field("audio_cache_budget", &self.audio_cache_budget)
            .field("sheet_cache_budget", &self.sheet_cache_budget)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("progress_interval", &self.progress_interval)
            .field("asset_base_url", &self.asset_base_url)
            .field("verify_integrity", &self.verify_integrity)
            .field("trim_on_startup", &self.trim_on_startup)
            .field("auto_advance", &self.auto_advance)
            .field("max_sheet_pages", &self.max_sheet_pages)
            .field("playback_temp_dir", &self.playback_temp_dir)
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Both cache budgets are non-zero
    /// - The fetch timeout is non-zero
    /// - The progress interval is within (0, 1s]
    /// - The asset base URL is an http(s) URL
    /// - At least one sheet page may be probed
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::Config("Cache directory cannot be empty".to_string()));
            }
        }

        if self.audio_cache_budget == 0 || self.sheet_cache_budget == 0 {
            return Err(Error::Config(
                "Cache budgets must be greater than 0 bytes".to_string(),
            ));
        }

        if self.fetch_timeout.is_zero() {
            return Err(Error::Config(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        if self.progress_interval.is_zero() || self.progress_interval > MAX_PROGRESS_INTERVAL {
            return Err(Error::Config(format!(
                "Progress interval must be between 1ms and {}ms",
                MAX_PROGRESS_INTERVAL.as_millis()
            )));
        }

        if !(self.asset_base_url.starts_with("https://")
            || self.asset_base_url.starts_with("http://"))
        {
            return Err(Error::Config(format!(
                "Asset base URL must start with http:// or https://, got '{}'",
                self.asset_base_url
            )));
        }

        if self.max_sheet_pages == 0 {
            return Err(Error::Config(
                "max_sheet_pages must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to download hymn assets. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile: inject the platform HTTP stack (URLSession/OkHttp)."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn file_system_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required for the asset cache. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default TokioFileSystem. \
                 Mobile: inject sandboxed cache directory access."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout).map_err(|e| {
        Error::Internal(format!("Failed to create default HttpClient: {}", e))
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(cache_dir: Option<&PathBuf>) -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    let fs = match cache_dir {
        Some(dir) => TokioFileSystem::with_cache_directory(dir.clone()),
        None => TokioFileSystem::new(),
    };
    let fs: Arc<dyn FileSystemAccess> = Arc::new(fs);
    Ok(fs)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_cache_dir: Option<&PathBuf>) -> Result<Arc<dyn FileSystemAccess>> {
    Err(file_system_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) once every option is set. Unset
/// tunables take the `DEFAULT_*` constants of this module.
#[derive(Default)]
pub struct CoreConfigBuilder {
    cache_dir: Option<PathBuf>,
    audio_cache_budget: Option<u64>,
    sheet_cache_budget: Option<u64>,
    fetch_timeout: Option<Duration>,
    progress_interval: Option<Duration>,
    asset_base_url: Option<String>,
    verify_integrity: Option<bool>,
    trim_on_startup: Option<bool>,
    auto_advance: bool,
    max_sheet_pages: Option<u32>,
    playback_temp_dir: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
}

impl CoreConfigBuilder {
    /// Sets the cache root directory.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().cache_dir("/path/to/cache");
    /// ```
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the audio partition budget in bytes.
    ///
    /// Default: 100 MiB
    pub fn audio_cache_budget(mut self, bytes: u64) -> Self {
        self.audio_cache_budget = Some(bytes);
        self
    }

    /// Sets the sheet-music partition budget in bytes.
    ///
    /// Default: 200 MiB
    pub fn sheet_cache_budget(mut self, bytes: u64) -> Self {
        self.sheet_cache_budget = Some(bytes);
        self
    }

    /// Sets the per-fetch timeout.
    ///
    /// Default: 30 seconds
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Sets the playback progress cadence. Must not exceed one second.
    ///
    /// Default: 500 ms
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Points asset downloads at another host (mirrors, test servers).
    pub fn asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.asset_base_url = Some(url.into());
        self
    }

    /// Enables or disables SHA-256 integrity sidecars.
    ///
    /// Default: true
    pub fn verify_integrity(mut self, enabled: bool) -> Self {
        self.verify_integrity = Some(enabled);
        self
    }

    /// Enables or disables the bootstrap trim.
    ///
    /// Default: true
    pub fn trim_on_startup(mut self, enabled: bool) -> Self {
        self.trim_on_startup = Some(enabled);
        self
    }

    /// Enables or disables auto-advance to the next hymn.
    ///
    /// Default: false
    pub fn auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    /// Caps how many sheet pages are probed for one hymn.
    ///
    /// Default: 20
    pub fn max_sheet_pages(mut self, pages: u32) -> Self {
        self.max_sheet_pages = Some(pages);
        self
    }

    /// Directory the session manager writes its scoped audio files to.
    pub fn playback_temp_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.playback_temp_dir = Some(path.into());
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the file system access implementation.
    ///
    /// If not provided, the desktop default (tokio fs-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when a bridge is absent and no desktop
    ///   default is compiled in
    /// - [`Error::Config`] when a tunable is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let fetch_timeout = self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(fetch_timeout)?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(self.cache_dir.as_ref())?,
        };

        let config = CoreConfig {
            cache_dir: self.cache_dir,
            audio_cache_budget: self
                .audio_cache_budget
                .unwrap_or(DEFAULT_AUDIO_CACHE_BUDGET),
            sheet_cache_budget: self
                .sheet_cache_budget
                .unwrap_or(DEFAULT_SHEET_CACHE_BUDGET),
            fetch_timeout,
            progress_interval: self
                .progress_interval
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL),
            asset_base_url: self
                .asset_base_url
                .unwrap_or_else(|| DEFAULT_ASSET_BASE_URL.to_string()),
            verify_integrity: self.verify_integrity.unwrap_or(true),
            trim_on_startup: self.trim_on_startup.unwrap_or(true),
            auto_advance: self.auto_advance,
            max_sheet_pages: self.max_sheet_pages.unwrap_or(DEFAULT_MAX_SHEET_PAGES),
            playback_temp_dir: self.playback_temp_dir,
            http_client,
            file_system,
        };

        config.validate()?;

        Ok(config)
    }
}
