//! # Asset Error Types
//!
//! One enum per stage of the asset pipeline. [`AssetError`] is what callers of
//! [`AssetStore`](crate::store::AssetStore) and the sheet loader see.

use crate::edition::Edition;
use crate::resolver::AssetKind;
use bridge_traits::BridgeError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Resolver
// ============================================================================

/// The request cannot be mapped to an asset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The edition publishes no assets of this kind.
    #[error("{edition} has no {kind} assets")]
    Unsupported { edition: Edition, kind: AssetKind },

    /// The number is outside the edition's range.
    #[error("Hymn number {hymn} is not valid for {edition}")]
    InvalidNumber { hymn: u16, edition: Edition },
}

// ============================================================================
// Fetcher
// ============================================================================

/// Remote retrieval failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server has no such asset (404/410).
    #[error("Asset not found: {path}")]
    NotFound { path: String },

    /// Any other non-200 status.
    #[error("Server returned HTTP {status} for {path}")]
    ServerError { status: u16, path: String },

    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl FetchError {
    /// Returns `true` if retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::NetworkError(_) => true,
            FetchError::ServerError { status, .. } => *status >= 500 || *status == 429,
            FetchError::NotFound { .. } => false,
        }
    }
}

// ============================================================================
// Disk cache
// ============================================================================

/// Disk cache failures. Callers treat read failures as misses.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key or partition name would escape its directory.
    #[error("Invalid cache key or partition: {0:?}")]
    InvalidKey(String),

    #[error("Cache {operation} failed for {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Invalid cache configuration: {0}")]
    Config(String),
}

impl CacheError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: BridgeError) -> Self {
        CacheError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the underlying file was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io { source, .. } if source.is_not_found())
    }
}

// ============================================================================
// Asset pipeline
// ============================================================================

/// Errors surfaced by [`AssetStore`](crate::store::AssetStore) and
/// [`SheetMusicLoader`](crate::sheet::SheetMusicLoader).
#[derive(Error, Debug)]
pub enum AssetError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The asset does not exist remotely and is not cached.
    #[error("Asset unavailable: {path}")]
    Unavailable { path: String },

    /// The fetch did not finish within the configured bound.
    #[error("Fetching {path} timed out after {after:?}")]
    Timeout { path: String, after: Duration },

    #[error(transparent)]
    Fetch(FetchError),

    /// The bytes are not a decodable image.
    #[error("Invalid image {key}: {message}")]
    InvalidImage { key: String, message: String },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FetchError> for AssetError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::NotFound { path } => AssetError::Unavailable { path },
            other => AssetError::Fetch(other),
        }
    }
}

impl AssetError {
    /// Returns `true` when the caller should hide the affordance (no audio
    /// button, no sheet view) rather than report a failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AssetError::Unavailable { .. }
                | AssetError::Resolve(ResolveError::Unsupported { .. })
        )
    }

    /// Returns `true` if the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            AssetError::Timeout { .. } => true,
            AssetError::Fetch(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;
