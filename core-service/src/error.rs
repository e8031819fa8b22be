use core_assets::{AssetError, CacheError, Edition};
use core_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Hymn {hymn} does not exist in {edition}")]
    UnknownHymn { hymn: u16, edition: Edition },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}

impl CoreError {
    /// The requested hymn or asset does not exist for the edition.
    pub fn is_unavailable(&self) -> bool {
        match self {
            CoreError::UnknownHymn { .. } => true,
            CoreError::Asset(e) => e.is_unavailable(),
            CoreError::Playback(e) => e.is_unavailable(),
            _ => false,
        }
    }

    /// Retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::Asset(e) => e.is_transient(),
            CoreError::Playback(e) => e.is_transient(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
