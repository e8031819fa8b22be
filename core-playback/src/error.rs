//! # Playback Error Types

use bridge_traits::BridgeError;
use core_assets::AssetError;
use thiserror::Error;

/// Errors returned by the playback session manager.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Session Errors
    // ========================================================================
    /// A later `play` or `stop` replaced this request before it finished.
    #[error("Playback request superseded by a newer one")]
    Superseded,

    /// The session actor is no longer running.
    #[error("Playback manager has shut down")]
    ManagerClosed,

    // ========================================================================
    // Source Errors
    // ========================================================================
    /// Audio could not be resolved, fetched or cached.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The temporary playback file could not be written.
    #[error("Failed to prepare playback file: {0}")]
    TempFile(#[from] std::io::Error),

    /// The prepared file is not playable audio.
    #[error("Unsupported or invalid audio: {0}")]
    Probe(String),

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// The host audio engine rejected an operation.
    #[error("Audio engine error: {0}")]
    Engine(#[source] BridgeError),

    #[error("Invalid playback configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, PlaybackError::Superseded)
    }

    /// Returns `true` when the hymn simply has no audio (hide the control).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PlaybackError::Asset(e) if e.is_unavailable())
    }

    /// Returns `true` if retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::Asset(e) => e.is_transient(),
            PlaybackError::Engine(_) => true,
            _ => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_assets::{Edition, ResolveError};

    #[test]
    fn classification() {
        let unsupported = PlaybackError::from(AssetError::from(ResolveError::Unsupported {
            edition: Edition::Spanish2009,
            kind: core_assets::AssetKind::Audio,
        }));
        assert!(unsupported.is_unavailable());
        assert!(!unsupported.is_transient());

        assert!(PlaybackError::Superseded.is_superseded());
        assert!(PlaybackError::Engine(BridgeError::OperationFailed("busy".into())).is_transient());
        assert!(!PlaybackError::Probe("no tracks".into()).is_transient());
    }
}
