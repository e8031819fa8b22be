//! System media controls (lock screen, notification shade, media keys).

use crate::{error::Result, playback::RemoteCommand};
use async_trait::async_trait;
use std::time::Duration;

/// Metadata shown by the platform's now-playing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingInfo {
    pub title: String,
    pub artist: String,
    pub duration: Duration,
    pub elapsed: Duration,
    pub is_playing: bool,
}

/// Adapter over the platform's now-playing / remote command center.
///
/// Optional: a core without media controls still plays audio. Remote commands
/// flow the other way, from the host into
/// `PlaybackSessionManager::handle_remote_command`.
#[async_trait]
pub trait MediaControls: Send + Sync {
    /// Announce which remote commands the core responds to.
    async fn register_commands(&self, commands: &[RemoteCommand]) -> Result<()>;

    /// Publish (or refresh) the now-playing entry.
    async fn update_now_playing(&self, info: NowPlayingInfo) -> Result<()>;

    /// Remove the now-playing entry.
    async fn clear_now_playing(&self) -> Result<()>;

    /// Activate or deactivate the platform audio session.
    async fn set_session_active(&self, active: bool) -> Result<()> {
        let _ = active;
        Ok(())
    }
}
