//! Media controls for desktops without a now-playing service.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    media::{MediaControls, NowPlayingInfo},
    playback::RemoteCommand,
};
use parking_lot::Mutex;
use tracing::debug;

/// Keeps the last now-playing entry in memory and logs every change.
///
/// Desktop shells that render their own mini-player read it back with
/// [`LoggingMediaControls::now_playing`].
#[derive(Default)]
pub struct LoggingMediaControls {
    now_playing: Mutex<Option<NowPlayingInfo>>,
    commands: Mutex<Vec<RemoteCommand>>,
}

impl LoggingMediaControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_playing(&self) -> Option<NowPlayingInfo> {
        self.now_playing.lock().clone()
    }

    pub fn registered_commands(&self) -> Vec<RemoteCommand> {
        self.commands.lock().clone()
    }
}

#[async_trait]
impl MediaControls for LoggingMediaControls {
    async fn register_commands(&self, commands: &[RemoteCommand]) -> Result<()> {
        debug!(?commands, "Registered remote commands");
        *self.commands.lock() = commands.to_vec();
        Ok(())
    }

    async fn update_now_playing(&self, info: NowPlayingInfo) -> Result<()> {
        debug!(
            title = %info.title,
            elapsed_ms = info.elapsed.as_millis() as u64,
            playing = info.is_playing,
            "Now playing updated"
        );
        *self.now_playing.lock() = Some(info);
        Ok(())
    }

    async fn clear_now_playing(&self) -> Result<()> {
        debug!("Now playing cleared");
        self.now_playing.lock().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_latest_entry_until_cleared() {
        let controls = LoggingMediaControls::new();
        controls.register_commands(&RemoteCommand::ALL).await.unwrap();
        assert_eq!(controls.registered_commands().len(), 4);

        controls
            .update_now_playing(NowPlayingInfo {
                title: "Hymn 12".into(),
                artist: "Adventist Hymnal".into(),
                duration: Duration::from_secs(120),
                elapsed: Duration::from_secs(3),
                is_playing: true,
            })
            .await
            .unwrap();
        assert_eq!(controls.now_playing().unwrap().title, "Hymn 12");

        controls.clear_now_playing().await.unwrap();
        assert!(controls.now_playing().is_none());
    }
}
