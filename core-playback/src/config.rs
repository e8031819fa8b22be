//! # Playback Configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Progress publication may not be slower than this.
pub const MAX_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Playback session manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// How often the position is polled from the engine while playing.
    ///
    /// Default: 500 ms. Must be between 1 ms and 1 s.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Duration,

    /// Directory for the temporary playback file. `None` uses the OS temp dir.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Capacity of the command channel.
    ///
    /// Default: 32.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Artist line shown on the system now-playing surface.
    #[serde(default = "default_artist")]
    pub artist: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            temp_dir: None,
            command_buffer: default_command_buffer(),
            artist: default_artist(),
        }
    }
}

impl PlaybackConfig {
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.progress_interval.is_zero() {
            return Err("progress_interval must be > 0".to_string());
        }

        if self.progress_interval > MAX_PROGRESS_INTERVAL {
            return Err(format!(
                "progress_interval must be at most {:?}",
                MAX_PROGRESS_INTERVAL
            ));
        }

        if self.command_buffer == 0 {
            return Err("command_buffer must be > 0".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_progress_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_command_buffer() -> usize {
    32
}

fn default_artist() -> String {
    "Adventist Hymnal".to_string()
}
