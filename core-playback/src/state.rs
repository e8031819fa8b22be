//! Observable session state.

use core_assets::Edition;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle of the single playback session.
///
/// ```text
/// Idle ──play──> Loading ──ready──> Playing <──> Paused
///  ^                │                  │           │
///  └───── Failed <──┘ error            └──stop / finish──> Stopped
/// ```
///
/// `Failed` is published once, after which the session settles to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
    Failed { message: String },
}

impl PlaybackState {
    /// A session holds content (and possibly an engine session).
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Loading | PlaybackState::Playing | PlaybackState::Paused
        )
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PlaybackState::Failed { .. })
    }
}

/// Point-in-time view of the session, published on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub hymn: Option<u16>,
    pub edition: Option<Edition>,
    pub position: Duration,
    /// Zero when unknown
    pub duration: Duration,
    /// Incremented by every `play`
    pub generation: u64,
}

impl PlaybackSnapshot {
    pub fn idle() -> Self {
        Self {
            state: PlaybackState::Idle,
            hymn: None,
            edition: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            generation: 0,
        }
    }

    /// Playback progress in `[0, 1]`; 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Whether `hymn` of `edition` is the loaded content.
    pub fn is_current(&self, hymn: u16, edition: Edition) -> bool {
        self.hymn == Some(hymn) && self.edition == Some(edition)
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Passed to the completion callback when a hymn plays to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionInfo {
    pub hymn: u16,
    pub edition: Edition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states() {
        assert!(PlaybackState::Loading.is_active());
        assert!(PlaybackState::Paused.is_active());
        assert!(!PlaybackState::Stopped.is_active());
        assert!(!PlaybackState::Failed {
            message: "x".into()
        }
        .is_active());
    }

    #[test]
    fn progress_is_clamped() {
        let mut snapshot = PlaybackSnapshot::idle();
        assert_eq!(snapshot.progress(), 0.0);

        snapshot.duration = Duration::from_secs(100);
        snapshot.position = Duration::from_secs(25);
        assert!((snapshot.progress() - 0.25).abs() < f64::EPSILON);

        snapshot.position = Duration::from_secs(120);
        assert_eq!(snapshot.progress(), 1.0);
    }

    #[test]
    fn state_serializes_tagged() {
        let json = serde_json::to_string(&PlaybackState::Failed {
            message: "offline".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"state":"failed","message":"offline"}"#);
    }
}
