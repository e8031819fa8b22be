//! Playback bridge traits and supporting types.
//!
//! The core never decodes to an output device itself. It hands a local file to
//! the host's [`AudioEngine`] and drives it through a narrow control surface.
//! Everything the platform tells the core about playback (end of stream,
//! interruptions, route changes) arrives as an [`AudioSessionEvent`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Identifier for one engine-side playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineSessionId(Uuid);

impl EngineSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EngineSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EngineSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the engine should open.
#[derive(Debug, Clone)]
pub struct EngineLoadRequest {
    /// Local file holding the complete encoded audio.
    pub path: PathBuf,
    /// Duration reported by the core's own probe, if it found one.
    pub duration_hint: Option<Duration>,
    /// Display title, e.g. "Hymn 7".
    pub title: String,
}

impl EngineLoadRequest {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            duration_hint: None,
            title: title.into(),
        }
    }

    pub fn with_duration_hint(mut self, duration: Option<Duration>) -> Self {
        self.duration_hint = duration;
        self
    }
}

/// Host audio engine.
///
/// `load` must not start playback. Control calls that reference a session
/// which was already unloaded should fail rather than act on a newer one.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Open the file and allocate native resources.
    async fn load(&self, request: EngineLoadRequest) -> Result<EngineSessionId>;

    /// Begin or resume output.
    async fn play(&self, session: EngineSessionId) -> Result<()>;

    /// Pause without releasing the session.
    async fn pause(&self, session: EngineSessionId) -> Result<()>;

    /// Seek to an absolute position.
    async fn seek(&self, session: EngineSessionId, position: Duration) -> Result<()>;

    /// Current playback position.
    async fn position(&self, session: EngineSessionId) -> Result<Duration>;

    /// Release the session and close the file.
    async fn unload(&self, session: EngineSessionId) -> Result<()>;
}

/// Why the audio route changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteChangeReason {
    /// The previous output (e.g. headphones) disappeared.
    OldDeviceUnavailable,
    /// A new output device became available.
    NewDeviceAvailable,
    /// The platform switched category or override.
    CategoryChange,
    Other,
}

/// Platform notifications about the audio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AudioSessionEvent {
    /// The engine reached the end of the stream for this session.
    Finished { session: EngineSessionId },
    /// Another audio source took over output.
    InterruptionBegan,
    /// The interruption is over; `should_resume` carries the platform hint.
    InterruptionEnded { should_resume: bool },
    RouteChanged { reason: RouteChangeReason },
}

/// Commands coming from lock screens, headsets or media keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCommand {
    Play,
    Pause,
    Stop,
    TogglePlayPause,
}

impl RemoteCommand {
    /// Every command the core knows how to handle.
    pub const ALL: [RemoteCommand; 4] = [
        RemoteCommand::Play,
        RemoteCommand::Pause,
        RemoteCommand::Stop,
        RemoteCommand::TogglePlayPause,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_unique() {
        let a = EngineSessionId::new();
        let b = EngineSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, EngineSessionId::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn load_request_builder() {
        let request = EngineLoadRequest::new("/tmp/hymn.mp3", "Hymn 7")
            .with_duration_hint(Some(Duration::from_secs(95)));
        assert_eq!(request.title, "Hymn 7");
        assert_eq!(request.duration_hint, Some(Duration::from_secs(95)));
    }

    #[test]
    fn session_events_serialize_tagged() {
        let json = serde_json::to_string(&AudioSessionEvent::InterruptionEnded {
            should_resume: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"event":"interruption_ended","should_resume":true}"#);
    }
}
