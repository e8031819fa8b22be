//! # Playback Session Module
//!
//! Coordinates playback of one hymn at a time on a host-provided audio engine.
//!
//! ## Overview
//!
//! This module handles:
//! - Session lifecycle (load, play, pause, seek, stop, completion)
//! - Preparing a scoped temporary file from cached or fetched audio
//! - Probing the file for duration (symphonia, feature-gated)
//! - Audio-session interruptions, route changes and remote commands
//! - Progress publication through a `watch` channel

pub mod config;
pub mod error;
pub mod probe;
pub mod session;
pub mod state;
pub mod temp;

pub use config::PlaybackConfig;
pub use error::{PlaybackError, Result};
pub use probe::{MediaInfo, MediaProbe};
#[cfg(feature = "symphonia-probe")]
pub use probe::SymphoniaProbe;
pub use session::{CompletionCallback, PlaybackDependencies, PlaybackSessionManager};
pub use state::{CompletionInfo, PlaybackSnapshot, PlaybackState};
