//! # Host Bridge Traits
//!
//! Capabilities the hymnal core needs from its host platform.
//!
//! ## Overview
//!
//! The core (asset cache, resolver, playback session manager) is platform
//! neutral. Anything that touches the network, the disk, the audio hardware or
//! the system media UI goes through one of the traits below, which each host
//! implements once.
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Asset downloads with retry
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Cache directory I/O, atomic rename, mtime control
//!
//! ### Audio
//! - [`AudioEngine`](playback::AudioEngine) - Plays a local file the core prepared
//! - [`MediaControls`](media::MediaControls) - Now-playing surface and remote command registration
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Provides |
//! |----------|---------------------|----------|
//! | Desktop  | `bridge-desktop`    | HTTP, filesystem, logging media controls |
//! | iOS      | host app            | all, `AudioEngine` over AVPlayer |
//! | Android  | host app            | all, `AudioEngine` over ExoPlayer |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it and keep the original message.
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync`; the core shares bridges across tokio
//! tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod media;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use media::{MediaControls, NowPlayingInfo};
pub use playback::{
    AudioEngine, AudioSessionEvent, EngineLoadRequest, EngineSessionId, RemoteCommand,
    RouteChangeReason,
};
pub use storage::{FileMetadata, FileSystemAccess};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
