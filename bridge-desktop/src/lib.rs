//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`
//! - `FileSystemAccess` using `tokio::fs`
//! - `MediaControls` as an in-memory, logging stand-in
//!
//! There is no desktop `AudioEngine` here; the host shell supplies one.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let fs = TokioFileSystem::new();
//! ```

mod filesystem;
mod http;
mod media;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use media::LoggingMediaControls;
