//! Workspace umbrella crate.
//!
//! Host applications depend on `hymnal-workspace` and pick features instead of
//! wiring each workspace crate by hand:
//!
//! - `desktop-shims` (default): reqwest HTTP client and tokio filesystem
//!   adapters are injected when the host does not provide its own.
//! - `symphonia-probe`: validate downloaded audio with symphonia before it is
//!   handed to the host audio engine.

pub use core_service::*;
