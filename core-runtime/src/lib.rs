//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the hymnal core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! Every other `core-*` crate depends on this one. It fixes the logging
//! conventions, the validated configuration handed to the service façade and
//! the broadcast channel that playback, cache and edition changes are
//! announced on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
