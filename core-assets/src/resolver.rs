//! Maps (hymn, edition, kind, page) to the remote path and cache key.
//!
//! Pure functions only; the same inputs always produce the same reference.

use crate::edition::Edition;
use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache partition holding hymn audio.
pub const AUDIO_PARTITION: &str = "audio_cache";

/// Cache partition holding sheet-music page images.
pub const SHEET_PARTITION: &str = "sheet-music";

/// Largest number the three-digit asset naming can express.
pub const MAX_HYMN_NUMBER: u16 = 999;

/// Kind of remote asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Audio,
    SheetPage,
}

impl AssetKind {
    /// Disk cache partition this kind is stored in.
    pub fn partition(&self) -> &'static str {
        match self {
            AssetKind::Audio => AUDIO_PARTITION,
            AssetKind::SheetPage => SHEET_PARTITION,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Audio => "audio",
            AssetKind::SheetPage => "sheet music",
        })
    }
}

/// Everything needed to locate one asset remotely and in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    pub hymn: u16,
    pub edition: Edition,
    pub kind: AssetKind,
    /// Sheet page index; `None` for audio.
    pub page: Option<u32>,
    /// Path relative to the asset host, without a leading slash.
    pub remote_path: String,
    /// File name inside the partition.
    pub cache_key: String,
    pub partition: &'static str,
}

/// Stateless resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetResolver;

impl AssetResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve any asset kind. `page` is ignored for audio.
    pub fn resolve(
        &self,
        hymn: u16,
        edition: Edition,
        kind: AssetKind,
        page: u32,
    ) -> Result<AssetReference, ResolveError> {
        match kind {
            AssetKind::Audio => self.resolve_audio(hymn, edition),
            AssetKind::SheetPage => self.resolve_sheet_page(hymn, edition, page),
        }
    }

    /// Audio track for a hymn.
    ///
    /// | edition | remote path | cache key |
    /// |---|---|---|
    /// | 1941 | `audio/1941/007.mp3` | `1941_007.mp3` |
    /// | 1985 | `audio/1985/en_007.mp3` | `1985_007.mp3` |
    pub fn resolve_audio(&self, hymn: u16, edition: Edition) -> Result<AssetReference, ResolveError> {
        Self::check(hymn, edition, AssetKind::Audio)?;

        let number = pad(hymn);
        let year = edition.year();
        let remote_path = match edition {
            Edition::English1941 => format!("audio/{year}/{number}.mp3"),
            _ => format!("audio/{year}/{}_{number}.mp3", edition.language_code()),
        };

        Ok(AssetReference {
            hymn,
            edition,
            kind: AssetKind::Audio,
            page: None,
            remote_path,
            cache_key: format!("{year}_{number}.mp3"),
            partition: AUDIO_PARTITION,
        })
    }

    /// One sheet-music page. Page 0 is the primary page; 1.. are continuations.
    pub fn resolve_sheet_page(
        &self,
        hymn: u16,
        edition: Edition,
        page: u32,
    ) -> Result<AssetReference, ResolveError> {
        Self::check(hymn, edition, AssetKind::SheetPage)?;

        let stem = format!(
            "PianoSheet_NewHymnal_{}_{}",
            edition.language_code(),
            pad(hymn)
        );
        let file_name = match page {
            0 => format!("{stem}.png"),
            n => format!("{stem}_{n}.png"),
        };

        Ok(AssetReference {
            hymn,
            edition,
            kind: AssetKind::SheetPage,
            page: Some(page),
            remote_path: format!("sheet-music/{}/{}", edition.year(), file_name),
            cache_key: file_name,
            partition: SHEET_PARTITION,
        })
    }

    /// Resolver-level support check; says nothing about whether a given
    /// hymn's asset actually exists remotely.
    pub fn has_sheet_music(&self, edition: Edition) -> bool {
        edition.supports(AssetKind::SheetPage)
    }

    pub fn has_audio(&self, edition: Edition) -> bool {
        edition.supports(AssetKind::Audio)
    }

    fn check(hymn: u16, edition: Edition, kind: AssetKind) -> Result<(), ResolveError> {
        if !edition.supports(kind) {
            return Err(ResolveError::Unsupported { edition, kind });
        }

        let limit = edition.hymn_count().unwrap_or(MAX_HYMN_NUMBER);
        if hymn == 0 || hymn > limit.min(MAX_HYMN_NUMBER) {
            return Err(ResolveError::InvalidNumber { hymn, edition });
        }

        Ok(())
    }
}

fn pad(hymn: u16) -> String {
    format!("{:03}", hymn)
}
