//! Hymnal editions and what each one publishes.

use crate::resolver::AssetKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A distinct hymnal text and numbering with its own asset namespace.
///
/// Serialized by its stable id (`en-newVersion`, ...), which is also what
/// settings stores persist.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Edition {
    #[default]
    #[serde(rename = "en-newVersion")]
    English1985,
    #[serde(rename = "en-oldVersion")]
    English1941,
    #[serde(rename = "es-newVersion")]
    Spanish2009,
    #[serde(rename = "ru-newVersion")]
    Russian2020,
}

impl Edition {
    pub const ALL: [Edition; 4] = [
        Edition::English1985,
        Edition::English1941,
        Edition::Spanish2009,
        Edition::Russian2020,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Edition::English1985 => "en-newVersion",
            Edition::English1941 => "en-oldVersion",
            Edition::Spanish2009 => "es-newVersion",
            Edition::Russian2020 => "ru-newVersion",
        }
    }

    pub fn from_id(id: &str) -> Option<Edition> {
        Self::ALL.into_iter().find(|edition| edition.id() == id)
    }

    pub fn year(&self) -> u16 {
        match self {
            Edition::English1985 => 1985,
            Edition::English1941 => 1941,
            Edition::Spanish2009 => 2009,
            Edition::Russian2020 => 2020,
        }
    }

    /// ISO 639-1 code of the hymn texts.
    pub fn language_code(&self) -> &'static str {
        match self {
            Edition::English1985 | Edition::English1941 => "en",
            Edition::Spanish2009 => "es",
            Edition::Russian2020 => "ru",
        }
    }

    /// Name as printed on the hymnal, in its own language.
    pub fn display_name(&self) -> &'static str {
        match self {
            Edition::English1985 => "New Version 1985",
            Edition::English1941 => "Old Version 1941",
            Edition::Spanish2009 => "Nueva Versión 2009",
            Edition::Russian2020 => "Русская Версия",
        }
    }

    /// Number of hymns, when the catalogue knows it.
    ///
    /// For 1985 this excludes the responsive readings numbered after the hymns.
    pub fn hymn_count(&self) -> Option<u16> {
        match self {
            Edition::English1985 => Some(695),
            Edition::English1941 => Some(703),
            Edition::Spanish2009 | Edition::Russian2020 => None,
        }
    }

    /// Whether the remote store publishes this kind of asset for the edition.
    pub fn supports(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Audio => matches!(self, Edition::English1985 | Edition::English1941),
            AssetKind::SheetPage => !matches!(self, Edition::English1941),
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when parsing an unknown edition id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown hymnal edition: {0}")]
pub struct UnknownEdition(pub String);

impl FromStr for Edition {
    type Err = UnknownEdition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Edition::from_id(s).ok_or_else(|| UnknownEdition(s.to_string()))
    }
}
