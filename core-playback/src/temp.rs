//! Scoped temporary file holding the audio the engine plays.

use crate::error::{PlaybackError, Result};
use bytes::Bytes;
use core_runtime::logging::strip_path;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;

/// The on-disk copy of the current hymn's audio.
///
/// The file is deleted when this value is dropped, so a superseded load
/// cleans up after itself.
#[derive(Debug)]
pub struct PlaybackFile {
    path: TempPath,
}

impl PlaybackFile {
    /// Write `data` to a fresh file in `dir` (or the OS temp dir).
    pub async fn write(dir: Option<PathBuf>, data: Bytes, extension: &str) -> Result<Self> {
        let suffix = format!(".{}", extension);
        let data_len = data.len();

        let path = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            let mut builder = tempfile::Builder::new();
            builder.prefix("hymn-").suffix(&suffix);

            let mut file = match dir {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    builder.tempfile_in(dir)?
                }
                None => builder.tempfile()?,
            };
            file.write_all(&data)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| PlaybackError::Internal(format!("temp file task failed: {}", e)))??;

        debug!(
            file = strip_path(&path.to_string_lossy()),
            size = data_len,
            "Prepared playback file"
        );
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete now, reporting failure instead of ignoring it like drop does.
    pub fn delete(self) -> Result<()> {
        self.path.close()?;
        Ok(())
    }
}
