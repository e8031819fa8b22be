//! # Sheet Music Loading
//!
//! A hymn's score is one primary page plus an unknown number of continuation
//! pages. Nothing lists how many exist, so the loader probes page indices in
//! order and stops after two consecutive misses (or at the configured cap).
//! A single gap is tolerated; the page keeps its real index.
//!
//! Every page is decoded once to prove it is an image before it is returned.

use crate::edition::Edition;
use crate::error::{AssetError, Result};
use crate::store::AssetStore;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Probing stops after this many missing pages in a row.
const MAX_CONSECUTIVE_MISSES: u32 = 2;

/// Default cap on pages per hymn.
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// One validated page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPage {
    /// 0 for the primary page
    pub index: u32,
    /// Encoded PNG bytes, as served and cached
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

/// All pages found for a hymn, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetMusic {
    pub hymn: u16,
    pub edition: Edition,
    pub pages: Vec<SheetPage>,
}

impl SheetMusic {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, position: usize) -> Option<&SheetPage> {
        self.pages.get(position)
    }

    pub fn is_multi_page(&self) -> bool {
        self.pages.len() > 1
    }
}

/// Loads and validates every page of a hymn's sheet music.
pub struct SheetMusicLoader {
    store: Arc<AssetStore>,
    max_pages: u32,
    last: Mutex<Option<Arc<SheetMusic>>>,
}

impl SheetMusicLoader {
    pub fn new(store: Arc<AssetStore>, max_pages: u32) -> Self {
        Self {
            store,
            max_pages: max_pages.max(1),
            last: Mutex::new(None),
        }
    }

    /// Whether the edition publishes sheet music at all.
    pub fn has_sheet_music(&self, edition: Edition) -> bool {
        self.store.resolver().has_sheet_music(edition)
    }

    /// Every available page of `hymn`.
    ///
    /// Fails only when the primary page is unavailable or not an image;
    /// continuation pages that fail are treated as absent.
    #[instrument(skip(self))]
    pub async fn get_pages(&self, hymn: u16, edition: Edition) -> Result<Arc<SheetMusic>> {
        if let Some(sheet) = self.memoized(hymn, edition) {
            debug!("Serving memoized sheet music");
            return Ok(sheet);
        }

        let primary = self.load_page(hymn, edition, 0).await?;
        let mut pages = vec![primary];

        let mut misses = 0;
        let mut index = 1;
        while index < self.max_pages && misses < MAX_CONSECUTIVE_MISSES {
            match self.load_page(hymn, edition, index).await {
                Ok(page) => {
                    pages.push(page);
                    misses = 0;
                }
                Err(e) => {
                    debug!(page = index, error = %e, "Continuation page missing");
                    misses += 1;
                }
            }
            index += 1;
        }

        info!(pages = pages.len(), "Loaded sheet music");

        let sheet = Arc::new(SheetMusic {
            hymn,
            edition,
            pages,
        });
        *self.last.lock() = Some(sheet.clone());
        Ok(sheet)
    }

    /// Forget the memoized result.
    pub fn clear_memo(&self) {
        self.last.lock().take();
    }

    fn memoized(&self, hymn: u16, edition: Edition) -> Option<Arc<SheetMusic>> {
        self.last
            .lock()
            .as_ref()
            .filter(|sheet| sheet.hymn == hymn && sheet.edition == edition)
            .cloned()
    }

    async fn load_page(&self, hymn: u16, edition: Edition, index: u32) -> Result<SheetPage> {
        let reference = self
            .store
            .resolver()
            .resolve_sheet_page(hymn, edition, index)?;
        let bytes = self.store.load(&reference).await?;

        match decode_dimensions(bytes.clone()).await {
            Ok((width, height)) => Ok(SheetPage {
                index,
                bytes,
                width,
                height,
            }),
            Err(message) => {
                warn!(key = %reference.cache_key, %message, "Sheet page is not a valid image");
                // Drop it so the next request refetches instead of failing again.
                if let Err(e) = self
                    .store
                    .cache()
                    .remove(&reference.cache_key, reference.partition)
                    .await
                {
                    debug!(error = %e, "Failed to drop invalid page from cache");
                }
                Err(AssetError::InvalidImage {
                    key: reference.cache_key,
                    message,
                })
            }
        }
    }
}

/// Decode off the async executor; returns (width, height).
async fn decode_dimensions(bytes: Bytes) -> std::result::Result<(u32, u32), String> {
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
            .map(|decoded| (decoded.width(), decoded.height()))
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("decode task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Bytes {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[tokio::test]
    async fn decodes_dimensions() {
        assert_eq!(decode_dimensions(png(12, 34)).await, Ok((12, 34)));
    }

    #[tokio::test]
    async fn rejects_non_images() {
        assert!(decode_dimensions(Bytes::from_static(b"<html>404</html>"))
            .await
            .is_err());
    }

    #[test]
    fn sheet_music_accessors() {
        let sheet = SheetMusic {
            hymn: 1,
            edition: Edition::English1985,
            pages: vec![SheetPage {
                index: 0,
                bytes: Bytes::new(),
                width: 1,
                height: 1,
            }],
        };
        assert_eq!(sheet.page_count(), 1);
        assert!(!sheet.is_multi_page());
        assert!(sheet.page(1).is_none());
    }
}
