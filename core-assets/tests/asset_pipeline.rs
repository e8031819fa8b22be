//! AssetStore and SheetMusicLoader over a fake remote and a real cache directory.

use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::time::SystemClock;
use bytes::Bytes;
use core_assets::cache::{CacheConfig, DiskCache};
use core_assets::sheet::SheetMusicLoader;
use core_assets::{AssetError, AssetFetcher, AssetStore, Edition, FetchError};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// In-memory remote that records every path requested.
#[derive(Default)]
struct FakeRemote {
    assets: HashMap<String, Bytes>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeRemote {
    fn with(mut self, path: &str, bytes: Bytes) -> Self {
        self.assets.insert(path.to_string(), bytes);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl AssetFetcher for FakeRemote {
    async fn fetch(&self, remote_path: &str) -> Result<Bytes, FetchError> {
        self.requests.lock().push(remote_path.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.assets
            .get(remote_path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                path: remote_path.to_string(),
            })
    }
}

fn png(width: u32, height: u32) -> Bytes {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([0, 0, 0]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

async fn store_over(dir: &TempDir, remote: Arc<FakeRemote>, config: CacheConfig) -> Arc<AssetStore> {
    let cache = DiskCache::open(
        Arc::new(TokioFileSystem::with_cache_directory(dir.path())),
        Arc::new(SystemClock),
        config.with_root(dir.path()),
    )
    .await
    .unwrap();
    Arc::new(AssetStore::new(Arc::new(cache), remote, Duration::from_secs(5)))
}

#[tokio::test]
async fn sheet_music_stops_after_two_consecutive_missing_pages() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(
        FakeRemote::default()
            .with("sheet-music/1985/PianoSheet_NewHymnal_en_100.png", png(40, 60))
            .with("sheet-music/1985/PianoSheet_NewHymnal_en_100_1.png", png(40, 50))
            // Beyond two misses; must never be requested.
            .with("sheet-music/1985/PianoSheet_NewHymnal_en_100_4.png", png(40, 50)),
    );
    let store = store_over(&dir, remote.clone(), CacheConfig::default()).await;
    let loader = SheetMusicLoader::new(store, 20);

    let sheet = loader.get_pages(100, Edition::English1985).await?;

    assert_eq!(sheet.page_count(), 2);
    assert_eq!(sheet.pages[0].index, 0);
    assert_eq!((sheet.pages[0].width, sheet.pages[0].height), (40, 60));
    assert_eq!(sheet.pages[1].index, 1);
    assert_eq!(
        remote.requests(),
        vec![
            "sheet-music/1985/PianoSheet_NewHymnal_en_100.png",
            "sheet-music/1985/PianoSheet_NewHymnal_en_100_1.png",
            "sheet-music/1985/PianoSheet_NewHymnal_en_100_2.png",
            "sheet-music/1985/PianoSheet_NewHymnal_en_100_3.png",
        ]
    );
    assert!(dir
        .path()
        .join("sheet-music/PianoSheet_NewHymnal_en_100_1.png")
        .exists());
    Ok(())
}

#[tokio::test]
async fn a_single_gap_is_tolerated() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(
        FakeRemote::default()
            .with("sheet-music/2009/PianoSheet_NewHymnal_es_005.png", png(8, 8))
            .with("sheet-music/2009/PianoSheet_NewHymnal_es_005_2.png", png(8, 8)),
    );
    let loader = SheetMusicLoader::new(store_over(&dir, remote, CacheConfig::default()).await, 20);

    let sheet = loader.get_pages(5, Edition::Spanish2009).await?;
    let indices: Vec<u32> = sheet.pages.iter().map(|page| page.index).collect();
    assert_eq!(indices, vec![0, 2]);
    Ok(())
}

#[tokio::test]
async fn page_cap_bounds_probing() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut remote = FakeRemote::default().with("sheet-music/2020/PianoSheet_NewHymnal_ru_001.png", png(4, 4));
    for page in 1..10 {
        remote = remote.with(
            &format!("sheet-music/2020/PianoSheet_NewHymnal_ru_001_{page}.png"),
            png(4, 4),
        );
    }
    let loader = SheetMusicLoader::new(
        store_over(&dir, Arc::new(remote), CacheConfig::default()).await,
        3,
    );

    assert_eq!(loader.get_pages(1, Edition::Russian2020).await?.page_count(), 3);
    Ok(())
}

#[tokio::test]
async fn repeated_request_is_memoized() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(
        FakeRemote::default().with("sheet-music/1985/PianoSheet_NewHymnal_en_003.png", png(4, 4)),
    );
    let loader = SheetMusicLoader::new(store_over(&dir, remote.clone(), CacheConfig::default()).await, 20);

    let first = loader.get_pages(3, Edition::English1985).await?;
    let requests = remote.requests().len();
    let second = loader.get_pages(3, Edition::English1985).await?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(remote.requests().len(), requests);
    Ok(())
}

#[tokio::test]
async fn missing_or_invalid_primary_page_fails() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(FakeRemote::default().with(
        "sheet-music/1985/PianoSheet_NewHymnal_en_002.png",
        Bytes::from_static(b"<html>Not Found</html>"),
    ));
    let loader = SheetMusicLoader::new(store_over(&dir, remote, CacheConfig::default()).await, 20);

    let missing = loader.get_pages(1, Edition::English1985).await.unwrap_err();
    assert!(missing.is_unavailable());

    let invalid = loader.get_pages(2, Edition::English1985).await.unwrap_err();
    assert!(matches!(invalid, AssetError::InvalidImage { .. }));
    assert!(!dir
        .path()
        .join("sheet-music/PianoSheet_NewHymnal_en_002.png")
        .exists());

    let unsupported = loader.get_pages(2, Edition::English1941).await.unwrap_err();
    assert!(unsupported.is_unavailable());
    assert!(!loader.has_sheet_music(Edition::English1941));
    Ok(())
}

#[tokio::test]
async fn slow_fetch_times_out() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(FakeRemote {
        delay: Some(Duration::from_secs(30)),
        ..FakeRemote::default()
    });
    let cache = DiskCache::open(
        Arc::new(TokioFileSystem::with_cache_directory(dir.path())),
        Arc::new(SystemClock),
        CacheConfig::default().with_root(dir.path()),
    )
    .await?;
    let store = AssetStore::new(Arc::new(cache), remote, Duration::from_millis(50));

    let err = store.audio(7, Edition::English1941).await.unwrap_err();
    assert!(matches!(err, AssetError::Timeout { .. }));
    assert!(err.is_transient());
    Ok(())
}

#[tokio::test]
async fn store_failure_still_serves_bytes() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(FakeRemote::default().with("audio/1985/en_010.mp3", Bytes::from_static(b"ID3")));
    let bus = Arc::new(EventBus::new(8));
    let mut events = bus.subscribe();
    let cache = DiskCache::open(
        Arc::new(TokioFileSystem::with_cache_directory(dir.path())),
        Arc::new(SystemClock),
        CacheConfig::default().with_root(dir.path()),
    )
    .await?;
    let store = AssetStore::new(Arc::new(cache), remote, Duration::from_secs(5)).with_event_bus(bus);

    // Occupy the partition path with a file so the write cannot land.
    std::fs::remove_dir_all(dir.path().join("audio_cache"))?;
    std::fs::write(dir.path().join("audio_cache"), b"not a directory")?;

    assert_eq!(store.audio(10, Edition::English1985).await?, Bytes::from_static(b"ID3"));
    assert!(matches!(
        events.recv().await?,
        CoreEvent::Cache(CacheEvent::StoreFailed { ref key, .. }) if key == "1985_010.mp3"
    ));
    Ok(())
}

#[tokio::test]
async fn large_writes_trim_opportunistically() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mib = 1024 * 1024;
    let mut remote = FakeRemote::default();
    for hymn in 1..=3 {
        remote = remote.with(
            &format!("audio/1985/en_{:03}.mp3", hymn),
            Bytes::from(vec![0u8; 2 * mib]),
        );
    }
    let config = CacheConfig::default().with_partition("audio_cache", 5 * mib as u64);
    let store = store_over(&dir, Arc::new(remote), config).await;

    for hymn in 1..=3 {
        store.audio(hymn, Edition::English1985).await?;
    }

    let size = store.cache().partition_size("audio_cache").await?;
    assert!(size <= 5 * mib as u64, "partition holds {size} bytes");
    Ok(())
}
