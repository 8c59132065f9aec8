//! Shared in-memory fakes for the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::SettingsStore;
use bytes::Bytes;
use core_fonts::{
    AssetLayout, BatchScheduler, FontError, LocalStore, MarkerStore, PreloadPlan,
    PreloadSession, Result, SingleAssetFetcher, StoredAsset,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const ORIGIN: &str = "https://cdn.example/fonts/";
pub const FONTS_DIR: &str = "/data/fonts";

pub fn url_for(page: u16) -> String {
    format!("{}QCF_P{:03}.TTF", ORIGIN, page)
}

pub fn path_for(page: u16) -> PathBuf {
    PathBuf::from(FONTS_DIR).join(format!("QCF_P{:03}.ttf", page))
}

/// Local store that "downloads" by writing a small payload into a map.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Bytes>>,
    failing: Mutex<HashSet<String>>,
    downloads: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn put(&self, path: impl Into<PathBuf>, data: &'static [u8]) {
        self.files.lock().insert(path.into(), Bytes::from_static(data));
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    pub fn fail(&self, url: impl Into<String>) {
        self.failing.lock().insert(url.into());
    }

    pub fn heal(&self, url: &str) {
        self.failing.lock().remove(url);
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().len()
    }

    pub fn downloaded_urls(&self) -> Vec<String> {
        self.downloads.lock().clone()
    }

    pub fn reset_counters(&self) {
        self.downloads.lock().clear();
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    async fn read_all(&self, path: &Path) -> Result<Bytes> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| FontError::Storage(format!("{} missing", path.display())))
    }

    async fn write_from_remote(&self, url: &str, path: &Path) -> Result<u64> {
        self.downloads.lock().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            core_async::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().contains(url) {
            return Err(FontError::Network(format!("HTTP 503 for {}", url)));
        }

        let body = Bytes::from_static(b"\x00\x01\x00\x00font");
        let len = body.len() as u64;
        self.files.lock().insert(path.to_path_buf(), body);
        Ok(len)
    }

    async fn list(&self, dir: &Path) -> Result<Vec<StoredAsset>> {
        Ok(self
            .files
            .lock()
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, data)| StoredAsset {
                name: path.file_name().unwrap().to_string_lossy().into_owned(),
                size_bytes: data.len() as u64,
                path: path.clone(),
            })
            .collect())
    }

    async fn delete(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().remove(path).is_some())
    }
}

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Settings store whose every call fails.
pub struct BrokenSettings;

#[async_trait]
impl SettingsStore for BrokenSettings {
    async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
        Err(BridgeError::OperationFailed("database is locked".to_string()))
    }

    async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
        Err(BridgeError::OperationFailed("database is locked".to_string()))
    }

    async fn delete(&self, _key: &str) -> BridgeResult<()> {
        Err(BridgeError::OperationFailed("database is locked".to_string()))
    }
}

pub fn fetcher(store: Arc<MemoryStore>) -> Arc<SingleAssetFetcher> {
    Arc::new(SingleAssetFetcher::new(AssetLayout::new(FONTS_DIR), store))
}

pub fn session(
    store: Arc<MemoryStore>,
    settings: Arc<dyn SettingsStore>,
    pages: &[u16],
    version: &str,
    concurrency: usize,
) -> PreloadSession {
    let scheduler = BatchScheduler::new(fetcher(store), concurrency, Duration::ZERO).unwrap();
    let marker = MarkerStore::new(settings, "quran_fonts_preload");
    PreloadSession::new(scheduler, marker, PreloadPlan::new(pages, ORIGIN, version))
}
