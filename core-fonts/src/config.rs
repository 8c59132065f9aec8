//! Font cache configuration

use crate::error::{FontError, Result};
use core_runtime::config::{
    PreloadSettings, DEFAULT_CACHE_KEY, DEFAULT_CACHE_VERSION, DEFAULT_CONCURRENCY,
    DEFAULT_WINDOW_PAUSE,
};
use std::path::PathBuf;
use std::time::Duration;

/// Default assets directory, relative to the host data directory.
pub const DEFAULT_ASSETS_DIRECTORY: &str = "fonts";

/// Configuration for the font cache engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontCacheConfig {
    /// Pages fetched concurrently per window (default: 5)
    pub concurrency: usize,

    /// Pause between two windows (default: 100ms)
    pub window_pause: Duration,

    /// Settings key of the completion marker
    pub cache_key: String,

    /// Generation the marker must carry to count as satisfied
    pub cache_version: String,

    /// Directory holding the cached `QCF_P###.ttf` files
    pub assets_directory: PathBuf,
}

impl Default for FontCacheConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            window_pause: DEFAULT_WINDOW_PAUSE,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            assets_directory: PathBuf::from(DEFAULT_ASSETS_DIRECTORY),
        }
    }
}

impl FontCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from runtime preload settings and a resolved directory.
    pub fn from_settings(settings: &PreloadSettings, assets_directory: impl Into<PathBuf>) -> Self {
        Self {
            concurrency: settings.concurrency,
            window_pause: settings.window_pause,
            cache_key: settings.cache_key.clone(),
            cache_version: settings.cache_version.clone(),
            assets_directory: assets_directory.into(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_window_pause(mut self, pause: Duration) -> Self {
        self.window_pause = pause;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_cache_version(mut self, version: impl Into<String>) -> Self {
        self.cache_version = version.into();
        self
    }

    pub fn with_assets_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_directory = dir.into();
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(FontError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if self.cache_key.trim().is_empty() {
            return Err(FontError::Configuration(
                "cache_key cannot be empty".to_string(),
            ));
        }

        if self.cache_version.trim().is_empty() {
            return Err(FontError::Configuration(
                "cache_version cannot be empty".to_string(),
            ));
        }

        if self.assets_directory.as_os_str().is_empty() {
            return Err(FontError::Configuration(
                "assets_directory cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
