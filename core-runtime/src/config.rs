//! # Core Configuration Module
//!
//! Provides configuration management for the Mushaf core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every bridge and setting the font engine needs. It
//! enforces fail-fast validation so a host learns about a missing capability
//! at startup rather than on the first page render.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - Downloads font assets from the remote origin
//! - `FileSystemAccess` - Stores font assets locally
//! - `SettingsStore` - Persists the preload completion marker
//!
//! ## Optional Dependencies
//!
//! - `FontRegistrar` - Hands loaded fonts to the host text stack. Without it
//!   the core still caches fonts but cannot register them.
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! all four bridges are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, PreloadSettings};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .font_origin("https://cdn.example.com/fonts/")
//!     .assets_dir("/data/app/fonts")
//!     .http_client(Arc::new(MyHttpClient))
//!     .file_system(Arc::new(MyFileSystem))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .preload(PreloadSettings::default().with_concurrency(8))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Panics with an actionable message: no origin was configured
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing font origin");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{FileSystemAccess, FontRegistrar, HttpClient, SettingsStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default number of pages fetched concurrently in one window.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default pause between two consecutive windows.
pub const DEFAULT_WINDOW_PAUSE: Duration = Duration::from_millis(100);

/// Default key of the persisted preload marker.
pub const DEFAULT_CACHE_KEY: &str = "quran_fonts_preload";

/// Default preload generation.
pub const DEFAULT_CACHE_VERSION: &str = "1.0";

const MAX_CONCURRENCY: usize = 64;
const MAX_WINDOW_PAUSE: Duration = Duration::from_secs(60);

/// Preload tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadSettings {
    /// Pages fetched concurrently per window
    pub concurrency: usize,
    /// Pause between windows (not applied after the last one)
    pub window_pause: Duration,
    /// Settings key of the completion marker
    pub cache_key: String,
    /// Generation tag; bumping it invalidates an earlier completed preload
    pub cache_version: String,
    /// Pages to preload. `None` means the priority page catalogue.
    pub pages: Option<Vec<u16>>,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            window_pause: DEFAULT_WINDOW_PAUSE,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            pages: None,
        }
    }
}

impl PreloadSettings {
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

    pub fn with_pages(mut self, pages: impl Into<Vec<u16>>) -> Self {
        self.pages = Some(pages.into());
        self
    }

    /// Validates the preload settings
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config(
                "Preload concurrency must be at least 1".to_string(),
            ));
        }

        if self.concurrency > MAX_CONCURRENCY {
            return Err(Error::Config(format!(
                "Preload concurrency exceeds maximum of {}",
                MAX_CONCURRENCY
            )));
        }

        if self.window_pause > MAX_WINDOW_PAUSE {
            return Err(Error::Config(
                "Window pause exceeds maximum of 60 seconds".to_string(),
            ));
        }

        if self.cache_key.trim().is_empty() {
            return Err(Error::Config("Preload cache key cannot be empty".to_string()));
        }

        if self.cache_version.trim().is_empty() {
            return Err(Error::Config(
                "Preload cache version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Core configuration for the Mushaf core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL the page fonts are served from, including the trailing `/`
    pub font_origin: String,

    /// Directory holding `QCF_P###.ttf` files. `None` means
    /// `<data directory>/fonts` as reported by the file system bridge.
    pub assets_dir: Option<PathBuf>,

    /// Where the desktop settings database lives, when one is created
    pub settings_db_path: Option<PathBuf>,

    pub http_client: Arc<dyn HttpClient>,

    pub file_system: Arc<dyn FileSystemAccess>,

    pub settings_store: Arc<dyn SettingsStore>,

    pub font_registrar: Option<Arc<dyn FontRegistrar>>,

    pub preload: PreloadSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("font_origin", &crate::logging::redact_url(&self.font_origin))
            .field("assets_dir", &self.assets_dir)
            .field("settings_db_path", &self.settings_db_path)
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field(
                "font_registrar",
                &self.font_registrar.as_ref().map(|_| "FontRegistrar { ... }"),
            )
            .field("preload", &self.preload)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The font origin is an http(s) URL
    /// - The assets directory, when set, is not empty
    /// - Preload settings are within bounds
    pub fn validate(&self) -> Result<()> {
        let origin = self.font_origin.trim();
        if origin.is_empty() {
            return Err(Error::Config("Font origin cannot be empty".to_string()));
        }

        if !(origin.starts_with("https://") || origin.starts_with("http://")) {
            return Err(Error::Config(format!(
                "Font origin must be an http(s) URL, got '{}'",
                crate::logging::redact_url(origin)
            )));
        }

        if let Some(dir) = &self.assets_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::Config("Assets directory cannot be empty".to_string()));
            }
        }

        self.preload.validate()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str, desktop_default: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required {}. \
             Desktop: ensure the 'desktop-shims' feature is enabled to use the default {}. \
             Mobile: inject the platform-native implementation.",
            capability, purpose, desktop_default
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing(
        "HttpClient",
        "to download font assets",
        "ReqwestHttpClient",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Ok(Arc::new(bridge_desktop::TokioFileSystem::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(capability_missing(
        "FileSystemAccess",
        "to store font assets",
        "TokioFileSystem",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(
    settings_db_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use core_async::runtime::{Builder, Handle};
    use std::thread;

    let path = settings_db_path.cloned().ok_or_else(|| {
        Error::Config(
            "Settings database path is required when no SettingsStore is injected. \
             Use .settings_db_path() to set it."
                .to_string(),
        )
    })?;

    let init_store = move || -> Result<SqliteSettingsStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create runtime for default settings store: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqliteSettingsStore::new(path))
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
            })
    };

    // `block_on` cannot nest inside a running runtime, so hop to a fresh thread.
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(init_store).join().map_err(|_| {
            Error::Internal("Thread panicked while creating default SettingsStore".to_string())
        })??,
        Err(_) => init_store()?,
    };

    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(
    _settings_db_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    Err(capability_missing(
        "SettingsStore",
        "to persist the preload marker",
        "SqliteSettingsStore",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_font_registrar() -> Option<Arc<dyn FontRegistrar>> {
    Some(Arc::new(bridge_desktop::InMemoryFontRegistry::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_font_registrar() -> Option<Arc<dyn FontRegistrar>> {
    None
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    font_origin: Option<String>,
    assets_dir: Option<PathBuf>,
    settings_db_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    font_registrar: Option<Arc<dyn FontRegistrar>>,
    preload: Option<PreloadSettings>,
}

impl CoreConfigBuilder {
    /// Sets the remote origin the page fonts are downloaded from.
    ///
    /// The origin is concatenated with `QCF_P###.TTF`, so it must end with
    /// the path separator.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .font_origin("https://cdn.example.com/fonts/");
    /// ```
    pub fn font_origin(mut self, origin: impl Into<String>) -> Self {
        self.font_origin = Some(origin.into());
        self
    }

    /// Sets the local directory for cached font files.
    pub fn assets_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.assets_dir = Some(path.into());
        self
    }

    /// Sets where the default SQLite settings store is created.
    ///
    /// Only used when no `SettingsStore` is injected and `desktop-shims` is
    /// enabled.
    pub fn settings_db_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_db_path = Some(path.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn font_registrar(mut self, registrar: Arc<dyn FontRegistrar>) -> Self {
        self.font_registrar = Some(registrar);
        self
    }

    pub fn preload(mut self, settings: PreloadSettings) -> Self {
        self.preload = Some(settings);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if:
    /// - The font origin is missing or not an http(s) URL
    /// - A required bridge is missing and no desktop default applies
    /// - Preload settings are out of bounds
    pub fn build(self) -> Result<CoreConfig> {
        let font_origin = self.font_origin.ok_or_else(|| {
            Error::Config("Font origin is required. Use .font_origin() to set it.".to_string())
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_db_path.as_ref())?,
        };

        let font_registrar = self
            .font_registrar
            .or_else(provide_default_font_registrar);

        let config = CoreConfig {
            font_origin,
            assets_dir: self.assets_dir,
            settings_db_path: self.settings_db_path,
            http_client,
            file_system,
            settings_store,
            font_registrar,
            preload: self.preload.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
