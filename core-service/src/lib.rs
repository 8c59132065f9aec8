//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, file system,
//! settings, font registration) into the page font engine and exposes the
//! handful of calls a reader UI needs: start or reset the preload, watch its
//! progress, inspect or clear the cache, and load the font of the page about
//! to be rendered. Desktop apps typically enable the `desktop-shims` feature
//! (which depends on `bridge-desktop`); mobile hosts inject their own bridges
//! through [`CoreConfig`].
//!
//! One `CoreService` owns exactly one [`PreloadSession`], so overlapping
//! preloads inside a process are serialized by construction.

pub mod error;

pub use error::{CoreError, Result};

pub use bridge_traits::{
    BridgeError, FileSystemAccess, FontFormat, FontRegistrar, HttpClient, RetryPolicy,
    SettingsStore,
};
pub use core_fonts::{
    BatchReport, CacheStats, FetchOutcome, FontError, PreloadOutcome, PreloadProgress,
    PreloadState,
};
pub use core_runtime::config::{CoreConfig, PreloadSettings};
pub use core_runtime::events::{CoreEvent, EventStream, FontEvent};

use core_fonts::config::DEFAULT_ASSETS_DIRECTORY;
use core_fonts::{
    pages, AssetLayout, BatchScheduler, BridgeLocalStore, CacheInspector, FontCacheConfig,
    LocalStore, MarkerStore, PageFontLoader, PreloadPlan, PreloadSession, SingleAssetFetcher,
};
use core_runtime::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};
use core_runtime::logging::redact_url;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[cfg(feature = "desktop-shims")]
use bridge_desktop::TokioFileSystem;
#[cfg(feature = "desktop-shims")]
use std::path::PathBuf;

struct ServiceInner {
    font_origin: String,
    cache: FontCacheConfig,
    session: PreloadSession,
    inspector: CacheInspector,
    loader: Option<PageFontLoader>,
    event_bus: EventBus,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<ServiceInner>,
}

impl CoreService {
    /// Create a new service from a validated configuration.
    ///
    /// Resolves the assets directory (`<data dir>/fonts` unless configured)
    /// and makes sure it exists.
    #[instrument(skip(config), fields(origin = %redact_url(&config.font_origin)))]
    pub async fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let assets_dir = match &config.assets_dir {
            Some(dir) => dir.clone(),
            None => config
                .file_system
                .get_data_directory()
                .await
                .map_err(|e| {
                    CoreError::InitializationFailed(format!(
                        "Failed to resolve data directory: {}",
                        e
                    ))
                })?
                .join(DEFAULT_ASSETS_DIRECTORY),
        };

        config
            .file_system
            .create_dir_all(&assets_dir)
            .await
            .map_err(|e| {
                CoreError::InitializationFailed(format!(
                    "Failed to create assets directory: {}",
                    e
                ))
            })?;

        let cache = FontCacheConfig::from_settings(&config.preload, assets_dir);
        cache.validate()?;

        let event_bus = EventBus::new(DEFAULT_EVENT_BUFFER_SIZE);
        let layout = AssetLayout::new(&cache.assets_directory);
        let store: Arc<dyn LocalStore> = Arc::new(BridgeLocalStore::new(
            config.file_system.clone(),
            config.http_client.clone(),
        ));
        let fetcher = Arc::new(SingleAssetFetcher::new(layout.clone(), store.clone()));

        let preload_pages = config
            .preload
            .pages
            .clone()
            .unwrap_or_else(pages::priority_pages);
        let plan = PreloadPlan::new(
            preload_pages,
            config.font_origin.clone(),
            cache.cache_version.clone(),
        );

        let scheduler = BatchScheduler::from_config(fetcher.clone(), &cache)?;
        let marker = MarkerStore::new(config.settings_store.clone(), cache.cache_key.clone());
        let session =
            PreloadSession::new(scheduler, marker, plan).with_event_bus(event_bus.clone());

        let inspector = CacheInspector::new(layout, store).with_event_bus(event_bus.clone());

        let loader = match &config.font_registrar {
            Some(registrar) => Some(
                PageFontLoader::new(fetcher, registrar.clone()).with_event_bus(event_bus.clone()),
            ),
            None => {
                warn!("No FontRegistrar configured; page fonts can be cached but not registered");
                None
            }
        };

        info!(
            pages = session.plan().pages.len(),
            concurrency = cache.concurrency,
            version = %cache.cache_version,
            "Core service initialized"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                font_origin: config.font_origin,
                cache,
                session,
                inspector,
                loader,
                event_bus,
            }),
        })
    }

    /// Directory holding the cached page fonts.
    pub fn assets_dir(&self) -> &Path {
        &self.inner.cache.assets_directory
    }

    /// Pages the preload covers.
    pub fn preload_pages(&self) -> &[u16] {
        &self.inner.session.plan().pages
    }

    // ------------------------------------------------------------------
    // Preload
    // ------------------------------------------------------------------

    /// Runs the preload unless it already completed for the configured
    /// version or is currently running.
    pub async fn start_preload(&self) -> Result<PreloadOutcome> {
        Ok(self.inner.session.start().await?)
    }

    /// Forgets the completed preload so the next start runs again.
    /// Cached files are kept.
    ///
    /// A preload still in flight is not cancelled and rewrites the marker if
    /// it succeeds.
    pub async fn reset_preload(&self) {
        self.inner.session.reset().await;
    }

    /// Re-reads the persisted marker.
    pub async fn check_preloaded(&self) -> bool {
        self.inner.session.is_already_preloaded().await
    }

    pub fn progress(&self) -> PreloadProgress {
        self.inner.session.progress()
    }

    pub fn preload_state(&self) -> PreloadState {
        self.inner.session.state()
    }

    pub fn is_completed(&self) -> bool {
        self.inner.session.is_completed()
    }

    pub fn is_preloading(&self) -> bool {
        self.inner.session.is_running()
    }

    pub fn last_error(&self) -> Option<FontError> {
        self.inner.session.last_error()
    }

    // ------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------

    pub async fn cache_stats(&self) -> CacheStats {
        self.inner.inspector.stats().await
    }

    /// Deletes cached page fonts; `None` clears all of them.
    pub async fn clear_cache(&self, pages: Option<&[u16]>) -> usize {
        self.inner.inspector.clear(pages).await
    }

    pub async fn is_page_cached(&self, page: u16) -> bool {
        self.inner.inspector.is_cached(page).await
    }

    pub async fn check_pages(&self, pages: &[u16]) -> BTreeMap<u16, bool> {
        self.inner.inspector.check_many(pages).await
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Makes the font of `page` available to the host text stack.
    ///
    /// Fails only when no `FontRegistrar` was configured; fetch and
    /// registration problems are reported in the outcome.
    pub async fn load_page_font(&self, page: u16) -> Result<FetchOutcome> {
        let loader = self
            .inner
            .loader
            .as_ref()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "FontRegistrar".to_string(),
                message: "A FontRegistrar is required to load page fonts. \
                          Inject one with CoreConfig::builder().font_registrar()."
                    .to_string(),
            })?;

        Ok(loader.load_page(page, &self.inner.font_origin).await)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Subscribes to font events. Past events are not replayed.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.inner.event_bus.subscribe())
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Keeps everything under `app_root`: fonts in `data/fonts`, the settings
/// database in `settings.db`.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let core = core_service::bootstrap_desktop(
///     "https://cdn.example.com/fonts/",
///     "/home/reader/.local/share/mushaf",
/// )
/// .await?;
/// core.start_preload().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(
    font_origin: impl Into<String>,
    app_root: impl Into<PathBuf>,
) -> Result<CoreService> {
    bootstrap_desktop_with(font_origin, app_root, PreloadSettings::default()).await
}

/// [`bootstrap_desktop`] with custom preload settings.
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop_with(
    font_origin: impl Into<String>,
    app_root: impl Into<PathBuf>,
    preload: PreloadSettings,
) -> Result<CoreService> {
    let root: PathBuf = app_root.into();
    let file_system = TokioFileSystem::with_data_directory(root.join("data"));

    let config = CoreConfig::builder()
        .font_origin(font_origin)
        .file_system(Arc::new(file_system))
        .settings_db_path(root.join("settings.db"))
        .preload(preload)
        .build()?;

    CoreService::new(config).await
}
