//! Single-page fetch: local hit or download.

use crate::error::FontError;
use crate::identity::AssetLayout;
use crate::store::LocalStore;
use core_runtime::logging::redact_url;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of ensuring one page font is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub page: u16,
    pub success: bool,
    /// The file was already on disk before this call.
    pub cached: bool,
    pub error: Option<FontError>,
}

impl FetchOutcome {
    pub fn from_cache(page: u16) -> Self {
        Self {
            page,
            success: true,
            cached: true,
            error: None,
        }
    }

    pub fn downloaded(page: u16) -> Self {
        Self {
            page,
            success: true,
            cached: false,
            error: None,
        }
    }

    pub fn failed(page: u16, error: FontError) -> Self {
        Self {
            page,
            success: false,
            cached: false,
            error: Some(error),
        }
    }
}

/// Ensures a single page font is cached locally.
pub struct SingleAssetFetcher {
    layout: AssetLayout,
    store: Arc<dyn LocalStore>,
}

impl SingleAssetFetcher {
    pub fn new(layout: AssetLayout, store: Arc<dyn LocalStore>) -> Self {
        Self { layout, store }
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }

    /// Makes sure the font for `page` exists locally.
    ///
    /// Never fails: every problem is reported inside the outcome. A page that
    /// is already on disk costs one existence check and no network I/O.
    pub async fn ensure_cached(&self, page: u16, origin: &str) -> FetchOutcome {
        let identity = match self.layout.identity(page, origin) {
            Ok(identity) => identity,
            Err(e) => return FetchOutcome::failed(page, e),
        };

        match self.store.exists(&identity.local_path).await {
            Ok(true) => {
                debug!(page, name = %identity.name, "Font already cached");
                return FetchOutcome::from_cache(page);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(page, error = %e, "Existence check failed");
                return FetchOutcome::failed(page, e);
            }
        }

        match self
            .store
            .write_from_remote(&identity.remote_url, &identity.local_path)
            .await
        {
            Ok(bytes) => {
                debug!(page, bytes, "Font downloaded");
                FetchOutcome::downloaded(page)
            }
            Err(e) => {
                warn!(
                    page,
                    url = %redact_url(&identity.remote_url),
                    error = %e,
                    "Font download failed"
                );
                FetchOutcome::failed(page, e)
            }
        }
    }
}
