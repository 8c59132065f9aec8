//! Cache inspection and explicit clearing.

use crate::identity::{file_name_for, name_for, parse_page, AssetLayout};
use crate::store::{LocalStore, StoredAsset};
use core_runtime::events::{CoreEvent, EventBus, FontEvent};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Snapshot of what is cached on disk. Recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of page fonts on disk
    pub total_cached: usize,

    /// Cached pages, ascending
    pub cached_pages: Vec<u16>,

    /// Sum of the cached files' sizes
    pub total_size_bytes: u64,
}

impl CacheStats {
    pub fn is_empty(&self) -> bool {
        self.total_cached == 0
    }

    pub fn average_size_bytes(&self) -> u64 {
        if self.total_cached == 0 {
            return 0;
        }
        self.total_size_bytes / self.total_cached as u64
    }
}

/// Reads and prunes the assets directory.
pub struct CacheInspector {
    layout: AssetLayout,
    store: Arc<dyn LocalStore>,
    event_bus: Option<EventBus>,
}

impl CacheInspector {
    pub fn new(layout: AssetLayout, store: Arc<dyn LocalStore>) -> Self {
        Self {
            layout,
            store,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Page font files in the assets directory, paired with their page.
    /// Files that are not `QCF_P###.ttf` for a valid page are ignored.
    async fn page_assets(&self) -> Option<Vec<(u16, StoredAsset)>> {
        match self.store.list(self.layout.assets_dir()).await {
            Ok(assets) => Some(
                assets
                    .into_iter()
                    .filter_map(|asset| parse_page(&asset.name).map(|page| (page, asset)))
                    .collect(),
            ),
            Err(e) => {
                warn!(error = %e, "Failed to list font cache");
                None
            }
        }
    }

    /// Counts the cached page fonts. Listing errors yield an empty snapshot.
    pub async fn stats(&self) -> CacheStats {
        let Some(assets) = self.page_assets().await else {
            return CacheStats::default();
        };

        let mut cached_pages: Vec<u16> = assets.iter().map(|(page, _)| *page).collect();
        cached_pages.sort_unstable();

        CacheStats {
            total_cached: cached_pages.len(),
            total_size_bytes: assets.iter().map(|(_, asset)| asset.size_bytes).sum(),
            cached_pages,
        }
    }

    /// Deletes cached page fonts and returns how many were removed.
    ///
    /// `None` removes every page font; `Some(pages)` only those pages, so an
    /// empty slice removes nothing. Files that fail to delete are skipped.
    #[instrument(skip(self, pages), fields(requested = pages.map(|p| p.len())))]
    pub async fn clear(&self, pages: Option<&[u16]>) -> usize {
        let Some(assets) = self.page_assets().await else {
            return 0;
        };

        let wanted: Option<HashSet<String>> =
            pages.map(|pages| pages.iter().map(|&p| file_name_for(&name_for(p))).collect());

        let targets: Vec<StoredAsset> = assets
            .into_iter()
            .map(|(_, asset)| asset)
            .filter(|asset| wanted.as_ref().map_or(true, |w| w.contains(&asset.name)))
            .collect();

        let results = join_all(targets.iter().map(|asset| self.store.delete(&asset.path))).await;

        let mut deleted = 0;
        for (asset, result) in targets.iter().zip(results) {
            match result {
                Ok(true) => deleted += 1,
                Ok(false) => debug!(file = %asset.name, "Already gone"),
                Err(e) => warn!(file = %asset.name, error = %e, "Failed to delete cached font"),
            }
        }

        info!(deleted, "Font cache cleared");
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Fonts(FontEvent::CacheCleared { deleted })).ok();
        }

        deleted
    }

    /// Returns `true` if the page font is on disk. Errors read as `false`.
    pub async fn is_cached(&self, page: u16) -> bool {
        let Ok(path) = self.layout.local_path_for_page(page) else {
            return false;
        };

        match self.store.exists(&path).await {
            Ok(exists) => exists,
            Err(e) => {
                debug!(page, error = %e, "Existence check failed");
                false
            }
        }
    }

    /// Cache presence of several pages at once.
    pub async fn check_many(&self, pages: &[u16]) -> BTreeMap<u16, bool> {
        let results = join_all(pages.iter().map(|&page| self.is_cached(page))).await;
        pages.iter().copied().zip(results).collect()
    }
}
