//! Persisted "preload completed" marker.
//!
//! Stored as two settings entries: `<key>` = `"true"` and
//! `<key>_version` = the generation that completed.

use crate::error::Result;
use bridge_traits::SettingsStore;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPLETED_VALUE: &str = "true";

/// Snapshot of the persisted marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadMarker {
    pub completed: bool,
    pub version: Option<String>,
}

impl PreloadMarker {
    /// A marker satisfies a request only for the exact same version.
    pub fn satisfies(&self, version: &str) -> bool {
        self.completed && self.version.as_deref() == Some(version)
    }
}

/// Reads and writes the marker through the host settings store.
#[derive(Clone)]
pub struct MarkerStore {
    settings: Arc<dyn SettingsStore>,
    key: String,
}

impl MarkerStore {
    pub fn new(settings: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            settings,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version_key(&self) -> String {
        format!("{}_version", self.key)
    }

    pub async fn read(&self) -> Result<PreloadMarker> {
        let completed = self.settings.get_string(&self.key).await?;
        let version = self.settings.get_string(&self.version_key()).await?;

        Ok(PreloadMarker {
            completed: completed.as_deref() == Some(COMPLETED_VALUE),
            version,
        })
    }

    /// Returns `true` if a completed preload of `version` was recorded.
    /// A store that cannot be read counts as "not satisfied".
    pub async fn is_satisfied(&self, version: &str) -> bool {
        match self.read().await {
            Ok(marker) => marker.satisfies(version),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read preload marker");
                false
            }
        }
    }

    pub async fn mark_completed(&self, version: &str) -> Result<()> {
        self.settings.set_string(&self.key, COMPLETED_VALUE).await?;
        self.settings
            .set_string(&self.version_key(), version)
            .await?;
        debug!(key = %self.key, version, "Preload marker written");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.settings.delete(&self.key).await?;
        self.settings.delete(&self.version_key()).await?;
        debug!(key = %self.key, "Preload marker cleared");
        Ok(())
    }
}
