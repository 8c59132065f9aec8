//! # Local Asset Store
//!
//! Abstracts the local side of the cache: existence checks, reads, listing,
//! deletion and the download-to-disk primitive. [`BridgeLocalStore`] is the
//! production implementation over the host `FileSystemAccess` and
//! `HttpClient` bridges.
//!
//! ## Download Safety
//!
//! Downloads stream into `<path>.part` and are renamed onto `<path>` only
//! after the body has been fully written. A crash mid-download can leave a
//! `.part` file behind but never a truncated `.ttf`, which the cache would
//! otherwise report as present forever.

use crate::error::{FontError, Result};
use async_trait::async_trait;
use bridge_traits::{FileSystemAccess, HttpClient};
use bytes::Bytes;
use core_async::io::{AsyncReadExt, AsyncWriteExt};
use core_runtime::logging::{redact_url, strip_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const PARTIAL_SUFFIX: &str = ".part";
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// One file found in the assets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// File name without directory (`QCF_P001.ttf`)
    pub name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// Local persistence for font assets.
///
/// Failures are reported as `FontError::Storage`, except download failures
/// on the remote side, which are `FontError::Network`.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool>;

    async fn read_all(&self, path: &Path) -> Result<Bytes>;

    /// Downloads `url` into `path` and returns the number of bytes written.
    ///
    /// On failure nothing is left at `path`.
    async fn write_from_remote(&self, url: &str, path: &Path) -> Result<u64>;

    /// Lists the regular files in `dir`. A missing directory is empty.
    async fn list(&self, dir: &Path) -> Result<Vec<StoredAsset>>;

    /// Deletes `path`; returns `false` when there was nothing to delete.
    async fn delete(&self, path: &Path) -> Result<bool>;
}

/// [`LocalStore`] backed by the host file system and HTTP bridges.
pub struct BridgeLocalStore {
    file_system: Arc<dyn FileSystemAccess>,
    http_client: Arc<dyn HttpClient>,
}

impl BridgeLocalStore {
    pub fn new(file_system: Arc<dyn FileSystemAccess>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            file_system,
            http_client,
        }
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut partial = path.as_os_str().to_owned();
        partial.push(PARTIAL_SUFFIX);
        PathBuf::from(partial)
    }

    /// Streams the response body into `partial` and returns the byte count.
    async fn stream_to(&self, url: &str, partial: &Path) -> Result<u64> {
        let mut reader = self.http_client.download_stream(url.to_string()).await?;
        let mut writer = self.file_system.open_write_stream(partial).await?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut written: u64 = 0;

        loop {
            let read = reader
                .read(&mut buffer)
                .await
                .map_err(|e| FontError::Network(format!("download interrupted: {}", e)))?;
            if read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..read])
                .await
                .map_err(|e| FontError::Storage(format!("write failed: {}", e)))?;
            written += read as u64;
        }

        writer
            .shutdown()
            .await
            .map_err(|e| FontError::Storage(format!("flush failed: {}", e)))?;

        if written == 0 {
            return Err(FontError::Network("empty response body".to_string()));
        }

        Ok(written)
    }

    async fn discard_partial(&self, partial: &Path) {
        let display = partial.to_string_lossy();
        let name = strip_path(&display);
        match self.file_system.delete_file(partial).await {
            Ok(()) => debug!(file = %name, "Removed partial download"),
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(file = %name, error = %e, "Failed to remove partial download"),
        }
    }
}

#[async_trait]
impl LocalStore for BridgeLocalStore {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.file_system.exists(path).await?)
    }

    async fn read_all(&self, path: &Path) -> Result<Bytes> {
        self.file_system
            .read_file(path)
            .await
            .map_err(|e| FontError::Storage(e.to_string()))
    }

    #[instrument(skip(self, url, path), fields(url = %redact_url(url), file = ?path.file_name()))]
    async fn write_from_remote(&self, url: &str, path: &Path) -> Result<u64> {
        let partial = Self::partial_path(path);

        let written = match self.stream_to(url, &partial).await {
            Ok(written) => written,
            Err(e) => {
                self.discard_partial(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = self.file_system.rename(&partial, path).await {
            self.discard_partial(&partial).await;
            return Err(FontError::Storage(format!("rename failed: {}", e)));
        }

        debug!(bytes = written, "Font asset stored");
        Ok(written)
    }

    async fn list(&self, dir: &Path) -> Result<Vec<StoredAsset>> {
        let entries = match self.file_system.list_directory(dir).await {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(FontError::Storage(e.to_string())),
        };

        let mut assets = Vec::with_capacity(entries.len());
        for path in entries {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            let size_bytes = match self.file_system.metadata(&path).await {
                Ok(meta) if meta.is_directory => continue,
                Ok(meta) => meta.size,
                Err(e) => {
                    debug!(file = %name, error = %e, "Metadata unavailable, counting as empty");
                    0
                }
            };

            assets.push(StoredAsset {
                name,
                size_bytes,
                path,
            });
        }

        Ok(assets)
    }

    async fn delete(&self, path: &Path) -> Result<bool> {
        match self.file_system.delete_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(FontError::Storage(e.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            BridgeLocalStore::partial_path(Path::new("/data/fonts/QCF_P001.ttf")),
            PathBuf::from("/data/fonts/QCF_P001.ttf.part")
        );
    }
}
