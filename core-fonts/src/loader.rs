//! On-demand page font loading.
//!
//! Used when a page is about to be rendered: make sure the font is on disk,
//! read it, and hand it to the host text stack.

use crate::error::FontError;
use crate::fetcher::{FetchOutcome, SingleAssetFetcher};
use bridge_traits::{FontFormat, FontRegistrar};
use core_runtime::events::{CoreEvent, EventBus, FontEvent};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Fetches and registers single page fonts.
pub struct PageFontLoader {
    fetcher: Arc<SingleAssetFetcher>,
    registrar: Arc<dyn FontRegistrar>,
    event_bus: Option<EventBus>,
}

impl PageFontLoader {
    pub fn new(fetcher: Arc<SingleAssetFetcher>, registrar: Arc<dyn FontRegistrar>) -> Self {
        Self {
            fetcher,
            registrar,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Ensures the font for `page` is cached, then registers it under its
    /// `QCF_P###` name.
    ///
    /// A registration failure yields a failed outcome with
    /// `FontError::Registration`; the cached file is left in place.
    #[instrument(skip(self, origin))]
    pub async fn load_page(&self, page: u16, origin: &str) -> FetchOutcome {
        let outcome = self.fetcher.ensure_cached(page, origin).await;
        if !outcome.success {
            return outcome;
        }

        let identity = match self.fetcher.layout().identity(page, origin) {
            Ok(identity) => identity,
            Err(e) => return FetchOutcome::failed(page, e),
        };

        let data = match self.fetcher.store().read_all(&identity.local_path).await {
            Ok(data) => data,
            Err(e) => {
                warn!(page, error = %e, "Failed to read cached font");
                return FetchOutcome {
                    error: Some(e),
                    success: false,
                    ..outcome
                };
            }
        };

        match self
            .registrar
            .register_font(&identity.name, data, FontFormat::TrueType)
            .await
        {
            Ok(family) => {
                debug!(page, family = %family, "Page font registered");
                self.emit(FontEvent::FontRegistered { page, family });
                outcome
            }
            Err(e) => {
                let error = FontError::Registration(e.to_string());
                warn!(page, error = %error, "Page font registration failed");
                self.emit(FontEvent::FontRegistrationFailed {
                    page,
                    message: error.to_string(),
                });
                FetchOutcome {
                    error: Some(error),
                    success: false,
                    ..outcome
                }
            }
        }
    }

    fn emit(&self, event: FontEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Fonts(event)).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AssetLayout;
    use crate::store::fake::FakeLocalStore;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bytes::Bytes;
    use parking_lot::Mutex;

    const ORIGIN: &str = "https://cdn.example/fonts/";

    #[derive(Default)]
    struct RecordingRegistrar {
        registered: Mutex<Vec<(String, Bytes, FontFormat)>>,
        reject: bool,
    }

    #[async_trait]
    impl FontRegistrar for RecordingRegistrar {
        async fn register_font(
            &self,
            name: &str,
            data: Bytes,
            format: FontFormat,
        ) -> BridgeResult<String> {
            if self.reject {
                return Err(BridgeError::OperationFailed("bad font".to_string()));
            }
            self.registered.lock().push((name.to_string(), data, format));
            Ok(name.to_string())
        }
    }

    fn loader(store: Arc<FakeLocalStore>, registrar: Arc<RecordingRegistrar>) -> PageFontLoader {
        let fetcher = Arc::new(SingleAssetFetcher::new(AssetLayout::new("/fonts"), store));
        PageFontLoader::new(fetcher, registrar)
    }

    #[core_async::test]
    async fn test_load_registers_cached_bytes() {
        let store = Arc::new(FakeLocalStore::new());
        store.insert("/fonts/QCF_P007.ttf", b"\x00\x01\x00\x00glyphs");
        let registrar = Arc::new(RecordingRegistrar::default());

        let outcome = loader(store.clone(), registrar.clone()).load_page(7, ORIGIN).await;

        assert_eq!(outcome, FetchOutcome::from_cache(7));
        let registered = registrar.registered.lock();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].0, "QCF_P007");
        assert_eq!(registered[0].1, Bytes::from_static(b"\x00\x01\x00\x00glyphs"));
        assert_eq!(registered[0].2, FontFormat::TrueType);
        assert_eq!(store.downloads(), 0);
    }

    #[core_async::test]
    async fn test_load_downloads_missing_font() {
        let store = Arc::new(FakeLocalStore::new());
        let registrar = Arc::new(RecordingRegistrar::default());

        let outcome = loader(store.clone(), registrar.clone()).load_page(8, ORIGIN).await;

        assert_eq!(outcome, FetchOutcome::downloaded(8));
        assert_eq!(store.downloads(), 1);
        assert_eq!(registrar.registered.lock().len(), 1);
    }

    #[core_async::test]
    async fn test_fetch_failure_skips_registration() {
        let store = Arc::new(FakeLocalStore::new());
        store.fail_url("https://cdn.example/fonts/QCF_P009.TTF");
        let registrar = Arc::new(RecordingRegistrar::default());

        let outcome = loader(store, registrar.clone()).load_page(9, ORIGIN).await;

        assert!(outcome.error.unwrap().is_network_error());
        assert!(registrar.registered.lock().is_empty());
    }

    #[core_async::test]
    async fn test_registration_failure_keeps_file() {
        let store = Arc::new(FakeLocalStore::new());
        store.insert("/fonts/QCF_P010.ttf", b"not a font");
        let registrar = Arc::new(RecordingRegistrar {
            reject: true,
            ..Default::default()
        });
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let outcome = loader(store.clone(), registrar)
            .with_event_bus(bus)
            .load_page(10, ORIGIN)
            .await;

        assert!(!outcome.success);
        assert!(outcome.cached);
        assert!(matches!(outcome.error, Some(FontError::Registration(_))));
        assert!(store
            .files
            .lock()
            .contains_key(std::path::Path::new("/fonts/QCF_P010.ttf")));
        assert!(matches!(
            rx.try_recv().unwrap(),
            CoreEvent::Fonts(FontEvent::FontRegistrationFailed { page: 10, .. })
        ));
    }
}
