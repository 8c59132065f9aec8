//! `BridgeLocalStore` over the real desktop file system with a mocked origin.

use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::HttpClient;
use core_fonts::{
    AssetLayout, BatchScheduler, BridgeLocalStore, CacheInspector, FontError, LocalStore,
    SingleAssetFetcher,
};
use mockall::mock;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadBuf};

const ORIGIN: &str = "https://cdn.example/fonts/";
const FONT: &[u8] = b"\x00\x01\x00\x00glyf-table-bytes";

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn download_stream(
            &self,
            url: String,
        ) -> BridgeResult<Box<dyn AsyncRead + Send + Unpin>>;
    }
}

/// Hands out a few bytes, then fails like a dropped connection.
struct BrokenStream {
    sent: bool,
}

impl AsyncRead for BrokenStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        if self.sent {
            return Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }
        self.sent = true;
        buf.put_slice(&FONT[..4]);
        Poll::Ready(Ok(()))
    }
}

struct Fixture {
    root: PathBuf,
    fonts_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("core-fonts-{}", uuid::Uuid::new_v4()));
        let fonts_dir = root.join("data").join("fonts");
        Self { root, fonts_dir }
    }

    fn file_system(&self) -> Arc<TokioFileSystem> {
        Arc::new(TokioFileSystem::with_data_directory(self.root.join("data")))
    }

    fn store(&self, http: MockHttpClient) -> Arc<BridgeLocalStore> {
        Arc::new(BridgeLocalStore::new(self.file_system(), Arc::new(http)))
    }

    fn font_path(&self, page: u16) -> PathBuf {
        self.fonts_dir.join(format!("QCF_P{:03}.ttf", page))
    }

    fn partial_path(&self, page: u16) -> PathBuf {
        self.fonts_dir.join(format!("QCF_P{:03}.ttf.part", page))
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn serving(body: &'static [u8]) -> MockHttpClient {
    let mut http = MockHttpClient::new();
    http.expect_download_stream()
        .returning(move |_| Ok(Box::new(Cursor::new(body)) as Box<dyn AsyncRead + Send + Unpin>));
    http
}

#[tokio::test]
async fn download_is_renamed_into_place() {
    let fixture = Fixture::new();
    let mut http = MockHttpClient::new();
    http.expect_download_stream()
        .withf(|url| url == "https://cdn.example/fonts/QCF_P001.TTF")
        .times(1)
        .returning(|_| Ok(Box::new(Cursor::new(FONT)) as Box<dyn AsyncRead + Send + Unpin>));
    let store = fixture.store(http);

    let written = store
        .write_from_remote("https://cdn.example/fonts/QCF_P001.TTF", &fixture.font_path(1))
        .await
        .unwrap();

    assert_eq!(written, FONT.len() as u64);
    assert_eq!(std::fs::read(fixture.font_path(1)).unwrap(), FONT);
    assert!(!fixture.partial_path(1).exists());
    assert!(store.exists(&fixture.font_path(1)).await.unwrap());
    assert_eq!(store.read_all(&fixture.font_path(1)).await.unwrap().as_ref(), FONT);
}

#[tokio::test]
async fn http_error_leaves_nothing_behind() {
    let fixture = Fixture::new();
    let mut http = MockHttpClient::new();
    http.expect_download_stream().returning(|url| {
        Err(BridgeError::Http {
            status: 404,
            url,
        })
    });
    let store = fixture.store(http);

    let err = store
        .write_from_remote("https://cdn.example/fonts/QCF_P002.TTF", &fixture.font_path(2))
        .await
        .unwrap_err();

    assert!(err.is_network_error());
    assert!(!fixture.font_path(2).exists());
    assert!(!fixture.partial_path(2).exists());
}

#[tokio::test]
async fn interrupted_stream_removes_partial_file() {
    let fixture = Fixture::new();
    let mut http = MockHttpClient::new();
    http.expect_download_stream()
        .returning(|_| {
            Ok(Box::new(BrokenStream { sent: false }) as Box<dyn AsyncRead + Send + Unpin>)
        });
    let store = fixture.store(http);

    let err = store
        .write_from_remote("https://cdn.example/fonts/QCF_P003.TTF", &fixture.font_path(3))
        .await
        .unwrap_err();

    assert!(matches!(err, FontError::Network(ref m) if m.contains("interrupted")));
    assert!(!fixture.font_path(3).exists());
    assert!(!fixture.partial_path(3).exists());
}

#[tokio::test]
async fn empty_body_is_a_network_error() {
    let fixture = Fixture::new();
    let store = fixture.store(serving(b""));

    let err = store
        .write_from_remote("https://cdn.example/fonts/QCF_P004.TTF", &fixture.font_path(4))
        .await
        .unwrap_err();

    assert_eq!(err, FontError::Network("empty response body".to_string()));
    assert!(!fixture.font_path(4).exists());
    assert!(!fixture.partial_path(4).exists());
}

#[tokio::test]
async fn listing_and_deleting() {
    let fixture = Fixture::new();
    let store = fixture.store(serving(FONT));

    assert!(store.list(&fixture.fonts_dir).await.unwrap().is_empty());
    assert!(!store.delete(&fixture.font_path(9)).await.unwrap());

    store
        .write_from_remote("https://cdn.example/fonts/QCF_P009.TTF", &fixture.font_path(9))
        .await
        .unwrap();
    std::fs::create_dir_all(fixture.fonts_dir.join("nested")).unwrap();

    let listed = store.list(&fixture.fonts_dir).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "QCF_P009.ttf");
    assert_eq!(listed[0].size_bytes, FONT.len() as u64);

    assert!(store.delete(&fixture.font_path(9)).await.unwrap());
    assert!(!Path::new(&fixture.font_path(9)).exists());
}

#[tokio::test]
async fn batch_over_disk_then_stats() {
    let fixture = Fixture::new();
    let store = fixture.store(serving(FONT));
    let layout = AssetLayout::new(&fixture.fonts_dir);

    let fetcher = Arc::new(SingleAssetFetcher::new(layout.clone(), store.clone()));
    let scheduler = BatchScheduler::new(fetcher, 2, Duration::from_millis(1)).unwrap();
    let report = scheduler.run(&[1, 2, 3], ORIGIN, |_, _, _| {}).await.unwrap();
    assert_eq!(report.downloaded(), 3);
    assert_eq!(report.windows, 2);

    std::fs::write(fixture.fonts_dir.join("notes.txt"), b"ignored").unwrap();

    let inspector = CacheInspector::new(layout, store);
    let stats = inspector.stats().await;
    assert_eq!(stats.cached_pages, vec![1, 2, 3]);
    assert_eq!(stats.total_size_bytes, 3 * FONT.len() as u64);

    assert_eq!(inspector.clear(None).await, 3);
    assert!(inspector.stats().await.is_empty());
    assert!(fixture.fonts_dir.join("notes.txt").exists());
}

#[tokio::test]
async fn repeated_page_in_one_window_downloads_once() {
    for _ in 0..10 {
        let fixture = Fixture::new();
        let mut http = MockHttpClient::new();
        http.expect_download_stream()
            .times(1)
            .returning(|_| Ok(Box::new(Cursor::new(FONT)) as Box<dyn AsyncRead + Send + Unpin>));
        let store = fixture.store(http);

        let fetcher = Arc::new(SingleAssetFetcher::new(
            AssetLayout::new(&fixture.fonts_dir),
            store,
        ));
        let scheduler = BatchScheduler::new(fetcher, 5, Duration::ZERO).unwrap();
        let report = scheduler.run(&[1, 1], ORIGIN, |_, _, _| {}).await.unwrap();

        assert_eq!(report.total(), 2);
        assert!(report.all_succeeded(), "{:?}", report.outcomes);
        assert_eq!(std::fs::read(fixture.font_path(1)).unwrap(), FONT);
        assert!(!fixture.partial_path(1).exists());
    }
}
