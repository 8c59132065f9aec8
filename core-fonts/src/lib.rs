//! # Page Font Cache Engine
//!
//! Fetches per-page Quran fonts from a remote origin, keeps them in a local
//! directory, and remembers across restarts whether a preload generation
//! already completed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌────────────────┐
//! │  PreloadSession  │─────>│  MarkerStore   │──> SettingsStore (bridge)
//! └────────┬─────────┘      └────────────────┘
//!          v
//! ┌──────────────────┐
//! │  BatchScheduler  │  windows of `concurrency` pages
//! └────────┬─────────┘
//!          v
//! ┌──────────────────┐      ┌────────────────┐
//! │SingleAssetFetcher│─────>│  AssetLayout   │  QCF_P###, URLs, paths
//! └────────┬─────────┘      └────────────────┘
//!          v
//! ┌──────────────────┐
//! │    LocalStore    │──> FileSystemAccess + HttpClient (bridges)
//! └──────────────────┘
//! ```
//!
//! [`CacheInspector`] and [`PageFontLoader`] sit beside the session and reuse
//! the same layout and store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_fonts::{
//!     AssetLayout, BatchScheduler, BridgeLocalStore, MarkerStore, PreloadPlan,
//!     PreloadSession, SingleAssetFetcher, pages,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(BridgeLocalStore::new(file_system, http_client));
//! let fetcher = Arc::new(SingleAssetFetcher::new(AssetLayout::new(fonts_dir), store));
//! let scheduler = BatchScheduler::new(fetcher, 5, Duration::from_millis(100))?;
//! let marker = MarkerStore::new(settings, "quran_fonts_preload");
//! let plan = PreloadPlan::new(pages::priority_pages(), "https://cdn.example/fonts/", "1.0");
//!
//! let session = PreloadSession::new(scheduler, marker, plan);
//! session.start().await?;
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod identity;
pub mod inspector;
pub mod loader;
pub mod marker;
pub mod pages;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod store;

pub use config::FontCacheConfig;
pub use error::{FontError, Result};
pub use fetcher::{FetchOutcome, SingleAssetFetcher};
pub use identity::{AssetIdentity, AssetLayout};
pub use inspector::{CacheInspector, CacheStats};
pub use loader::PageFontLoader;
pub use marker::{MarkerStore, PreloadMarker};
pub use progress::PreloadProgress;
pub use scheduler::{BatchReport, BatchScheduler};
pub use session::{PreloadOutcome, PreloadPlan, PreloadSession, PreloadState};
pub use store::{BridgeLocalStore, LocalStore, StoredAsset};
