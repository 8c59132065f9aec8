//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides implementations of every bridge trait the font engine
//! needs, using desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`
//! - `FileSystemAccess` using `tokio::fs`
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `FontRegistrar` as an in-memory registry
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let fs = TokioFileSystem::new();
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod filesystem;
mod fonts;
mod http;
mod settings;

pub use filesystem::TokioFileSystem;
pub use fonts::InMemoryFontRegistry;
pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;
