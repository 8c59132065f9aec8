//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the Mushaf core and
//! platform-specific implementations. Each trait represents a capability that
//! the font engine requires but that must be implemented differently per
//! platform (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Streaming downloads, with
//!   [`RetryPolicy`](http::RetryPolicy) for transient failures
//! - [`FileSystemAccess`](storage::FileSystemAccess) - File I/O for cached font assets
//!
//! ### Persistence
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences (preload marker)
//!
//! ### Rendering
//! - [`FontRegistrar`](fonts::FontRegistrar) - Hands font bytes to the host text stack
//!
//! ### Utilities
//! - [`LoggerSink`](logger::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | iOS      | host-provided       |
//! | Android  | host-provided       |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should keep network failures (`Network`, `Http`) distinct from local I/O
//! failures (`Io`, `OperationFailed`): the core classifies per-page failures
//! from that distinction.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared across
//! async tasks behind `Arc`.

pub mod error;
pub mod fonts;
pub mod http;
pub mod logger;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use fonts::{FontFormat, FontRegistrar};
pub use http::{HttpClient, RetryPolicy};
pub use logger::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use storage::{FileMetadata, FileSystemAccess, SettingsStore};
