//! Runtime-agnostic async facade for the Mushaf core.
//!
//! Every core-* and bridge-* crate goes through this crate instead of naming
//! the executor directly. Today the only backing runtime is Tokio; keeping the
//! indirection means a host with a different event loop only has to swap this
//! crate.
//!
//! # Modules
//!
//! - `task`: Task spawning and cooperative yielding
//! - `time`: Sleep, timeout, instants
//! - `sync`: Async-aware locks, semaphores and channels
//! - `io` / `fs`: Async I/O traits and filesystem helpers
//! - `runtime`: Executor handles and `block_on`
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration};
//!
//! async fn pause_between_windows() {
//!     sleep(Duration::from_millis(100)).await;
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod fs;
pub mod io;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
