//! Synchronization primitives.
//!
//! All primitives are async-aware: holding a lock across an `.await` never
//! blocks the executor thread.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::Mutex;
//!
//! async fn bump(counter: &Mutex<u32>) {
//!     let mut guard = counter.lock().await;
//!     *guard += 1;
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard, Semaphore, SemaphorePermit,
};
