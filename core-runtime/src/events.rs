//! # Event Bus System
//!
//! Provides an event-driven surface for the Mushaf core using a broadcast
//! channel. Hosts subscribe once and receive typed notifications about font
//! preloading, cache maintenance and registration without polling.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchy, one variant per domain
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   emit    ┌───────────┐   subscribe   ┌────────────┐
//! │ PreloadSession ├──────────>│           ├──────────────>│ UI / host  │
//! └────────────────┘           │ EventBus  │               └────────────┘
//! ┌────────────────┐   emit    │ (broadcast│   subscribe   ┌────────────┐
//! │ PageFontLoader ├──────────>│  channel) ├──────────────>│ Telemetry  │
//! └────────────────┘           └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, FontEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Fonts(FontEvent::PreloadReset))
//!     .ok();
//!
//! assert_eq!(
//!     subscriber.try_recv().unwrap(),
//!     CoreEvent::Fonts(FontEvent::PreloadReset)
//! );
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Page progress is emitted once per page, so a 604-page preload can lag a
//!   small buffer; subscribers should keep going.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.
//!
//! Emitting with no subscribers returns an error; publishers ignore it.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Font preload, cache and registration events
    Fonts(FontEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Fonts(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Fonts(FontEvent::FontRegistrationFailed { .. }) => EventSeverity::Error,
            CoreEvent::Fonts(FontEvent::PreloadPartiallyFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Fonts(FontEvent::PreloadCompleted { .. })
            | CoreEvent::Fonts(FontEvent::PreloadSkipped { .. })
            | CoreEvent::Fonts(FontEvent::CacheCleared { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Font Events
// ============================================================================

/// Events emitted by the font preload engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FontEvent {
    /// A preload run began scheduling downloads.
    PreloadStarted {
        /// Number of pages requested in this run.
        total: usize,
        /// Preload generation being satisfied.
        version: String,
    },
    /// One page settled (downloaded, already cached, or failed).
    PageProgress {
        page: u16,
        /// Pages settled so far in this run.
        current: usize,
        total: usize,
        /// `round(current / total * 100)`
        percentage: u8,
        success: bool,
        /// The page was already on disk before this run.
        cached: bool,
    },
    /// The persisted marker already covers the requested generation.
    PreloadSkipped { version: String },
    /// Every requested page is on disk and the marker was written.
    PreloadCompleted {
        total: usize,
        downloaded: usize,
        from_cache: usize,
    },
    /// Some pages failed; no marker was written.
    PreloadPartiallyFailed {
        failed: usize,
        total: usize,
        failed_pages: Vec<u16>,
    },
    /// The completion marker was cleared.
    PreloadReset,
    /// Cached font files were deleted.
    CacheCleared { deleted: usize },
    /// A page font was handed to the host text stack.
    FontRegistered { page: u16, family: String },
    /// The host refused a page font. The cached file is kept.
    FontRegistrationFailed { page: u16, message: String },
}

impl FontEvent {
    fn description(&self) -> &str {
        match self {
            FontEvent::PreloadStarted { .. } => "Font preload started",
            FontEvent::PageProgress { .. } => "Font page settled",
            FontEvent::PreloadSkipped { .. } => "Font preload already satisfied",
            FontEvent::PreloadCompleted { .. } => "Font preload completed",
            FontEvent::PreloadPartiallyFailed { .. } => "Font preload partially failed",
            FontEvent::PreloadReset => "Font preload marker reset",
            FontEvent::CacheCleared { .. } => "Font cache cleared",
            FontEvent::FontRegistered { .. } => "Font registered",
            FontEvent::FontRegistrationFailed { .. } => "Font registration failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to core events.
///
/// Cloning is cheap: clones share the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream, FontEvent};
///
/// let event_bus = EventBus::new(100);
/// let progress_only = EventStream::new(event_bus.subscribe()).filter(|event| {
///     matches!(event, CoreEvent::Fonts(FontEvent::PageProgress { .. }))
/// });
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events that match `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(page: u16, current: usize) -> CoreEvent {
        CoreEvent::Fonts(FontEvent::PageProgress {
            page,
            current,
            total: 3,
            percentage: ((current as f64 / 3.0) * 100.0).round() as u8,
            success: true,
            cached: false,
        })
    }

    #[core_async::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[core_async::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(CoreEvent::Fonts(FontEvent::PreloadReset)).is_err());
    }

    #[core_async::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Fonts(FontEvent::PreloadStarted {
            total: 50,
            version: "1.0".to_string(),
        });

        assert_eq!(bus.emit(event.clone()).unwrap(), 2);
        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[core_async::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).filter(|event| {
            matches!(
                event,
                CoreEvent::Fonts(FontEvent::PreloadCompleted { .. })
            )
        });

        bus.emit(progress(1, 1)).ok();
        bus.emit(progress(2, 2)).ok();

        let done = CoreEvent::Fonts(FontEvent::PreloadCompleted {
            total: 2,
            downloaded: 2,
            from_cache: 0,
        });
        bus.emit(done.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), done);
        assert!(stream.try_recv().is_none());
    }

    #[core_async::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for page in 1..=5u16 {
            bus.emit(progress(page, page as usize)).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Fonts(FontEvent::FontRegistrationFailed {
            page: 7,
            message: "rejected".to_string(),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);

        let partial = CoreEvent::Fonts(FontEvent::PreloadPartiallyFailed {
            failed: 1,
            total: 3,
            failed_pages: vec![2],
        });
        assert_eq!(partial.severity(), EventSeverity::Warning);

        let skipped = CoreEvent::Fonts(FontEvent::PreloadSkipped {
            version: "1.0".to_string(),
        });
        assert_eq!(skipped.severity(), EventSeverity::Info);

        assert_eq!(progress(1, 1).severity(), EventSeverity::Debug);
        assert_eq!(skipped.description(), "Font preload already satisfied");
    }

    #[core_async::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut sub = bus.subscribe();

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = core_async::task::spawn(async move {
            for page in 1..=10u16 {
                bus1.emit(progress(page, page as usize)).ok();
            }
        });

        let handle2 = core_async::task::spawn(async move {
            for page in 11..=20u16 {
                bus2.emit(CoreEvent::Fonts(FontEvent::FontRegistered {
                    page,
                    family: format!("QCF_P{:03}", page),
                }))
                .ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        let mut count = 0;
        while sub.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Fonts(FontEvent::PreloadPartiallyFailed {
            failed: 1,
            total: 3,
            failed_pages: vec![2],
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Fonts\""));
        assert!(json.contains("\"event\":\"PreloadPartiallyFailed\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[core_async::test]
    async fn test_try_recv_with_event() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());

        let event = CoreEvent::Fonts(FontEvent::CacheCleared { deleted: 4 });
        bus.emit(event.clone()).ok();

        let received = stream.try_recv().unwrap().unwrap();
        assert_eq!(received, event);
    }
}
