//! # Preload Session
//!
//! Owns one preload run at a time over a fixed plan (pages, origin, version)
//! and exposes its state for polling or through the event bus.
//!
//! ## State Machine
//!
//! ```text
//!          start()            marker ok
//! Idle ───────────> Checking ───────────> Completed
//!   ^                   │
//!   │                   │ marker missing / stale
//!   │ reset()           v
//!   └──────────────  Running ──all ok──> Completed (marker written)
//!                       │
//!                       └──any failed──> PartiallyFailed { failed }
//! ```
//!
//! Terminal states are resting states: `start()` may be called again. A
//! second `start()` while a run is in flight returns
//! [`PreloadOutcome::AlreadyRunning`] without touching anything.

use crate::error::{FontError, Result};
use crate::marker::MarkerStore;
use crate::progress::PreloadProgress;
use crate::scheduler::{BatchReport, BatchScheduler};
use core_runtime::events::{CoreEvent, EventBus, FontEvent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, instrument, warn};

/// Lifecycle state of a [`PreloadSession`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreloadState {
    #[default]
    Idle,
    Checking,
    Running,
    Completed,
    PartiallyFailed { failed: usize },
}

impl PreloadState {
    pub fn is_active(&self) -> bool {
        matches!(self, PreloadState::Checking | PreloadState::Running)
    }
}

/// What a call to [`PreloadSession::start`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Another run of this session was already in flight.
    AlreadyRunning,
    /// The marker already covered this version; nothing was scheduled.
    AlreadyPreloaded,
    /// Every page succeeded and the marker was written.
    Completed(BatchReport),
    /// At least one page failed; the marker was not written.
    PartiallyFailed(BatchReport),
}

/// Pages, origin and generation a session preloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadPlan {
    pub pages: Vec<u16>,
    pub origin: String,
    pub version: String,
}

impl PreloadPlan {
    pub fn new(
        pages: impl Into<Vec<u16>>,
        origin: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            pages: pages.into(),
            origin: origin.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionStatus {
    state: PreloadState,
    progress: PreloadProgress,
    completed: bool,
    last_error: Option<FontError>,
}

/// Releases the in-flight flag when a run ends or its future is dropped.
struct RunGuard<'a> {
    session: &'a PreloadSession,
}

impl<'a> RunGuard<'a> {
    fn acquire(session: &'a PreloadSession) -> Option<Self> {
        session
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { session })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        {
            let mut status = self.session.status.write();
            if status.state.is_active() {
                status.state = PreloadState::Idle;
            }
        }
        self.session.running.store(false, Ordering::Release);
    }
}

/// Drives preload runs and remembers their result.
pub struct PreloadSession {
    scheduler: BatchScheduler,
    marker: MarkerStore,
    plan: PreloadPlan,
    status: RwLock<SessionStatus>,
    running: AtomicBool,
    event_bus: Option<EventBus>,
}

impl PreloadSession {
    pub fn new(scheduler: BatchScheduler, marker: MarkerStore, plan: PreloadPlan) -> Self {
        let status = SessionStatus {
            progress: PreloadProgress::new(plan.pages.len()),
            ..SessionStatus::default()
        };

        Self {
            scheduler,
            marker,
            plan,
            status: RwLock::new(status),
            running: AtomicBool::new(false),
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn plan(&self) -> &PreloadPlan {
        &self.plan
    }

    pub fn state(&self) -> PreloadState {
        self.status.read().state
    }

    pub fn progress(&self) -> PreloadProgress {
        self.status.read().progress
    }

    pub fn is_completed(&self) -> bool {
        self.status.read().completed
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn last_error(&self) -> Option<FontError> {
        self.status.read().last_error.clone()
    }

    /// Reads the persisted marker without starting a run.
    pub async fn is_already_preloaded(&self) -> bool {
        self.marker.is_satisfied(&self.plan.version).await
    }

    /// Runs the preload unless one is in flight or the marker is satisfied.
    ///
    /// Per-page failures are reported through
    /// [`PreloadOutcome::PartiallyFailed`]; only configuration errors are
    /// returned as `Err`.
    #[instrument(skip(self), fields(total = self.plan.pages.len(), version = %self.plan.version))]
    pub async fn start(&self) -> Result<PreloadOutcome> {
        let Some(_guard) = RunGuard::acquire(self) else {
            info!("Font preload already in progress");
            return Ok(PreloadOutcome::AlreadyRunning);
        };

        self.status.write().state = PreloadState::Checking;

        if self.marker.is_satisfied(&self.plan.version).await {
            info!("Fonts already preloaded");
            {
                let mut status = self.status.write();
                status.state = PreloadState::Completed;
                status.completed = true;
                status.last_error = None;
            }
            self.emit(FontEvent::PreloadSkipped {
                version: self.plan.version.clone(),
            });
            return Ok(PreloadOutcome::AlreadyPreloaded);
        }

        let total = self.plan.pages.len();
        {
            let mut status = self.status.write();
            status.state = PreloadState::Running;
            status.progress = PreloadProgress::new(total);
            status.last_error = None;
        }

        info!("Starting font preload");
        self.emit(FontEvent::PreloadStarted {
            total,
            version: self.plan.version.clone(),
        });

        let result = self
            .scheduler
            .run(&self.plan.pages, &self.plan.origin, |current, total, outcome| {
                let percentage = {
                    let mut status = self.status.write();
                    status.progress.advance(current, outcome.page);
                    status.progress.percentage
                };
                self.emit(FontEvent::PageProgress {
                    page: outcome.page,
                    current,
                    total,
                    percentage,
                    success: outcome.success,
                    cached: outcome.cached,
                });
            })
            .await;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Font preload could not start");
                let mut status = self.status.write();
                status.state = PreloadState::Idle;
                status.last_error = Some(e.clone());
                return Err(e);
            }
        };

        if report.all_succeeded() {
            if let Err(e) = self.marker.mark_completed(&self.plan.version).await {
                warn!(error = %e, "Failed to persist preload marker");
            }

            {
                let mut status = self.status.write();
                status.state = PreloadState::Completed;
                status.completed = true;
            }

            info!(
                downloaded = report.downloaded(),
                from_cache = report.from_cache(),
                "Font preload completed"
            );
            self.emit(FontEvent::PreloadCompleted {
                total,
                downloaded: report.downloaded(),
                from_cache: report.from_cache(),
            });

            Ok(PreloadOutcome::Completed(report))
        } else {
            let failed = report.failed();
            {
                let mut status = self.status.write();
                status.state = PreloadState::PartiallyFailed { failed };
                status.last_error = Some(FontError::PartialBatchFailure { failed, total });
            }

            warn!(failed, total, "Font preload partially failed");
            self.emit(FontEvent::PreloadPartiallyFailed {
                failed,
                total,
                failed_pages: report.failed_pages(),
            });

            Ok(PreloadOutcome::PartiallyFailed(report))
        }
    }

    /// Forgets the completed preload. Never fails; marker errors are logged.
    ///
    /// Does not cancel a run in flight: its progress restarts from zero in
    /// the snapshot, and if that run then succeeds it writes the marker
    /// again. Drop the `start()` future first to make a reset stick.
    #[instrument(skip(self))]
    pub async fn reset(&self) {
        if let Err(e) = self.marker.clear().await {
            warn!(error = %e, "Failed to clear preload marker");
        }

        {
            let mut status = self.status.write();
            status.progress = PreloadProgress::new(self.plan.pages.len());
            status.completed = false;
            status.last_error = None;
            if !status.state.is_active() {
                status.state = PreloadState::Idle;
            }
        }

        info!("Font preload reset");
        self.emit(FontEvent::PreloadReset);
    }

    fn emit(&self, event: FontEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Fonts(event)).ok();
        }
    }
}
