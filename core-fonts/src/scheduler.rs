//! # Batch Scheduler
//!
//! Runs [`SingleAssetFetcher::ensure_cached`] over an ordered page list in
//! windows of `concurrency` pages.
//!
//! ## Scheduling Model
//!
//! ```text
//! pages: [1 2 3 4 5], concurrency 2
//!
//! window 1: [1 2] ──settle──> pause
//! window 2: [3 4] ──settle──> pause
//! window 3: [5]   ──settle──> done   (no pause after the last window)
//! ```
//!
//! All fetches of a window are polled concurrently on the caller's task
//! through `FuturesUnordered`; nothing is spawned. The next window starts only
//! once every page of the current one has settled, so at most `concurrency`
//! downloads are ever in flight. Progress is reported per page in completion
//! order.

use crate::config::FontCacheConfig;
use crate::error::{FontError, Result};
use crate::fetcher::{FetchOutcome, SingleAssetFetcher};
use crate::identity::validate_origin;
use core_async::time::sleep;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Outcome of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One entry per input page, in completion order
    pub outcomes: Vec<FetchOutcome>,

    /// Number of windows executed
    pub windows: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn from_cache(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success && o.cached).count()
    }

    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success && !o.cached).count()
    }

    /// Failed pages, ascending.
    pub fn failed_pages(&self) -> Vec<u16> {
        let mut pages: Vec<u16> = self
            .outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.page)
            .collect();
        pages.sort_unstable();
        pages
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }
}

/// Windowed, concurrency-bounded driver for page fetches.
pub struct BatchScheduler {
    fetcher: Arc<SingleAssetFetcher>,
    concurrency: usize,
    window_pause: Duration,
}

impl BatchScheduler {
    /// Creates a scheduler. A zero `concurrency` is a configuration error.
    pub fn new(
        fetcher: Arc<SingleAssetFetcher>,
        concurrency: usize,
        window_pause: Duration,
    ) -> Result<Self> {
        if concurrency == 0 {
            return Err(FontError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            fetcher,
            concurrency,
            window_pause,
        })
    }

    pub fn from_config(
        fetcher: Arc<SingleAssetFetcher>,
        config: &FontCacheConfig,
    ) -> Result<Self> {
        Self::new(fetcher, config.concurrency, config.window_pause)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn fetcher(&self) -> &Arc<SingleAssetFetcher> {
        &self.fetcher
    }

    /// Ensures every page in `pages` is cached.
    ///
    /// `on_progress(completed, total, outcome)` fires once per input page as
    /// soon as it settles. Only an empty origin fails the whole run; per-page
    /// failures land in the report.
    ///
    /// A page listed more than once is fetched once; each repeat gets a copy
    /// of that outcome, so the report still holds one entry per input page.
    #[instrument(
        skip(self, pages, origin, on_progress),
        fields(total = pages.len(), concurrency = self.concurrency)
    )]
    pub async fn run<F>(
        &self,
        pages: &[u16],
        origin: &str,
        mut on_progress: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(usize, usize, &FetchOutcome) + Send,
    {
        validate_origin(origin)?;

        let (unique, copies) = dedupe(pages);
        if unique.len() < pages.len() {
            debug!(repeats = pages.len() - unique.len(), "Repeated pages fetched once");
        }

        let total = pages.len();
        let window_count = unique.len().div_ceil(self.concurrency);
        let mut outcomes = Vec::with_capacity(total);
        let mut completed = 0usize;

        for (index, window) in unique.chunks(self.concurrency).enumerate() {
            debug!(window = index + 1, of = window_count, size = window.len(), "Starting window");

            let mut in_flight: FuturesUnordered<_> = window
                .iter()
                .map(|&page| self.fetcher.ensure_cached(page, origin))
                .collect();

            while let Some(outcome) = in_flight.next().await {
                if let Some(error) = &outcome.error {
                    warn!(page = outcome.page, error = %error, "Page failed");
                }

                let repeats = copies.get(&outcome.page).copied().unwrap_or(1);
                for _ in 0..repeats {
                    completed += 1;
                    on_progress(completed, total, &outcome);
                    outcomes.push(outcome.clone());
                }
            }

            let is_last = index + 1 == window_count;
            if !is_last && !self.window_pause.is_zero() {
                sleep(self.window_pause).await;
            }
        }

        let report = BatchReport {
            outcomes,
            windows: window_count,
        };

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            from_cache = report.from_cache(),
            windows = report.windows,
            "Batch finished"
        );

        Ok(report)
    }
}

/// First occurrence of each page, in input order, and how often each appears.
fn dedupe(pages: &[u16]) -> (Vec<u16>, HashMap<u16, usize>) {
    let mut copies: HashMap<u16, usize> = HashMap::with_capacity(pages.len());
    let mut unique = Vec::with_capacity(pages.len());
    for &page in pages {
        let count = copies.entry(page).or_insert(0);
        if *count == 0 {
            unique.push(page);
        }
        *count += 1;
    }
    (unique, copies)
}
