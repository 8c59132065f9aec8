//! Preload progress snapshot

use serde::{Deserialize, Serialize};

/// Progress of the current (or last) preload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadProgress {
    /// Pages settled so far
    pub current: usize,

    /// Pages in the run
    pub total: usize,

    /// `round(current / total * 100)`
    pub percentage: u8,

    /// Page that settled most recently (0 before the first)
    pub last_page: u16,
}

impl PreloadProgress {
    /// Fresh progress for a run over `total` pages.
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            percentage: 0,
            last_page: 0,
        }
    }

    /// Records that `current` pages have settled, the latest being `page`.
    pub fn advance(&mut self, current: usize, page: u16) {
        self.current = current;
        self.last_page = page;
        self.percentage = percentage_of(current, self.total);
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.current >= self.total
    }
}

/// Rounded percentage, half away from zero. A zero total reads as 0%.
pub fn percentage_of(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let current = current.min(total) as u64;
    let total = total as u64;
    ((current * 200 + total) / (total * 2)) as u8
}
