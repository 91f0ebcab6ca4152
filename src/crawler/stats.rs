//! Live crawl statistics
//!
//! Counters are only ever changed through atomic increments and can be read
//! at any time from any task.

use crate::frontier::Frontier;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Counters for one crawl run
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_processed: AtomicU64,
    pages_queued: AtomicU64,
    errors: AtomicU64,
    start_time: Mutex<Option<DateTime<Utc>>>,
    end_time: Mutex<Option<DateTime<Utc>>>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_started(&self) {
        *self.start_time.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
    }

    pub fn mark_finished(&self) {
        *self.end_time.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
    }

    /// Counts one successfully processed page; returns the new total
    pub fn record_processed(&self) -> u64 {
        self.pages_processed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Counts URLs admitted to the frontier
    pub fn record_queued(&self, count: u64) {
        self.pages_queued.fetch_add(count, Ordering::SeqCst);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn pages_processed(&self) -> u64 {
        self.pages_processed.load(Ordering::SeqCst)
    }

    pub fn pages_queued(&self) -> u64 {
        self.pages_queued.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    /// Point-in-time copy, including live frontier sizes
    pub fn snapshot(&self, frontier: &Frontier) -> StatsSnapshot {
        StatsSnapshot {
            pages_processed: self.pages_processed(),
            pages_queued: self.pages_queued(),
            errors: self.errors(),
            start_time: *self.start_time.lock().unwrap_or_else(PoisonError::into_inner),
            end_time: *self.end_time.lock().unwrap_or_else(PoisonError::into_inner),
            queue_size: frontier.size(),
            visited: frontier.visited_len(),
            in_flight: frontier.in_flight_len(),
        }
    }
}

/// Copy of [`CrawlStats`] plus frontier sizes at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_processed: u64,
    pub pages_queued: u64,
    pub errors: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub queue_size: usize,
    pub visited: usize,
    pub in_flight: usize,
}

impl StatsSnapshot {
    /// Wall-clock run time, once the run has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }

    /// Pages per second over the whole run
    pub fn pages_per_second(&self) -> Option<f64> {
        let millis = self.duration()?.num_milliseconds();
        (millis > 0).then(|| self.pages_processed as f64 * 1000.0 / millis as f64)
    }
}
