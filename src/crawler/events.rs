//! Crawl events and the observer bus
//!
//! Any number of observers (storage, UI, logging) can subscribe to one
//! crawler; each receives every event of every run, in emission order per
//! worker.

use crate::crawler::stats::StatsSnapshot;
use crate::RippleError;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// Body retained for a crawled page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody {
    /// HTML document source
    Html(String),

    /// Other textual content (plain text, JSON, XML, ...)
    Text(String),

    /// Non-textual content, kept only when binary retention is enabled
    Binary(Vec<u8>),

    /// Non-textual content that was dropped
    Omitted,
}

impl PageBody {
    pub fn len(&self) -> usize {
        match self {
            Self::Html(s) | Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
            Self::Omitted => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A successfully crawled page
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// The normalized URL that was claimed
    pub url: String,

    /// URL of the final response, after redirects
    pub final_url: String,

    pub depth: u32,

    pub status: u16,

    pub content_type: Option<String>,

    pub title: Option<String>,

    /// Visible text for HTML pages, the content itself for other text
    pub text: Option<String>,

    pub body: PageBody,

    pub crawled_at: DateTime<Utc>,
}

/// Progress report emitted after every processed URL
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub processed: u64,
    pub queued: u64,

    /// The run's page budget
    pub total_budget: u64,

    /// `processed / total_budget`, in percent
    pub percentage: f64,

    pub log_entry: Option<String>,
}

impl ProgressUpdate {
    pub fn new(processed: u64, queued: u64, total_budget: u64, log_entry: Option<String>) -> Self {
        let percentage = if total_budget > 0 {
            (processed as f64 / total_budget as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        Self {
            processed,
            queued,
            total_budget,
            percentage,
            log_entry,
        }
    }
}

/// Receives crawl events
///
/// All methods default to no-ops so observers implement only what they
/// need. Callbacks run on worker tasks and must not block.
pub trait CrawlObserver: Send + Sync {
    fn on_progress(&self, _progress: &ProgressUpdate) {}

    fn on_page_crawled(&self, _page: &PageRecord) {}

    fn on_error(&self, _error: &RippleError, _url: &str) {}

    /// Called exactly once per run
    fn on_complete(&self, _stats: &StatsSnapshot, _results: &[PageRecord]) {}
}

/// Fan-out of events to every subscribed observer
#[derive(Default)]
pub struct EventBus {
    observers: RwLock<Vec<Arc<dyn CrawlObserver>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer; it receives events from the next emission on
    pub fn subscribe(&self, observer: Arc<dyn CrawlObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // Observers are called outside the lock so one may subscribe another.
    fn snapshot(&self) -> Vec<Arc<dyn CrawlObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn progress(&self, progress: &ProgressUpdate) {
        for observer in self.snapshot() {
            observer.on_progress(progress);
        }
    }

    pub fn page_crawled(&self, page: &PageRecord) {
        for observer in self.snapshot() {
            observer.on_page_crawled(page);
        }
    }

    pub fn error(&self, error: &RippleError, url: &str) {
        for observer in self.snapshot() {
            observer.on_error(error, url);
        }
    }

    pub fn complete(&self, stats: &StatsSnapshot, results: &[PageRecord]) {
        for observer in self.snapshot() {
            observer.on_complete(stats, results);
        }
    }
}

/// Observer that writes every event to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_progress(&self, progress: &ProgressUpdate) {
        tracing::debug!(
            "Progress: {}/{} pages ({:.1}%), {} queued",
            progress.processed,
            progress.total_budget,
            progress.percentage,
            progress.queued
        );
    }

    fn on_page_crawled(&self, page: &PageRecord) {
        tracing::info!(
            "Crawled [depth {}] {} (HTTP {}, {} bytes)",
            page.depth,
            page.url,
            page.status,
            page.body.len()
        );
    }

    fn on_error(&self, error: &RippleError, url: &str) {
        tracing::warn!("Failed {}: {}", url, error);
    }

    fn on_complete(&self, stats: &StatsSnapshot, results: &[PageRecord]) {
        tracing::info!(
            "Crawl finished: {} pages processed, {} queued, {} errors, {} results",
            stats.pages_processed,
            stats.pages_queued,
            stats.errors,
            results.len()
        );
    }
}
