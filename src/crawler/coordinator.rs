//! Crawler coordinator - run lifecycle and orchestration
//!
//! A [`Crawler`] owns the fetch and link-extraction capabilities plus the
//! observer list. Each call to [`Crawler::start`] builds a fresh run:
//! - Compiling and validating the configuration
//! - Seeding the frontier
//! - Spawning the worker pool
//! - Waiting for the pool to drain, hit its budget, or be stopped
//! - Emitting the single completion event

use crate::config::{CrawlConfig, CrawlPlan};
use crate::crawler::events::{CrawlObserver, EventBus, PageRecord};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::stats::StatsSnapshot;
use crate::crawler::worker::{run_worker, CompletionReason, RunContext};
use crate::{Result, RippleError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub stats: StatsSnapshot,

    /// One record per successfully processed URL, in completion order
    pub results: Vec<PageRecord>,

    pub reason: CompletionReason,
}

/// Main crawler structure
///
/// At most one run is active per crawler. Share it behind an `Arc` to call
/// [`Crawler::stop`] or [`Crawler::stats`] while a run is in progress.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    events: Arc<EventBus>,
    running: AtomicBool,
    stop_pending: AtomicBool,
    active: Mutex<Option<Arc<RunContext>>>,
    last_stats: Mutex<StatsSnapshot>,
}

impl Crawler {
    /// Creates a crawler around the given fetch and extraction capabilities
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn LinkExtractor>) -> Self {
        Self {
            fetcher,
            extractor,
            events: Arc::new(EventBus::new()),
            running: AtomicBool::new(false),
            stop_pending: AtomicBool::new(false),
            active: Mutex::new(None),
            last_stats: Mutex::new(StatsSnapshot::default()),
        }
    }

    /// Creates a crawler that fetches over HTTP and extracts links with scraper
    pub fn with_http() -> Result<Self> {
        let fetcher = HttpFetcher::new().map_err(RippleError::HttpClient)?;
        Ok(Self::new(Arc::new(fetcher), Arc::new(HtmlLinkExtractor)))
    }

    /// Registers an observer for all subsequent events
    pub fn subscribe(&self, observer: Arc<dyn CrawlObserver>) {
        self.events.subscribe(observer);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Runs a crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run finished (drained, budget reached or stopped)
    /// * `Err(RippleError::AlreadyRunning)` - Another run is active; nothing was changed
    /// * `Err(RippleError::Config)` - The configuration is invalid; no run was started
    pub async fn start(&self, config: CrawlConfig) -> Result<CrawlOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RippleError::AlreadyRunning);
        }
        let _running = RunningGuard(self);

        let plan = CrawlPlan::compile(&config)?;
        let ctx = Arc::new(RunContext::new(
            plan,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            Arc::clone(&self.events),
        ));

        ctx.stats.mark_started();
        self.set_active(Some(Arc::clone(&ctx)));
        if self.stop_pending.swap(false, Ordering::SeqCst) {
            ctx.request_stop();
        }

        let seeded = ctx.seed();
        tracing::info!(
            "Starting crawl '{}': {} seeds queued, {} workers, budget {} pages",
            ctx.plan.name,
            seeded,
            ctx.plan.concurrency,
            ctx.plan.max_pages
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..ctx.plan.concurrency {
            workers.spawn(run_worker(Arc::clone(&ctx), worker_id));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        ctx.frontier.close();
        ctx.stats.mark_finished();

        let stats = ctx.stats.snapshot(&ctx.frontier);
        let results = ctx.take_results();
        let reason = ctx.completion_reason();

        tracing::info!(
            "Crawl '{}' finished ({:?}): {} pages, {} errors",
            ctx.plan.name,
            reason,
            stats.pages_processed,
            stats.errors
        );

        *self
            .last_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = stats.clone();
        self.set_active(None);

        self.events.complete(&stats, &results);

        Ok(CrawlOutcome {
            stats,
            results,
            reason,
        })
    }

    /// Requests a cooperative stop of the active run
    ///
    /// In-flight pages finish; nothing new is claimed. Calling this with no
    /// active run, or more than once, has no effect.
    pub fn stop(&self) {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.as_ref() {
            Some(ctx) => ctx.request_stop(),
            // Started but not yet active; the run picks this up once it is
            None if self.is_running() => self.stop_pending.store(true, Ordering::SeqCst),
            None => {}
        }
    }

    /// Live statistics of the active run, or the last finished run's
    pub fn stats(&self) -> StatsSnapshot {
        if let Some(ctx) = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return ctx.stats.snapshot(&ctx.frontier);
        }

        self.last_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_active(&self, ctx: Option<Arc<RunContext>>) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = ctx;
    }
}

/// Clears the active run and the running flag when a run ends, however it ends
struct RunningGuard<'a>(&'a Crawler);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set_active(None);
        self.0.stop_pending.store(false, Ordering::SeqCst);
        self.0.running.store(false, Ordering::SeqCst);
    }
}
