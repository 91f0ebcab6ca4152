//! Worker pool loop and the per-URL processing pipeline
//!
//! Every worker runs the same loop against one shared [`RunContext`]:
//! reserve a page-budget slot, claim an entry, process it, release the
//! entry, then sleep for the politeness delay. A failure while processing a
//! URL (including a panic) is confined to that URL.

use crate::config::CrawlPlan;
use crate::crawler::events::{EventBus, PageBody, PageRecord, ProgressUpdate};
use crate::crawler::fetcher::{FetchError, FetchResponse, Fetcher};
use crate::crawler::parser::{parse_html, LinkExtractor};
use crate::crawler::stats::CrawlStats;
use crate::frontier::{Claim, Frontier, FrontierEntry};
use crate::robots::RobotsResolver;
use crate::url::normalize_url;
use crate::RippleError;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Upper bound on one idle wait when the queue is momentarily empty
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// Queue empty and nothing in flight
    Drained,

    /// `max_pages` pages were processed
    BudgetReached,

    /// `stop()` was called
    Stopped,
}

/// What happened to one claimed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageOutcome {
    /// Fetched and recorded; counts against the page budget
    Processed,

    /// Dropped without error (robots.txt, re-check failed)
    Skipped,

    /// Counted as an error
    Failed,
}

/// State shared by every worker of one run
pub(crate) struct RunContext {
    pub plan: CrawlPlan,
    pub frontier: Frontier,
    pub robots: RobotsResolver,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub stats: CrawlStats,
    pub events: Arc<EventBus>,
    results: Mutex<Vec<PageRecord>>,

    stop_requested: AtomicBool,
    budget_reached: AtomicBool,

    /// Budget slots taken: pages processed plus pages being processed
    reserved: AtomicU64,
}

impl RunContext {
    pub fn new(
        plan: CrawlPlan,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        events: Arc<EventBus>,
    ) -> Self {
        let frontier = Frontier::new(plan.max_depth, plan.filter.clone());
        let robots = RobotsResolver::new(Arc::clone(&fetcher), plan.fetch.clone());

        Self {
            plan,
            frontier,
            robots,
            fetcher,
            extractor,
            stats: CrawlStats::new(),
            events,
            results: Mutex::new(Vec::new()),
            stop_requested: AtomicBool::new(false),
            budget_reached: AtomicBool::new(false),
            reserved: AtomicU64::new(0),
        }
    }

    /// Offers the seed URLs at depth 0; returns how many were admitted
    pub fn seed(&self) -> u64 {
        let admitted = self
            .plan
            .seeds
            .iter()
            .filter(|seed| self.frontier.offer(seed.as_str(), 0))
            .count() as u64;
        self.stats.record_queued(admitted);
        admitted
    }

    /// Cooperative stop: no new claims or offers, in-flight work finishes
    pub fn request_stop(&self) {
        if !self.stop_requested.swap(true, Ordering::SeqCst) {
            tracing::info!("Stop requested for crawl '{}'", self.plan.name);
        }
        self.frontier.close();
    }

    pub fn should_stop(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
            || self.budget_reached.load(Ordering::SeqCst)
            || self.stats.pages_processed() >= self.plan.max_pages
    }

    pub fn completion_reason(&self) -> CompletionReason {
        if self.stop_requested.load(Ordering::SeqCst) {
            CompletionReason::Stopped
        } else if self.budget_reached.load(Ordering::SeqCst) {
            CompletionReason::BudgetReached
        } else {
            CompletionReason::Drained
        }
    }

    /// Takes a page-budget slot if one is free
    fn try_reserve(&self) -> bool {
        let max = self.plan.max_pages;
        self.reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |taken| {
                (taken < max).then_some(taken + 1)
            })
            .is_ok()
    }

    fn release(&self) {
        self.reserved.fetch_sub(1, Ordering::SeqCst);
    }

    fn mark_budget_reached(&self) {
        if !self.budget_reached.swap(true, Ordering::SeqCst) {
            tracing::info!(
                "Page budget of {} reached for crawl '{}'",
                self.plan.max_pages,
                self.plan.name
            );
        }
        self.frontier.close();
    }

    fn push_result(&self, record: PageRecord) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Moves the collected records out of the context
    pub fn take_results(&self) -> Vec<PageRecord> {
        std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn fail(&self, url: &str, error: RippleError) -> PageOutcome {
        tracing::warn!("Error processing {}: {}", url, error);
        self.stats.record_error();
        self.events.error(&error, url);
        PageOutcome::Failed
    }

    /// Per-worker delay before the next claim
    async fn politeness_delay(&self, url: &Url) -> Duration {
        if self.plan.respect_robots {
            self.plan
                .politeness_delay
                .max(self.robots.crawl_delay(url).await)
        } else {
            self.plan.politeness_delay
        }
    }
}

/// Runs one worker until the run drains or stops
pub(crate) async fn run_worker(ctx: Arc<RunContext>, worker_id: usize) {
    tracing::debug!("Worker {} started", worker_id);

    loop {
        if ctx.should_stop() {
            break;
        }

        if !ctx.try_reserve() {
            // Every remaining slot is held by a page in flight
            ctx.frontier.wait_for_change(IDLE_WAIT).await;
            continue;
        }

        let entry = match ctx.frontier.claim() {
            Claim::Entry(entry) => entry,
            Claim::Pending => {
                ctx.release();
                ctx.frontier.wait_for_change(IDLE_WAIT).await;
                continue;
            }
            Claim::Drained => {
                ctx.release();
                break;
            }
        };

        tracing::debug!(
            "Worker {} processing [depth {}] {}",
            worker_id,
            entry.depth,
            entry.url
        );

        // Run the pipeline as its own task so a panic is isolated to this URL
        let outcome = match tokio::spawn(process_url(Arc::clone(&ctx), entry.clone())).await {
            Ok(outcome) => outcome,
            Err(e) => ctx.fail(
                entry.url.as_str(),
                RippleError::WorkerPanicked(e.to_string()),
            ),
        };

        if outcome != PageOutcome::Processed {
            ctx.release();
        }
        ctx.frontier.complete(&entry.url);

        if ctx.stats.pages_processed() >= ctx.plan.max_pages {
            ctx.mark_budget_reached();
        }

        // Skipped URLs never reached the target
        if outcome != PageOutcome::Skipped && !ctx.should_stop() {
            let delay = ctx.politeness_delay(&entry.url).await;
            if !delay.is_zero() {
                ctx.frontier.sleep_unless_closed(delay).await;
            }
        }
    }

    tracing::debug!("Worker {} exiting", worker_id);
}

/// Processes a single claimed URL
///
/// This method:
/// 1. Re-checks depth and URL patterns
/// 2. Checks robots.txt (if enabled)
/// 3. Fetches the page
/// 4. Classifies the body and extracts title/text
/// 5. Records the page
/// 6. Extracts links and offers them at `depth + 1`
/// 7. Emits progress
pub(crate) async fn process_url(ctx: Arc<RunContext>, entry: FrontierEntry) -> PageOutcome {
    let url = entry.url.as_str();

    if !ctx.frontier.permits(url, entry.depth) {
        tracing::debug!("URL {} no longer admissible, dropping", url);
        return PageOutcome::Skipped;
    }

    if ctx.plan.respect_robots && !ctx.robots.is_allowed(url).await {
        tracing::info!("URL {} disallowed by robots.txt", url);
        return PageOutcome::Skipped;
    }

    let response = match ctx.fetcher.fetch(url, &ctx.plan.fetch).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            let source = FetchError::Status {
                url: url.to_string(),
                status: response.status,
            };
            return ctx.fail(url, fetch_error(url, source));
        }
        Err(source) => return ctx.fail(url, fetch_error(url, source)),
    };

    let final_url = resolve_final_url(&ctx, &entry, &response);
    let record = build_record(&entry, &final_url, response, ctx.plan.include_binary);

    ctx.push_result(record.clone());
    ctx.events.page_crawled(&record);
    let processed = ctx.stats.record_processed();

    if ctx.plan.follows_links_at(entry.depth) {
        if let PageBody::Html(html) = &record.body {
            enqueue_links(&ctx, &entry, html, &final_url);
        }
    }

    ctx.events.progress(&ProgressUpdate::new(
        processed,
        ctx.frontier.size() as u64,
        ctx.plan.max_pages,
        Some(format!("Crawled {}", url)),
    ));

    PageOutcome::Processed
}

fn fetch_error(url: &str, source: FetchError) -> RippleError {
    RippleError::Fetch {
        url: url.to_string(),
        source,
    }
}

/// Final URL after redirects; also marks it visited so it is not fetched twice
fn resolve_final_url(ctx: &RunContext, entry: &FrontierEntry, response: &FetchResponse) -> Url {
    match normalize_url(&response.final_url) {
        Ok(final_url) if final_url != entry.url => {
            if ctx.frontier.mark_visited(&final_url) {
                tracing::debug!("{} redirected to {}", entry.url, final_url);
            }
            final_url
        }
        _ => entry.url.clone(),
    }
}

/// Runs the link extractor and offers every result to the frontier
fn enqueue_links(ctx: &RunContext, entry: &FrontierEntry, html: &str, base_url: &Url) {
    let links = match ctx.extractor.extract_links(html, base_url) {
        Ok(links) => links,
        Err(e) => {
            tracing::warn!("Link extraction failed for {}: {}", entry.url, e);
            return;
        }
    };

    let found = links.len();
    let admitted = links
        .iter()
        .filter(|link| ctx.frontier.offer(link, entry.depth + 1))
        .count();
    ctx.stats.record_queued(admitted as u64);

    tracing::debug!(
        "{}: {} links found, {} queued at depth {}",
        entry.url,
        found,
        admitted,
        entry.depth + 1
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Html,
    Text,
    Binary,
}

/// Classifies a body by its declared content type
///
/// Without a declared type, valid UTF-8 is treated as text.
fn content_kind(content_type: Option<&str>, body: &[u8]) -> ContentKind {
    let Some(content_type) = content_type else {
        return if std::str::from_utf8(body).is_ok() {
            ContentKind::Text
        } else {
            ContentKind::Binary
        };
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if mime == "text/html" || mime == "application/xhtml+xml" {
        ContentKind::Html
    } else if mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime.ends_with("+json")
        || mime == "application/json"
        || mime == "application/xml"
        || mime == "application/javascript"
    {
        ContentKind::Text
    } else {
        ContentKind::Binary
    }
}

fn build_record(
    entry: &FrontierEntry,
    final_url: &Url,
    response: FetchResponse,
    include_binary: bool,
) -> PageRecord {
    let content_type = response.content_type().map(str::to_string);
    let kind = content_kind(content_type.as_deref(), &response.body);

    let (title, text, body) = match kind {
        ContentKind::Html => {
            let html = String::from_utf8_lossy(&response.body).into_owned();
            let parsed = parse_html(&html, final_url).ok();
            let title = parsed.as_ref().and_then(|p| p.title.clone());
            let text = parsed.map(|p| p.text);
            (title, text, PageBody::Html(html))
        }
        ContentKind::Text => {
            let text = String::from_utf8_lossy(&response.body).into_owned();
            (None, Some(text.clone()), PageBody::Text(text))
        }
        ContentKind::Binary if include_binary => (None, None, PageBody::Binary(response.body)),
        ContentKind::Binary => (None, None, PageBody::Omitted),
    };

    PageRecord {
        url: entry.url.to_string(),
        final_url: final_url.to_string(),
        depth: entry.depth,
        status: response.status,
        content_type,
        title,
        text,
        body,
        crawled_at: Utc::now(),
    }
}
