//! Frontier: the shared FIFO work queue and its dedup ledger
//!
//! The frontier owns three pieces of shared state:
//! - the FIFO queue of entries awaiting a worker
//! - the visited set (every URL ever admitted; never shrinks)
//! - the in-flight set (URLs a worker has claimed but not completed)
//!
//! All three live behind one mutex so admission (check-and-insert) and claim
//! (pop-and-mark-in-flight) are each a single atomic step. The lock is never
//! held across an await point.

mod entry;

pub use entry::{Claim, FrontierEntry};

use crate::url::{normalize_url, UrlFilter};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use url::Url;

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    in_flight: HashSet<String>,
}

/// Concurrency-safe work queue shared by all workers of one crawl run
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,

    /// 0 means unbounded
    max_depth: u32,

    filter: UrlFilter,

    /// Once closed, offers are rejected and claims report `Drained`
    closed: AtomicBool,

    /// Signalled on enqueue, completion and close
    changed: Notify,

    /// Signalled once, on close
    closing: Notify,
}

impl Frontier {
    /// Creates an empty frontier with the run's admission rules
    pub fn new(max_depth: u32, filter: UrlFilter) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            max_depth,
            filter,
            closed: AtomicBool::new(false),
            changed: Notify::new(),
            closing: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // A panicking worker cannot leave the sets half-updated: every
        // mutation below completes without calling out of this module.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a URL for admission at the given depth
    ///
    /// The URL is normalized first; malformed URLs are rejected. Admission
    /// requires, atomically:
    /// 1. not already visited
    /// 2. not currently in flight
    /// 3. depth within `max_depth` (0 = unbounded)
    /// 4. matches the include pattern, if any
    /// 5. does not match the exclude pattern, if any
    ///
    /// # Returns
    ///
    /// * `true` - The URL was added to the visited set and queued
    /// * `false` - Rejected; no state changed
    pub fn offer(&self, url: &str, depth: u32) -> bool {
        if self.is_closed() {
            return false;
        }

        let normalized = match normalize_url(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::trace!("Rejecting malformed URL {}: {}", url, e);
                return false;
            }
        };

        if !self.permits(normalized.as_str(), depth) {
            tracing::trace!("URL {} at depth {} filtered out", normalized, depth);
            return false;
        }

        let key = normalized.as_str().to_string();
        {
            let mut state = self.lock();
            if state.visited.contains(&key) || state.in_flight.contains(&key) {
                return false;
            }
            state.visited.insert(key);
            state
                .queue
                .push_back(FrontierEntry::new(normalized, depth));
        }

        self.changed.notify_one();
        true
    }

    /// Claims the head of the queue
    ///
    /// A claimed entry is moved into the in-flight set in the same critical
    /// section, so no two callers can ever receive the same entry and drain
    /// detection never misses a page that is still being processed.
    pub fn claim(&self) -> Claim {
        if self.is_closed() {
            return Claim::Drained;
        }

        let mut state = self.lock();
        match state.queue.pop_front() {
            Some(entry) => {
                state.in_flight.insert(entry.key().to_string());
                Claim::Entry(entry)
            }
            None if state.in_flight.is_empty() => Claim::Drained,
            None => Claim::Pending,
        }
    }

    /// Marks a claimed URL as finished (success or failure)
    pub fn complete(&self, url: &Url) {
        let removed = self.lock().in_flight.remove(url.as_str());
        if !removed {
            tracing::debug!("Completed URL {} was not in flight", url);
        }
        self.changed.notify_waiters();
    }

    /// Records a URL as visited without queueing it
    ///
    /// Used for redirect targets: the page already fetched under another URL
    /// must not be fetched again.
    ///
    /// # Returns
    ///
    /// `true` if the URL was not visited before
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.lock().visited.insert(url.as_str().to_string())
    }

    /// The non-dedup admission predicates: depth bound and URL patterns
    pub fn permits(&self, url: &str, depth: u32) -> bool {
        let depth_ok = self.max_depth == 0 || depth <= self.max_depth;
        depth_ok && self.filter.matches(url)
    }

    /// Waits until the frontier changes, or `timeout` elapses
    ///
    /// Used by idle workers when `claim()` returns `Pending`; the timeout
    /// bounds the wait should a wakeup race with registration.
    pub async fn wait_for_change(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.changed.notified()).await;
    }

    /// Sleeps for `duration`, returning early if the frontier is closed
    pub async fn sleep_unless_closed(&self, duration: Duration) {
        let closing = self.closing.notified();
        tokio::pin!(closing);
        // Register before checking the flag so a concurrent close is not missed
        closing.as_mut().enable();

        if self.is_closed() {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = closing => {}
        }
    }

    /// Stops admitting and handing out work; wakes every idle or sleeping worker
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.changed.notify_waiters();
        self.closing.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Current queue length
    pub fn size(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of URLs ever admitted
    pub fn visited_len(&self) -> usize {
        self.lock().visited.len()
    }

    /// Number of URLs currently being processed
    pub fn in_flight_len(&self) -> usize {
        self.lock().in_flight.len()
    }
}
