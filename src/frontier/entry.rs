use url::Url;

/// A URL waiting in the frontier, with its link depth from the nearest seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL to fetch
    pub url: Url,

    /// Seeds are depth 0; links found on a depth-N page are depth N+1
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }

    /// The dedup key for this entry
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

/// Result of trying to claim work from the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// An entry was claimed and is now in flight for the caller
    Entry(FrontierEntry),

    /// Nothing queued right now, but another worker is mid-fetch and may
    /// still enqueue links
    Pending,

    /// Nothing queued and nothing in flight (or the frontier was closed);
    /// no entry will ever become available
    Drained,
}
