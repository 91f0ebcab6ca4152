//! Crawler module: the orchestration engine
//!
//! This module contains the core crawling logic, including:
//! - The fetch and link-extraction capabilities the engine is built on
//! - The worker pool and per-URL pipeline
//! - Run lifecycle (start, stop, statistics)
//! - Crawl events and their subscribers

mod coordinator;
mod events;
mod fetcher;
mod parser;
mod stats;
mod worker;

pub use coordinator::{CrawlOutcome, Crawler};
pub use events::{
    CrawlObserver, EventBus, PageBody, PageRecord, ProgressUpdate, TracingObserver,
};
pub use fetcher::{
    build_http_client, FetchError, FetchOptions, FetchResponse, Fetcher, HttpFetcher,
};
pub use parser::{
    extract_links_simple, parse_html, ExtractError, HtmlLinkExtractor, LinkExtractor, ParsedPage,
};
pub use stats::{CrawlStats, StatsSnapshot};
pub use worker::CompletionReason;
