//! Configuration module for Ripple-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and compiling a validated configuration into an immutable [`CrawlPlan`].
//!
//! # Example
//!
//! ```no_run
//! use ripple_crawl::config::{load_config, CrawlPlan};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! let plan = CrawlPlan::compile(&config).unwrap();
//! println!("Crawler will use {} workers", plan.concurrency);
//! ```

mod parser;
mod plan;
mod types;
mod validation;

// Re-export types
pub use plan::CrawlPlan;
pub use types::{CrawlConfig, CrawlSettings, FetchConfig, FilterConfig, UserAgentConfig};
pub use validation::{validate, MAX_CONCURRENCY};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
