//! Output module for presenting crawl results
//!
//! This module handles:
//! - Printing run statistics and crawled pages to the console
//! - Generating markdown summaries of a finished run

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{format_results, print_results, print_statistics};
