//! URL handling module for Ripple-Crawl
//!
//! This module provides URL normalization, origin extraction, and the
//! include/exclude pattern filter used by frontier admission.

mod domain;
mod filter;
mod normalize;

pub use domain::extract_origin;
pub use filter::UrlFilter;
pub use normalize::normalize_url;
