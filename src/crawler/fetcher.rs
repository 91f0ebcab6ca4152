//! HTTP fetch capability
//!
//! The engine never talks to the network directly: it calls a [`Fetcher`],
//! which lets tests and embedders inject their own transport. This module
//! also provides the production implementation, [`HttpFetcher`], built on
//! reqwest.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, USER_AGENT},
    redirect::Policy,
    Client,
};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed when redirects are enabled
const MAX_REDIRECTS: usize = 10;

/// Per-request fetch settings
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub follow_redirects: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("RippleCrawl/{}", env!("CARGO_PKG_VERSION")),
            follow_redirects: true,
        }
    }
}

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL of the final response, after any redirects
    pub final_url: String,

    pub status: u16,

    /// Header names are lowercased
    pub headers: HashMap<String, String>,

    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Builds a response with no headers
    pub fn new(final_url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            final_url: final_url.into(),
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header, lowercasing its name
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The declared `Content-Type`, if any
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Errors from the fetch capability
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Performs a single network request
///
/// Implementations return `Ok` for any HTTP response, including non-2xx
/// statuses; callers decide what a status means. `Err` is reserved for
/// transport failures and timeouts.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions)
        -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with the crawler's transport settings
///
/// User agent and timeout are applied per request, so one client serves
/// every run; only the redirect policy is baked in.
pub fn build_http_client(follow_redirects: bool) -> Result<Client, reqwest::Error> {
    let redirect = if follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    following: Client,
    direct: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with one client per redirect policy
    pub fn new() -> Result<Self, FetchError> {
        let build = |follow| build_http_client(follow).map_err(|e| FetchError::Client(e.to_string()));
        Ok(Self {
            following: build(true)?,
            direct: build(false)?,
        })
    }

    fn client(&self, follow_redirects: bool) -> &Client {
        if follow_redirects {
            &self.following
        } else {
            &self.direct
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError> {
        let response = self
            .client(options.follow_redirects)
            .get(url)
            .header(USER_AGENT, options.user_agent.as_str())
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?
            .to_vec();

        Ok(FetchResponse {
            final_url,
            status,
            headers,
            body,
        })
    }
}

/// Flattens a header map, keeping the first value of a repeated header
fn collect_headers(map: &HeaderMap) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for (name, value) in map {
        if let Ok(value) = value.to_str() {
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .or_insert_with(|| value.to_string());
        }
    }
    headers
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: format!("connection failed: {}", error),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
