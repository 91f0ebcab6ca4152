use url::Url;

/// Extracts the origin (scheme + host + port) of a URL
///
/// The origin is the unit at which robots.txt policies are fetched and
/// cached. Default ports are omitted, so `https://a.test` and
/// `https://a.test:443` share one origin.
///
/// # Returns
///
/// * `Some(String)` - e.g. `"https://example.com"` or `"http://127.0.0.1:8080"`
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_crawl::url::extract_origin;
///
/// let url = Url::parse("https://example.com/path?q=1").unwrap();
/// assert_eq!(extract_origin(&url), Some("https://example.com".to_string()));
///
/// let url = Url::parse("http://EXAMPLE.com:8080/").unwrap();
/// assert_eq!(extract_origin(&url), Some("http://example.com:8080".to_string()));
/// ```
pub fn extract_origin(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
