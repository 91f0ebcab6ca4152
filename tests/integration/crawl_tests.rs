//! Integration tests for the crawler
//!
//! Most tests drive the engine through a scripted in-memory fetcher so
//! ordering and failures are deterministic. The last few use wiremock to run
//! the full cycle through the real HTTP fetcher.

use async_trait::async_trait;
use ripple_crawl::config::CrawlConfig;
use ripple_crawl::crawler::{
    CompletionReason, CrawlObserver, Crawler, FetchError, FetchOptions, FetchResponse, Fetcher,
    HtmlLinkExtractor, PageRecord, ProgressUpdate, StatsSnapshot,
};
use ripple_crawl::RippleError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::http::HeaderName;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory site: canned responses keyed by URL, unknown URLs return 404
#[derive(Default)]
struct ScriptedSite {
    pages: HashMap<String, Result<FetchResponse, FetchError>>,
    delay: Duration,
    fetched: Mutex<Vec<String>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedSite {
    fn new() -> Self {
        Self::default()
    }

    fn html(self, url: &str, body: &str) -> Self {
        let response = FetchResponse::new(url, 200, body).with_header("content-type", "text/html");
        self.response(url, Ok(response))
    }

    fn response(mut self, url: &str, response: Result<FetchResponse, FetchError>) -> Self {
        self.pages.insert(url.to_string(), response);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetched().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedSite {
    async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<FetchResponse, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(FetchResponse::new(url, 404, "")));

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Observer that records every event it receives
#[derive(Default)]
struct Recorder {
    pages: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    progress: AtomicUsize,
    completions: AtomicUsize,
    completed_results: AtomicUsize,
}

impl CrawlObserver for Recorder {
    fn on_progress(&self, _progress: &ProgressUpdate) {
        self.progress.fetch_add(1, Ordering::SeqCst);
    }

    fn on_page_crawled(&self, page: &PageRecord) {
        self.pages.lock().unwrap().push(page.url.clone());
    }

    fn on_error(&self, _error: &RippleError, url: &str) {
        self.errors.lock().unwrap().push(url.to_string());
    }

    fn on_complete(&self, _stats: &StatsSnapshot, results: &[PageRecord]) {
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.completed_results.store(results.len(), Ordering::SeqCst);
    }
}

fn base_config(seed: &str) -> CrawlConfig {
    let mut config = CrawlConfig::new("integration", vec![seed.to_string()]);
    config.crawl.politeness_delay = 0;
    config.fetch.respect_robots = false;
    config
}

fn crawler_for(site: &Arc<ScriptedSite>) -> Crawler {
    Crawler::new(site.clone(), Arc::new(HtmlLinkExtractor))
}

fn links(paths: &[&str]) -> String {
    let anchors: String = paths
        .iter()
        .map(|p| format!(r#"<a href="{}">{}</a>"#, p, p))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

fn urls(results: &[PageRecord]) -> Vec<String> {
    let mut urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    urls
}

#[tokio::test]
async fn test_breadth_first_crawl_with_self_link() {
    let site = Arc::new(
        ScriptedSite::new()
            .html(
                "https://example.test/",
                "<html><head><title>Home</title></head><body>
                 <a href=\"/a\">A</a><a href=\"/b\">B</a><a href=\"/c\">C</a><a href=\"/\">Home</a>
                 </body></html>",
            )
            .html("https://example.test/a", &links(&["/a/deeper"]))
            .html("https://example.test/b", "<html><body>B</body></html>")
            .html("https://example.test/c", "<html><body>C</body></html>"),
    );

    let mut config = base_config("https://example.test/");
    config.crawl.max_depth = 1;
    config.crawl.max_pages = 10;
    config.crawl.concurrency = 2;

    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.stats.pages_processed, 4);
    assert_eq!(outcome.stats.errors, 0);
    assert_eq!(outcome.reason, CompletionReason::Drained);
    assert_eq!(
        urls(&outcome.results),
        vec![
            "https://example.test/",
            "https://example.test/a",
            "https://example.test/b",
            "https://example.test/c",
        ]
    );

    // The root is the only depth-0 page and completes before any child
    assert_eq!(outcome.results[0].url, "https://example.test/");
    assert_eq!(outcome.results[0].title.as_deref(), Some("Home"));
    assert!(outcome.results[1..].iter().all(|r| r.depth == 1));

    // Each URL fetched exactly once; depth-1 links not followed
    assert_eq!(site.fetch_count("https://example.test/"), 1);
    assert_eq!(site.fetch_count("https://example.test/a/deeper"), 0);
    assert_eq!(site.fetched().len(), 4);
}

#[tokio::test]
async fn test_page_budget_is_exact() {
    let children: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    let mut site = ScriptedSite::new()
        .html("https://example.test/", &links(&child_refs))
        .with_delay(Duration::from_millis(5));
    for child in &children {
        site = site.html(&format!("https://example.test{}", child), "<p>leaf</p>");
    }
    let site = Arc::new(site);

    let mut config = base_config("https://example.test/");
    config.crawl.max_pages = 5;
    config.crawl.concurrency = 3;

    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(outcome.results.len(), 5);
    assert_eq!(outcome.stats.pages_processed, 5);
    assert_eq!(outcome.reason, CompletionReason::BudgetReached);
    assert_eq!(site.fetched().len(), 5);
}

#[tokio::test]
async fn test_depth_bound() {
    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/1"]))
            .html("https://example.test/1", &links(&["/2"]))
            .html("https://example.test/2", &links(&["/3"]))
            .html("https://example.test/3", &links(&["/4"])),
    );

    let mut config = base_config("https://example.test/");
    config.crawl.max_depth = 2;

    let outcome = crawler_for(&site).start(config).await.unwrap();

    let mut depths: Vec<u32> = outcome.results.iter().map(|r| r.depth).collect();
    depths.sort();
    assert_eq!(depths, vec![0, 1, 2]);
    assert_eq!(site.fetch_count("https://example.test/3"), 0);
}

#[tokio::test]
async fn test_unbounded_depth_follows_whole_chain() {
    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/1"]))
            .html("https://example.test/1", &links(&["/2"]))
            .html("https://example.test/2", &links(&["/3"]))
            .html("https://example.test/3", &links(&["/"])),
    );

    let outcome = crawler_for(&site)
        .start(base_config("https://example.test/"))
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.reason, CompletionReason::Drained);
}

#[tokio::test]
async fn test_exclude_pattern_skips_images() {
    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/a", "/logo.png"]))
            .html("https://example.test/a", "<p>a</p>"),
    );

    let mut config = base_config("https://example.test/");
    config.filter.exclude_pattern = Some(r"\.png$".to_string());

    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(site.fetch_count("https://example.test/logo.png"), 0);
}

#[tokio::test]
async fn test_include_pattern_keeps_crawl_in_section() {
    let site = Arc::new(
        ScriptedSite::new()
            .html(
                "https://example.test/docs",
                &links(&["/docs/intro", "/blog/post", "https://elsewhere.test/docs"]),
            )
            .html("https://example.test/docs/intro", "<p>intro</p>"),
    );

    let mut config = base_config("https://example.test/docs");
    config.filter.url_pattern = Some(r"^https://example\.test/docs".to_string());

    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(
        urls(&outcome.results),
        vec!["https://example.test/docs", "https://example.test/docs/intro"]
    );
    assert_eq!(site.fetch_count("https://example.test/blog/post"), 0);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let site = Arc::new(
        ScriptedSite::new()
            .html(
                "https://example.test/",
                &links(&["/a", "/a/", "/a#top", "/a?utm_source=x", "/b"]),
            )
            .html("https://example.test/a", &links(&["/b", "/"]))
            .html("https://example.test/b", &links(&["/a"])),
    );

    let mut config = base_config("https://example.test/");
    config.crawl.concurrency = 4;

    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(site.fetch_count("https://example.test/a"), 1);
    assert_eq!(site.fetch_count("https://example.test/b"), 1);
}

#[tokio::test]
async fn test_second_start_rejected_while_running() {
    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/a", "/b"]))
            .html("https://example.test/a", "<p>a</p>")
            .html("https://example.test/b", "<p>b</p>")
            .with_delay(Duration::from_millis(100)),
    );
    let crawler = Arc::new(crawler_for(&site));

    let first = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move { crawler.start(base_config("https://example.test/")).await })
    };

    while !crawler.is_running() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let second = crawler.start(base_config("https://other.test/")).await;
    assert!(matches!(second, Err(RippleError::AlreadyRunning)));

    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(site.fetch_count("https://other.test/"), 0);
    assert!(!crawler.is_running());

    // The crawler is reusable once the run has finished
    let again = crawler.start(base_config("https://example.test/")).await.unwrap();
    assert_eq!(again.results.len(), 3);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let site = Arc::new(ScriptedSite::new());
    let crawler = crawler_for(&site);

    for concurrency in [0, 11] {
        let mut config = base_config("https://example.test/");
        config.crawl.concurrency = concurrency;
        let result = crawler.start(config).await;
        assert!(matches!(result, Err(RippleError::Config(_))));
    }

    let mut config = base_config("https://example.test/");
    config.crawl.max_pages = 0;
    assert!(matches!(
        crawler.start(config).await,
        Err(RippleError::Config(_))
    ));

    let mut config = base_config("https://example.test/");
    config.filter.url_pattern = Some("([unclosed".to_string());
    assert!(matches!(
        crawler.start(config).await,
        Err(RippleError::Config(_))
    ));

    assert!(site.fetched().is_empty());
    assert!(!crawler.is_running());
}

#[tokio::test]
async fn test_stop_finishes_in_flight_and_completes_once() {
    let children: Vec<String> = (0..200).map(|i| format!("/p{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    let mut site = ScriptedSite::new()
        .html("https://example.test/", &links(&child_refs))
        .with_delay(Duration::from_millis(20));
    for child in &children {
        site = site.html(&format!("https://example.test{}", child), "<p>leaf</p>");
    }
    let site = Arc::new(site);

    let crawler = Arc::new(crawler_for(&site));
    let recorder = Arc::new(Recorder::default());
    crawler.subscribe(recorder.clone());

    let mut config = base_config("https://example.test/");
    config.crawl.max_pages = 1000;

    let run = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move { crawler.start(config).await })
    };

    tokio::time::sleep(Duration::from_millis(150)).await;
    crawler.stop();
    crawler.stop();

    let outcome = run.await.unwrap().unwrap();

    assert_eq!(outcome.reason, CompletionReason::Stopped);
    assert!(outcome.results.len() < 201);
    assert_eq!(outcome.stats.in_flight, 0);
    assert_eq!(recorder.completions.load(Ordering::SeqCst), 1);
    assert_eq!(
        recorder.completed_results.load(Ordering::SeqCst),
        outcome.results.len()
    );

    // Every fetched page was either recorded or counted as an error
    assert_eq!(
        site.fetched().len() as u64,
        outcome.stats.pages_processed + outcome.stats.errors
    );

    crawler.stop();
    assert!(!crawler.is_running());
}

#[tokio::test]
async fn test_fetch_failures_are_isolated() {
    let site = Arc::new(
        ScriptedSite::new()
            .html(
                "https://example.test/",
                &links(&["/ok", "/missing", "/down", "/later"]),
            )
            .html("https://example.test/ok", "<p>ok</p>")
            .html("https://example.test/later", "<p>later</p>")
            .response(
                "https://example.test/down",
                Err(FetchError::Network {
                    url: "https://example.test/down".to_string(),
                    message: "connection reset".to_string(),
                }),
            ),
    );

    let crawler = crawler_for(&site);
    let recorder = Arc::new(Recorder::default());
    crawler.subscribe(recorder.clone());

    let outcome = crawler.start(base_config("https://example.test/")).await.unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.stats.pages_processed, 3);
    assert_eq!(outcome.stats.errors, 2);
    assert_eq!(outcome.reason, CompletionReason::Drained);

    let mut errors = recorder.errors.lock().unwrap().clone();
    errors.sort();
    assert_eq!(
        errors,
        vec!["https://example.test/down", "https://example.test/missing"]
    );
}

#[tokio::test]
async fn test_robots_disallow_is_not_an_error() {
    let site = Arc::new(
        ScriptedSite::new()
            .response(
                "https://example.test/robots.txt",
                Ok(FetchResponse::new(
                    "https://example.test/robots.txt",
                    200,
                    "User-agent: *\nDisallow: /private\n",
                )),
            )
            .html(
                "https://example.test/",
                &links(&["/public", "/private/secret", "/private"]),
            )
            .html("https://example.test/public", "<p>public</p>"),
    );

    let crawler = crawler_for(&site);
    let recorder = Arc::new(Recorder::default());
    crawler.subscribe(recorder.clone());

    let mut config = base_config("https://example.test/");
    config.fetch.respect_robots = true;

    let outcome = crawler.start(config).await.unwrap();

    assert_eq!(
        urls(&outcome.results),
        vec!["https://example.test/", "https://example.test/public"]
    );
    assert_eq!(outcome.stats.errors, 0);
    assert!(recorder.errors.lock().unwrap().is_empty());
    assert_eq!(site.fetch_count("https://example.test/private/secret"), 0);
    assert_eq!(site.fetch_count("https://example.test/private"), 0);
    assert_eq!(site.fetch_count("https://example.test/robots.txt"), 1);
}

#[tokio::test]
async fn test_stop_interrupts_long_crawl_delay() {
    let site = Arc::new(
        ScriptedSite::new()
            .response(
                "https://example.test/robots.txt",
                Ok(FetchResponse::new(
                    "https://example.test/robots.txt",
                    200,
                    "User-agent: *\nCrawl-delay: 3600\n",
                )),
            )
            .html("https://example.test/", &links(&["/a", "/b", "/c"]))
            .html("https://example.test/a", "<p>a</p>")
            .html("https://example.test/b", "<p>b</p>")
            .html("https://example.test/c", "<p>c</p>"),
    );

    let crawler = Arc::new(crawler_for(&site));
    let recorder = Arc::new(Recorder::default());
    crawler.subscribe(recorder.clone());

    let mut config = base_config("https://example.test/");
    config.fetch.respect_robots = true;
    config.crawl.concurrency = 1;

    let run = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move { crawler.start(config).await })
    };

    // The single worker is now parked in its post-page delay
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(site.fetch_count("https://example.test/"), 1);
    crawler.stop();

    let outcome = tokio::time::timeout(Duration::from_secs(3), run)
        .await
        .expect("stop should cut the crawl delay short")
        .unwrap()
        .unwrap();

    assert_eq!(outcome.reason, CompletionReason::Stopped);
    assert_eq!(urls(&outcome.results), vec!["https://example.test/"]);
    assert_eq!(recorder.completions.load(Ordering::SeqCst), 1);
    assert!(!crawler.is_running());
}

#[tokio::test]
async fn test_budget_interrupts_long_crawl_delay() {
    let site = Arc::new(
        ScriptedSite::new()
            .response(
                "https://example.test/robots.txt",
                Ok(FetchResponse::new(
                    "https://example.test/robots.txt",
                    200,
                    "User-agent: *\nCrawl-delay: 3600\n",
                )),
            )
            .html("https://example.test/", &links(&["/a", "/b", "/c"]))
            .html("https://example.test/a", "<p>a</p>")
            .html("https://example.test/b", "<p>b</p>")
            .html("https://example.test/c", "<p>c</p>"),
    );

    // The root's worker sleeps out its delay while the other one spends the
    // last slot of the budget
    let crawler = crawler_for(&site);
    let mut config = base_config("https://example.test/");
    config.fetch.respect_robots = true;
    config.crawl.concurrency = 2;
    config.crawl.max_pages = 2;

    let outcome = tokio::time::timeout(Duration::from_secs(3), crawler.start(config))
        .await
        .expect("reaching the budget should end the crawl delay")
        .unwrap();

    assert_eq!(outcome.reason, CompletionReason::BudgetReached);
    assert_eq!(outcome.results.len(), 2);
}

#[tokio::test]
async fn test_every_subscriber_sees_every_event() {
    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/a", "/b"]))
            .html("https://example.test/a", "<p>a</p>")
            .html("https://example.test/b", "<p>b</p>"),
    );

    let crawler = crawler_for(&site);
    let first = Arc::new(Recorder::default());
    let second = Arc::new(Recorder::default());
    crawler.subscribe(first.clone());
    crawler.subscribe(second.clone());

    let outcome = crawler.start(base_config("https://example.test/")).await.unwrap();

    for recorder in [&first, &second] {
        let mut pages = recorder.pages.lock().unwrap().clone();
        pages.sort();
        assert_eq!(pages, urls(&outcome.results));
        assert_eq!(recorder.progress.load(Ordering::SeqCst), 3);
        assert_eq!(recorder.completions.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.completed_results.load(Ordering::SeqCst), 3);
    }
}

#[tokio::test]
async fn test_concurrency_never_exceeds_worker_count() {
    let children: Vec<String> = (0..12).map(|i| format!("/p{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    let mut site = ScriptedSite::new()
        .html("https://example.test/", &links(&child_refs))
        .with_delay(Duration::from_millis(15));
    for child in &children {
        site = site.html(&format!("https://example.test{}", child), "<p>leaf</p>");
    }
    let site = Arc::new(site);

    let mut config = base_config("https://example.test/");
    config.crawl.concurrency = 2;

    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(outcome.results.len(), 13);
    assert!(site.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_politeness_delay_spaces_requests() {
    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/a", "/b"]))
            .html("https://example.test/a", "<p>a</p>")
            .html("https://example.test/b", "<p>b</p>"),
    );

    let mut config = base_config("https://example.test/");
    config.crawl.concurrency = 1;
    config.crawl.politeness_delay = 100;

    let started = Instant::now();
    let outcome = crawler_for(&site).start(config).await.unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_redirect_target_not_fetched_again() {
    let redirected = FetchResponse::new("https://example.test/new", 200, links(&["/new", "/"]))
        .with_header("content-type", "text/html");

    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/old"]))
            .response("https://example.test/old", Ok(redirected)),
    );

    let outcome = crawler_for(&site)
        .start(base_config("https://example.test/"))
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 2);
    let old = outcome
        .results
        .iter()
        .find(|r| r.url == "https://example.test/old")
        .unwrap();
    assert_eq!(old.final_url, "https://example.test/new");
    assert_eq!(site.fetch_count("https://example.test/new"), 0);
}

#[tokio::test]
async fn test_binary_content_retention() {
    let png = FetchResponse::new("https://example.test/logo.png", 200, vec![0x89, 0x50, 0x4e])
        .with_header("content-type", "image/png");

    let site = Arc::new(
        ScriptedSite::new()
            .html("https://example.test/", &links(&["/logo.png"]))
            .response("https://example.test/logo.png", Ok(png)),
    );

    let outcome = crawler_for(&site)
        .start(base_config("https://example.test/"))
        .await
        .unwrap();
    let logo = outcome
        .results
        .iter()
        .find(|r| r.url.ends_with("logo.png"))
        .unwrap();
    assert!(logo.body.is_empty());

    let mut config = base_config("https://example.test/");
    config.fetch.include_binary = true;
    let outcome = crawler_for(&site).start(config).await.unwrap();
    let logo = outcome
        .results
        .iter()
        .find(|r| r.url.ends_with("logo.png"))
        .unwrap();
    assert_eq!(logo.body.len(), 3);
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/private/page">Private</a>
            </body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Page 1</title></head><body>Content 1</body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let crawler = Crawler::with_http().expect("Failed to build HTTP crawler");
    let mut config = base_config(&format!("{}/", base_url));
    config.fetch.respect_robots = true;
    config.fetch.timeout = 5000;

    let outcome = crawler.start(config).await.expect("Crawl failed");

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.stats.errors, 1);

    let home = outcome
        .results
        .iter()
        .find(|r| r.depth == 0)
        .expect("Missing home page");
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.status, 200);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| r.url.path() != "/private/page"));
    assert_eq!(
        requests
            .iter()
            .filter(|r| r.url.path() == "/robots.txt")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_http_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>hi</body></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let crawler = Crawler::with_http().expect("Failed to build HTTP crawler");
    let mut config = base_config(&format!("{}/", mock_server.uri()));
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "2.0".to_string();

    let outcome = crawler.start(config).await.expect("Crawl failed");
    assert_eq!(outcome.results.len(), 1);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    let user_agent: HeaderName = "user-agent".parse().unwrap();
    let agent = requests[0]
        .headers
        .get(&user_agent)
        .map(|v| v.as_str().to_string())
        .unwrap_or_default();
    assert!(agent.starts_with("TestBot/2.0"), "unexpected agent {}", agent);
}
