//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl engine.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, CrawlConfig, CrawlPlan};
use ripple_crawl::crawler::{Crawler, TracingObserver};
use ripple_crawl::output::{print_results, print_statistics, write_markdown_summary};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a polite breadth-first web crawler
///
/// Ripple-Crawl walks outward from a set of seed URLs, one link depth at a
/// time, while respecting robots.txt and a per-worker politeness delay.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A polite breadth-first web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Also write a markdown summary of the run to this path
    #[arg(long, value_name = "PATH", conflicts_with = "dry_run")]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config, cli.summary).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &CrawlConfig) -> anyhow::Result<()> {
    let plan = CrawlPlan::compile(config).context("Configuration is invalid")?;

    println!("=== Ripple-Crawl Dry Run ===\n");

    println!("Crawl '{}':", plan.name);
    match plan.max_depth {
        0 => println!("  Max depth: unbounded"),
        depth => println!("  Max depth: {}", depth),
    }
    println!("  Max pages: {}", plan.max_pages);
    println!("  Workers: {}", plan.concurrency);
    println!(
        "  Politeness delay: {}ms",
        plan.politeness_delay.as_millis()
    );

    println!("\nFetching:");
    println!("  User agent: {}", plan.fetch.user_agent);
    println!("  Timeout: {}ms", plan.fetch.timeout.as_millis());
    println!("  Follow redirects: {}", plan.fetch.follow_redirects);
    println!("  Respect robots.txt: {}", plan.respect_robots);
    println!("  Keep binary content: {}", plan.include_binary);

    if let Some(pattern) = &config.filter.url_pattern {
        println!("\nInclude pattern: {}", pattern);
    }
    if let Some(pattern) = &config.filter.exclude_pattern {
        println!("Exclude pattern: {}", pattern);
    }

    println!("\nSeeds ({}):", plan.seeds.len());
    for seed in &plan.seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", plan.seeds.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig, summary: Option<PathBuf>) -> anyhow::Result<()> {
    let name = config.crawl.name.clone();

    let crawler = Arc::new(Crawler::with_http()?);
    crawler.subscribe(Arc::new(TracingObserver));

    let interrupt = Arc::clone(&crawler);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            interrupt.stop();
        }
    });

    let outcome = match crawler.start(config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&outcome.stats, outcome.reason);
    print_results(&outcome.results);

    if let Some(path) = summary {
        write_markdown_summary(&name, &outcome, &path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("\n✓ Summary exported to: {}", path.display());
    }

    Ok(())
}
