//! Console rendering of crawl statistics and results

use crate::crawler::{CompletionReason, PageRecord, StatsSnapshot};

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `reason` - Why the run ended
pub fn print_statistics(stats: &StatsSnapshot, reason: CompletionReason) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages processed: {}", stats.pages_processed);
    println!("  URLs queued: {}", stats.pages_queued);
    println!("  Errors: {}", stats.errors);
    println!("  Unique URLs seen: {}", stats.visited);
    println!("  Left in queue: {}", stats.queue_size);
    println!("  Finished because: {}", describe_reason(reason));
    println!();

    if let Some(duration) = stats.duration() {
        println!(
            "Duration: {:.1}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    if let Some(rate) = stats.pages_per_second() {
        println!("Throughput: {:.2} pages/s", rate);
    }

    println!(
        "Success Rate: {:.1}% ({} / {} attempted pages)",
        success_rate(stats),
        stats.pages_processed,
        stats.pages_processed + stats.errors
    );
}

/// Prints one line per crawled page
pub fn print_results(results: &[PageRecord]) {
    println!("\nCrawled Pages ({}):", results.len());
    for line in format_results(results) {
        println!("  {}", line);
    }
}

/// One summary line per record, ordered by depth then URL
pub fn format_results(results: &[PageRecord]) -> Vec<String> {
    let mut sorted: Vec<&PageRecord> = results.iter().collect();
    sorted.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));

    sorted
        .into_iter()
        .map(|page| match &page.title {
            Some(title) => format!("[{}] {} ({}) \"{}\"", page.depth, page.url, page.status, title),
            None => format!("[{}] {} ({})", page.depth, page.url, page.status),
        })
        .collect()
}

/// Share of attempted pages that succeeded, in percent
pub fn success_rate(stats: &StatsSnapshot) -> f64 {
    let attempted = stats.pages_processed + stats.errors;
    if attempted == 0 {
        0.0
    } else {
        stats.pages_processed as f64 / attempted as f64 * 100.0
    }
}

pub fn describe_reason(reason: CompletionReason) -> &'static str {
    match reason {
        CompletionReason::Drained => "no URLs left to crawl",
        CompletionReason::BudgetReached => "page budget reached",
        CompletionReason::Stopped => "stopped on request",
    }
}
