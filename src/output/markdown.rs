//! Markdown summary generation
//!
//! Renders a finished run as a human-readable report: overview, depth
//! breakdown and a table of crawled pages.

use crate::crawler::CrawlOutcome;
use crate::output::stats::{describe_reason, success_rate};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of `outcome` to `output_path`
///
/// # Arguments
///
/// * `name` - The crawl name from the configuration
/// * `outcome` - The finished run
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_summary(
    name: &str,
    outcome: &CrawlOutcome,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(name, outcome);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a finished run as markdown
pub fn format_markdown_summary(name: &str, outcome: &CrawlOutcome) -> String {
    let stats = &outcome.stats;
    let mut md = String::new();

    md.push_str(&format!("# Crawl Summary: {}\n\n", name));

    md.push_str("## Run Information\n\n");
    if let Some(started) = stats.start_time {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(finished) = stats.end_time {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = stats.duration() {
        md.push_str(&format!(
            "- **Duration**: {:.1} seconds\n",
            duration.num_milliseconds() as f64 / 1000.0
        ));
    }
    md.push_str(&format!(
        "- **Finished because**: {}\n\n",
        describe_reason(outcome.reason)
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Processed**: {}\n", stats.pages_processed));
    md.push_str(&format!("- **URLs Queued**: {}\n", stats.pages_queued));
    md.push_str(&format!("- **Errors**: {}\n", stats.errors));
    md.push_str(&format!("- **Unique URLs Seen**: {}\n", stats.visited));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n\n", success_rate(stats)));

    let mut depths: BTreeMap<u32, usize> = BTreeMap::new();
    for page in &outcome.results {
        *depths.entry(page.depth).or_default() += 1;
    }

    if !depths.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !outcome.results.is_empty() {
        md.push_str("## Crawled Pages\n\n");
        md.push_str("| Depth | Status | URL | Title |\n");
        md.push_str("|-------|--------|-----|-------|\n");

        let mut pages: Vec<_> = outcome.results.iter().collect();
        pages.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));

        for page in pages {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                page.depth,
                page.status,
                page.url,
                escape_cell(page.title.as_deref().unwrap_or("-"))
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
