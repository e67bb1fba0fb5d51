//! Markdown run summary
//!
//! Written next to the CSV when `output.summary-path` is configured.

use crate::crawler::CrawlReport;
use crate::output::traits::SinkError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a finished run
///
/// # Arguments
///
/// * `report` - The finished run
/// * `config_hash` - SHA-256 of the configuration file the run used
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_summary(
    report: &CrawlReport,
    config_hash: &str,
    output_path: &Path,
) -> Result<(), SinkError> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a finished run as markdown
pub fn format_markdown_summary(report: &CrawlReport, config_hash: &str) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Hotel Review Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration().num_seconds()
    ));
    md.push_str(&format!("- **Output**: `{}`\n", report.csv_path));
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    md.push_str("## Seeds\n\n");
    for seed in &report.seeds {
        md.push_str(&format!("- {}\n", seed));
    }
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Listing pages | {} |\n", stats.listing_pages));
    md.push_str(&format!("| Hotels collected | {} |\n", stats.hotels_collected));
    md.push_str(&format!("| Hotels skipped | {} |\n", stats.hotels_skipped));
    md.push_str(&format!("| Review pages | {} |\n", stats.review_pages));
    md.push_str(&format!("| Reviews collected | {} |\n", stats.reviews_collected));
    md.push_str(&format!(
        "| Reviews skipped (unparsable rating) | {} |\n",
        stats.reviews_unparsable
    ));
    md.push_str(&format!(
        "| Reviews skipped (out of range) | {} |\n\n",
        stats.reviews_invalid
    ));

    md.push_str("## Failures\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Units skipped | {} |\n", stats.units_skipped));
    md.push_str(&format!("| Disallowed by robots.txt | {} |\n", stats.disallowed));
    md.push_str(&format!("| Requests sent | {} |\n", stats.requests));
    md.push_str(&format!("| Blocked responses | {} |\n", stats.blocked));

    if report.cap_reached {
        md.push_str("\nThe run stopped early at the configured review cap.\n");
    }

    md
}
