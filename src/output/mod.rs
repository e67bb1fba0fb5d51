//! Output module
//!
//! This module handles:
//! - Writing one CSV row per review as the crawl progresses
//! - Recording run statistics
//! - Generating the markdown summary of a finished run

mod csv_sink;
mod markdown;
pub mod stats;
mod traits;

pub use csv_sink::{CsvSink, CSV_HEADER};
pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use stats::{print_statistics, CrawlStats};
pub use traits::{RecordSink, SinkError};
