//! Record sink interface
//!
//! A sink receives validated reviews one at a time, in crawl order, and must
//! persist each one before `append` returns.

use crate::model::Review;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for review records
pub trait RecordSink {
    /// Writes exactly one record
    fn append(&mut self, review: &Review) -> Result<(), SinkError>;

    /// Number of records written so far
    fn rows_written(&self) -> u64;

    /// Flushes anything still buffered
    fn finish(&mut self) -> Result<(), SinkError>;
}
