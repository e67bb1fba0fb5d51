//! CSV record sink
//!
//! Column order is fixed: `hotel_id,hotel_name,rating,review_text,author,date`.
//! The header is written when the sink is opened and every row is flushed
//! as soon as it is written.

use crate::model::Review;
use crate::output::traits::{RecordSink, SinkError};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output columns, in order
pub const CSV_HEADER: [&str; 6] = [
    "hotel_id",
    "hotel_name",
    "rating",
    "review_text",
    "author",
    "date",
];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    hotel_id: &'a str,
    hotel_name: &'a str,
    rating: String,
    review_text: &'a str,
    author: &'a str,
    date: String,
}

impl<'a> From<&'a Review> for CsvRow<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            hotel_id: &review.hotel_id,
            hotel_name: &review.hotel_name,
            // Display gives the shortest form: 5 and 4.5, not 5.0
            rating: review.rating.to_string(),
            review_text: &review.text,
            author: review.author.as_deref().unwrap_or_default(),
            date: review
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Writes reviews as CSV rows to any `Write`
pub struct CsvSink<W: Write> {
    writer: Writer<W>,
    rows: u64,
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path` and writes the header
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps `inner` and writes the header row
    pub fn new(inner: W) -> Result<Self, SinkError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;

        Ok(Self { writer, rows: 0 })
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn append(&mut self, review: &Review) -> Result<(), SinkError> {
        self.writer.serialize(CsvRow::from(review))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
