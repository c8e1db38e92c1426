//! Worksheet data sources.
//!
//! A workbook is a set of named worksheets, one per month of outage logs.
//! [`DirSource`] reads them from a local directory of CSVs; [`HttpSource`]
//! fetches a published workbook via a JSON manifest. Both yield the same
//! [`Worksheet`] batches, so everything downstream is source-agnostic.

mod dir;
mod http;

pub use dir::DirSource;
pub use http::{HttpSource, ManifestEntry};

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::record::RawOutageRow;

/// One month's outage log as read from the workbook. Empty worksheets are
/// yielded as-is and skipped by the caller.
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub month: String,
    pub rows: Vec<RawOutageRow>,
}

/// A workbook of monthly worksheets.
#[async_trait]
pub trait WorksheetSource: Send + Sync {
    async fn worksheets(&self) -> Result<Vec<Worksheet>>;
}

/// Parses worksheet CSV bytes into raw rows.
///
/// Headers and fields are whitespace-trimmed, so ` Feeder Name ` still
/// resolves, and columns a worksheet lacks deserialize to empty strings.
/// Rows the CSV reader cannot decode at all are logged and skipped; cleanup
/// of readable-but-messy values is the normalizer's job.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawOutageRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(error = %e, "Skipping unreadable worksheet row"),
        }
    }
    Ok(rows)
}
