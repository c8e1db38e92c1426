use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use super::{Worksheet, WorksheetSource, parse_rows};
use crate::fetch::{HttpClient, fetch_bytes};

/// One worksheet in a published workbook manifest.
///
/// The manifest is a JSON array served at the workbook URL:
/// ```json
/// [
///   {"month": "January", "url": "https://host/export?sheet=January&format=csv"},
///   {"month": "February", "url": "https://host/export?sheet=February&format=csv"}
/// ]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub month: String,
    pub url: String,
}

/// Fetches a workbook over HTTP: the manifest first, then each worksheet's
/// CSV export. A worksheet that fails to download or parse is logged and
/// skipped so one broken export does not take down the whole workbook.
pub struct HttpSource<C> {
    client: C,
    manifest_url: String,
}

impl<C: HttpClient> HttpSource<C> {
    pub fn new(client: C, manifest_url: impl Into<String>) -> Self {
        Self {
            client,
            manifest_url: manifest_url.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> WorksheetSource for HttpSource<C> {
    async fn worksheets(&self) -> Result<Vec<Worksheet>> {
        let manifest_bytes = fetch_bytes(&self.client, &self.manifest_url).await?;
        let entries: Vec<ManifestEntry> = serde_json::from_slice(&manifest_bytes)?;
        debug!(worksheets = entries.len(), "Workbook manifest fetched");

        let mut sheets = Vec::with_capacity(entries.len());
        for entry in entries {
            let bytes = match fetch_bytes(&self.client, &entry.url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(month = %entry.month, error = %e, "Worksheet fetch failed");
                    continue;
                }
            };
            match parse_rows(&bytes) {
                Ok(rows) => {
                    debug!(month = %entry.month, rows = rows.len(), "Worksheet fetched");
                    sheets.push(Worksheet {
                        month: entry.month,
                        rows,
                    });
                }
                Err(e) => {
                    error!(month = %entry.month, error = %e, "Worksheet parse failed");
                }
            }
        }

        Ok(sheets)
    }
}
