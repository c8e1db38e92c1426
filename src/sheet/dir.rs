use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{Worksheet, WorksheetSource, parse_rows};

/// Reads a workbook from a local directory: every `*.csv` file is one
/// worksheet and the file stem is its month label. Files are read in
/// lexicographic order so runs are reproducible.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl WorksheetSource for DirSource {
    async fn worksheets(&self) -> Result<Vec<Worksheet>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(OsStr::to_str) == Some("csv"))
            .collect();
        paths.sort();

        let mut sheets = Vec::with_capacity(paths.len());
        for path in paths {
            let month = path
                .file_stem()
                .and_then(OsStr::to_str)
                .unwrap_or_default()
                .to_string();
            let bytes = fs::read(&path)?;
            let rows = parse_rows(&bytes)?;
            debug!(month = %month, rows = rows.len(), "Worksheet read");
            sheets.push(Worksheet { month, rows });
        }

        Ok(sheets)
    }
}
