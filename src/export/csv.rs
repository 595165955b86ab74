//! CSV rendering of collected rows and the downloadable export file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ExportConfig, FileCollisionAction};
use crate::error::{Error, Result};
use crate::types::ExtractedPartRow;
use crate::utils::get_unique_path;

/// Render rows as CSV text
///
/// The header is `PartTypeTerminologyName,PositionName,PartNumber,ManufacturerName`.
/// Fields containing a comma, quote, or line break are quoted with inner quotes
/// doubled. Lines end in `\n` and the last line has no terminator.
///
/// An empty row list renders as an empty string, not a lone header line.
pub fn to_csv(rows: &[ExtractedPartRow]) -> Result<String> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| Error::Other(format!("CSV output is not UTF-8: {}", e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Suggested download name, e.g. `parts-export-2024-05-01T13-45-09.csv`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("parts-export-{}.csv", at.format("%Y-%m-%dT%H-%M-%S"))
}

/// The CSV of a finished run, ready to be offered for download
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    /// Suggested file name
    pub filename: String,
    /// CSV text
    pub csv: String,
    /// Number of data rows in `csv`
    pub rows: usize,
}

impl ExportArtifact {
    /// Render `rows`; `None` when there is nothing to export
    pub fn from_rows(rows: &[ExtractedPartRow], at: DateTime<Utc>) -> Result<Option<Self>> {
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            filename: export_filename(at),
            csv: to_csv(rows)?,
            rows: rows.len(),
        }))
    }

    /// Write the CSV into `dir` and return the path actually written
    ///
    /// `dir` is created if missing. An existing file of the same name is
    /// handled per `collision`.
    pub async fn write_to(&self, dir: &Path, collision: FileCollisionAction) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = get_unique_path(&dir.join(&self.filename), collision)?;
        tokio::fs::write(&path, &self.csv).await?;
        info!(path = %path.display(), rows = self.rows, "export CSV written");
        Ok(path)
    }

    /// Write the CSV into the configured `output_dir`, resolving name clashes
    /// with the configured `file_collision` action
    pub async fn save(&self, config: &ExportConfig) -> Result<PathBuf> {
        self.write_to(&config.output_dir, config.file_collision).await
    }
}
