//! Export snapshots of the record collection.
//!
//! An export is a JSON document:
//!
//! ```json
//! {
//!   "exportDate": "2026-10-18T09:30:00.000Z",
//!   "totalEntries": 1,
//!   "data": [
//!     { "pathogen": "E. coli", "antibiotic": "Ampicillin", "resistance": 85.2 }
//!   ]
//! }
//! ```
//!
//! Pathogen and antibiotic are the first two segments of each stored label
//! split on `" / "`. Names that contain that sequence do not survive the
//! trip intact: anything past the second segment is dropped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::store::Entry;

/// One exported observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    /// Pathogen name recovered from the label.
    pub pathogen: String,
    /// Antibiotic name, absent when the label had no delimiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antibiotic: Option<String>,
    /// Resistance percentage.
    pub resistance: f64,
}

/// Snapshot of the collection at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub export_date: String,
    /// Number of entries in `data`.
    pub total_entries: usize,
    /// The observations, in insertion order.
    pub data: Vec<ExportEntry>,
    #[serde(skip)]
    exported_at: DateTime<Utc>,
}

impl ExportPayload {
    /// Build a payload from entries.
    #[must_use]
    pub fn new(at: DateTime<Utc>, entries: &[Entry]) -> Self {
        let data: Vec<ExportEntry> = entries
            .iter()
            .map(|entry| {
                let (pathogen, antibiotic) = entry.parts();
                ExportEntry {
                    pathogen: pathogen.to_string(),
                    antibiotic: antibiotic.map(str::to_string),
                    resistance: entry.resistance,
                }
            })
            .collect();

        Self {
            export_date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_entries: data.len(),
            data,
            exported_at: at,
        }
    }

    /// When the snapshot was taken.
    #[must_use]
    pub fn exported_at(&self) -> DateTime<Utc> {
        self.exported_at
    }

    /// Default file name, `amr-data-YYYY-MM-DD.json`, dated by the export time.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("amr-data-{}.json", self.exported_at.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the payload to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), entries = self.total_entries, "Exported records");
        Ok(())
    }

    /// Write the payload into `dir` under its default file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_into(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.write_to(&path)?;
        Ok(path)
    }
}
