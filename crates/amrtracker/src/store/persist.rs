//! Persisted layout of the record collection.
//!
//! The whole collection is one JSON value with two index-aligned arrays:
//! `{"labels": ["<pathogen> / <antibiotic>", ...], "data": [<resistance>, ...]}`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Entry;
use crate::error::Result;
use crate::record::identity_label;
use crate::storage::KeyValueStore;

/// Default storage key for the collection.
pub const DEFAULT_STORAGE_KEY: &str = "amrTrackerData";

/// Entries written on first run so a new user sees a populated chart.
pub const SAMPLE_RECORDS: [(&str, &str, f64); 3] = [
    ("E. coli", "Ampicillin", 85.2),
    ("MRSA", "Methicillin", 72.8),
    ("K. pneumoniae", "Ciprofloxacin", 45.1),
];

/// On-storage form of the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedData {
    /// Identity labels, in insertion order.
    pub labels: Vec<String>,
    /// Resistance values, aligned with `labels`.
    pub data: Vec<f64>,
}

impl PersistedData {
    /// Build the persisted form from entries.
    #[must_use]
    pub fn from_entries(entries: &[Entry]) -> Self {
        Self {
            labels: entries.iter().map(|e| e.label.clone()).collect(),
            data: entries.iter().map(|e| e.resistance).collect(),
        }
    }

    /// Turn the persisted form back into entries.
    ///
    /// Returns `None` if the arrays are not the same length.
    #[must_use]
    pub fn into_entries(self) -> Option<Vec<Entry>> {
        if self.labels.len() != self.data.len() {
            return None;
        }
        Some(
            self.labels
                .into_iter()
                .zip(self.data)
                .map(|(label, resistance)| Entry { label, resistance })
                .collect(),
        )
    }

    /// The sample collection used for first-run seeding.
    #[must_use]
    pub fn samples() -> Self {
        let (labels, data) = SAMPLE_RECORDS
            .iter()
            .map(|&(pathogen, antibiotic, resistance)| {
                (identity_label(pathogen, antibiotic), resistance)
            })
            .unzip();
        Self { labels, data }
    }
}

/// Write the collection under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save<S: KeyValueStore + ?Sized>(
    backend: &mut S,
    key: &str,
    entries: &[Entry],
) -> Result<()> {
    let json = serde_json::to_string(&PersistedData::from_entries(entries))?;
    backend.set(key, &json)?;
    debug!(key, entries = entries.len(), "Saved records");
    Ok(())
}

/// Read the collection stored under `key`.
///
/// Never fails: a missing key, an unreadable backend, malformed JSON or
/// misaligned arrays all produce an empty collection. Repeated labels are
/// merged into their first position, keeping the last value.
pub fn load<S: KeyValueStore + ?Sized>(backend: &S, key: &str) -> Vec<Entry> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored records");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored records, starting empty");
            return Vec::new();
        }
    };

    let persisted: PersistedData = match serde_json::from_str(&raw) {
        Ok(persisted) => persisted,
        Err(e) => {
            warn!(key, error = %e, "Stored records are not valid JSON, starting empty");
            return Vec::new();
        }
    };

    let (labels, values) = (persisted.labels.len(), persisted.data.len());
    let Some(entries) = persisted.into_entries() else {
        warn!(key, labels, values, "Stored labels and values are misaligned, starting empty");
        return Vec::new();
    };

    let (entries, merged) = merge_duplicates(entries);
    if merged > 0 {
        warn!(key, merged, "Stored records repeat labels, keeping the last value of each");
    }
    debug!(key, entries = entries.len(), "Loaded records");
    entries
}

fn merge_duplicates(entries: Vec<Entry>) -> (Vec<Entry>, usize) {
    let mut unique: Vec<Entry> = Vec::with_capacity(entries.len());
    let mut merged = 0;
    for entry in entries {
        if let Some(existing) = unique.iter_mut().find(|e| e.label == entry.label) {
            existing.resistance = entry.resistance;
            merged += 1;
        } else {
            unique.push(entry);
        }
    }
    (unique, merged)
}

/// Write the sample records under `key` if nothing is stored there yet.
///
/// Returns whether the samples were written.
///
/// # Errors
///
/// Returns an error if the backend cannot be read or written.
pub fn seed_samples<S: KeyValueStore + ?Sized>(backend: &mut S, key: &str) -> Result<bool> {
    if backend.contains(key)? {
        return Ok(false);
    }
    let json = serde_json::to_string(&PersistedData::samples())?;
    backend.set(key, &json)?;
    info!(key, "Seeded sample records");
    Ok(true)
}
