//! The record store.
//!
//! [`RecordStore`] owns the ordered collection of observations, keeps it
//! unique by identity label, derives statistics from it and writes it back
//! to its key-value backend after every change.

pub mod persist;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::export::ExportPayload;
use crate::record::{split_label, Record};
use crate::stats::{RiskTier, Summary};
use crate::storage::KeyValueStore;

pub use persist::{seed_samples, PersistedData, DEFAULT_STORAGE_KEY, SAMPLE_RECORDS};

/// One stored observation: an identity label and its resistance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// `"{pathogen} / {antibiotic}"`.
    pub label: String,
    /// Resistance percentage.
    pub resistance: f64,
}

impl Entry {
    /// Pathogen and antibiotic recovered from the label.
    #[must_use]
    pub fn parts(&self) -> (&str, Option<&str>) {
        split_label(&self.label)
    }

    /// Risk tier of this entry.
    #[must_use]
    pub fn tier(&self) -> RiskTier {
        RiskTier::classify(self.resistance)
    }
}

/// Whether an upsert added a record or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was appended.
    Created,
    /// An existing record's resistance was replaced.
    Updated,
}

/// Ordered, label-unique collection of resistance records.
#[derive(Debug)]
pub struct RecordStore<S> {
    backend: S,
    key: String,
    entries: Vec<Entry>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Load the collection stored under `key`.
    ///
    /// Never fails; see [`persist::load`].
    pub fn load(backend: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = persist::load(&backend, &key);
        info!(key = %key, entries = entries.len(), "Record store ready");
        Self {
            backend,
            key,
            entries,
        }
    }

    /// Insert a record, or replace the resistance of the record with the same label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for invalid input, or a storage error if
    /// the collection cannot be saved. The collection is unchanged on error.
    pub fn upsert(
        &mut self,
        pathogen: &str,
        antibiotic: &str,
        resistance: f64,
    ) -> Result<UpsertOutcome> {
        let record = Record::new(pathogen, antibiotic, resistance)?;
        self.upsert_record(record)
    }

    /// Insert or update an already validated record.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the collection cannot be saved. The
    /// collection is unchanged on error.
    pub fn upsert_record(&mut self, record: Record) -> Result<UpsertOutcome> {
        let label = record.label();
        let resistance = record.resistance;

        let (outcome, previous) = if let Some(index) = self.position(&label) {
            let old = std::mem::replace(&mut self.entries[index].resistance, resistance);
            (UpsertOutcome::Updated, Some((index, old)))
        } else {
            self.entries.push(Entry {
                label: label.clone(),
                resistance,
            });
            (UpsertOutcome::Created, None)
        };

        if let Err(e) = self.save() {
            match previous {
                Some((index, old)) => self.entries[index].resistance = old,
                None => {
                    self.entries.pop();
                }
            }
            return Err(e);
        }

        debug!(label = %label, resistance, ?outcome, "Upserted record");
        Ok(outcome)
    }

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] if there is nothing to clear, or a
    /// storage error if the empty collection cannot be saved (the records
    /// are kept in that case).
    pub fn clear(&mut self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::empty_store("clear"));
        }
        let previous = std::mem::take(&mut self.entries);
        if let Err(e) = self.save() {
            self.entries = previous;
            return Err(e);
        }
        info!(removed = previous.len(), "Cleared all records");
        Ok(())
    }

    /// Write the full collection to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save(&mut self) -> Result<()> {
        persist::save(&mut self.backend, &self.key, &self.entries)
    }

    /// The backend this store writes to.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Give back the backend.
    #[must_use]
    pub fn into_backend(self) -> S {
        self.backend
    }
}

impl<S> RecordStore<S> {
    /// Summary statistics, or [`Summary::NoData`] when empty.
    #[must_use]
    pub fn statistics(&self) -> Summary {
        Summary::from_values(&self.values())
    }

    /// Snapshot of the collection stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] if there is nothing to export.
    pub fn export(&self) -> Result<ExportPayload> {
        self.export_at(Utc::now())
    }

    /// Snapshot of the collection stamped with `at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyStore`] if there is nothing to export.
    pub fn export_at(&self, at: DateTime<Utc>) -> Result<ExportPayload> {
        if self.entries.is_empty() {
            return Err(Error::empty_store("export"));
        }
        Ok(ExportPayload::new(at, &self.entries))
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Labels in insertion order, aligned with [`values`](Self::values).
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Resistance values in insertion order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.resistance).collect()
    }

    /// Look up the resistance recorded for a pathogen/antibiotic pair.
    #[must_use]
    pub fn get(&self, pathogen: &str, antibiotic: &str) -> Option<f64> {
        let label = crate::record::identity_label(pathogen.trim(), antibiotic.trim());
        self.position(&label).map(|i| self.entries[i].resistance)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The storage key this store reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use crate::storage::MemoryStore;

    /// Backend whose writes can be made to fail.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }
    }

    fn empty_store() -> RecordStore<MemoryStore> {
        RecordStore::load(MemoryStore::new(), DEFAULT_STORAGE_KEY)
    }

    fn stats(store: &RecordStore<MemoryStore>) -> crate::stats::Statistics {
        store.statistics().statistics().cloned().expect("store has data")
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let mut store = empty_store();

        let outcome = store.upsert("E. coli", "Ampicillin", 85.2).unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        let s = stats(&store);
        assert_eq!(s.total, 1);
        assert_eq!(s.average, 85.2);
        assert_eq!((s.high, s.moderate, s.low), (1, 0, 0));

        let outcome = store.upsert("E. coli", "Ampicillin", 90.0).unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        let s = stats(&store);
        assert_eq!(s.total, 1);
        assert_eq!(s.average, 90.0);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut once = empty_store();
        once.upsert("MRSA", "Methicillin", 72.8).unwrap();

        let mut twice = empty_store();
        twice.upsert("MRSA", "Methicillin", 72.8).unwrap();
        let second = twice.upsert("MRSA", "Methicillin", 72.8).unwrap();

        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(once.entries(), twice.entries());
        assert_eq!(once.backend(), twice.backend());
    }

    #[test]
    fn test_upsert_trims_and_matches_case_sensitively() {
        let mut store = empty_store();
        store.upsert("  E. coli ", " Ampicillin ", 10.0).unwrap();
        assert_eq!(store.labels(), vec!["E. coli / Ampicillin"]);

        let outcome = store.upsert("e. coli", "Ampicillin", 20.0).unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("E. coli", "Ampicillin"), Some(10.0));
        assert_eq!(store.get("e. coli", "Ampicillin"), Some(20.0));
    }

    #[test]
    fn test_upsert_preserves_insertion_order() {
        let mut store = empty_store();
        store.upsert("A1", "B1", 1.0).unwrap();
        store.upsert("A2", "B2", 2.0).unwrap();
        store.upsert("A3", "B3", 3.0).unwrap();
        store.upsert("A1", "B1", 4.0).unwrap();

        assert_eq!(store.labels(), vec!["A1 / B1", "A2 / B2", "A3 / B3"]);
        assert_eq!(store.values(), vec![4.0, 2.0, 3.0]);
    }

    #[test]
    fn test_upsert_validation_leaves_state_untouched() {
        let mut store = empty_store();
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();

        for (pathogen, antibiotic, resistance, field) in [
            ("", "Ampicillin", 50.0, Field::Pathogen),
            ("E", "Ampicillin", 50.0, Field::Pathogen),
            ("E. coli", " ", 50.0, Field::Antibiotic),
            ("E. coli", "Ampicillin", -0.001, Field::Resistance),
            ("E. coli", "Ampicillin", 100.001, Field::Resistance),
            ("E. coli", "Ampicillin", f64::NAN, Field::Resistance),
        ] {
            let err = store.upsert(pathogen, antibiotic, resistance).unwrap_err();
            match err {
                Error::Validation(v) => assert_eq!(v.field, field),
                other => panic!("expected validation error, got {other:?}"),
            }
        }

        assert_eq!(store.values(), vec![85.2]);
    }

    #[test]
    fn test_upsert_accepts_boundaries() {
        let mut store = empty_store();
        store.upsert("Zero", "Drug", 0.0).unwrap();
        store.upsert("Hundred", "Drug", 100.0).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_persists() {
        let mut store = empty_store();
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();

        let reloaded = RecordStore::load(store.into_backend(), DEFAULT_STORAGE_KEY);
        assert_eq!(reloaded.labels(), vec!["E. coli / Ampicillin"]);
        assert_eq!(reloaded.values(), vec![85.2]);
    }

    #[test]
    fn test_failed_save_rolls_back_create() {
        let mut store = RecordStore::load(FlakyStore::default(), DEFAULT_STORAGE_KEY);
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();

        store.backend.fail_writes = true;
        assert!(store.upsert("MRSA", "Methicillin", 72.8).is_err());
        assert_eq!(store.labels(), vec!["E. coli / Ampicillin"]);
    }

    #[test]
    fn test_failed_save_rolls_back_update() {
        let mut store = RecordStore::load(FlakyStore::default(), DEFAULT_STORAGE_KEY);
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();

        store.backend.fail_writes = true;
        assert!(store.upsert("E. coli", "Ampicillin", 10.0).is_err());
        assert_eq!(store.values(), vec![85.2]);
    }

    #[test]
    fn test_failed_save_keeps_records_on_clear() {
        let mut store = RecordStore::load(FlakyStore::default(), DEFAULT_STORAGE_KEY);
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();

        store.backend.fail_writes = true;
        let err = store.clear().unwrap_err();
        assert!(!err.is_empty_store());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_empty_store() {
        let mut store = empty_store();
        let err = store.clear().unwrap_err();
        assert!(err.is_empty_store());
    }

    #[test]
    fn test_clear_then_export_is_empty() {
        let mut store = empty_store();
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.statistics(), Summary::NoData);
        assert!(store.export().unwrap_err().is_empty_store());

        let reloaded = RecordStore::load(store.into_backend(), DEFAULT_STORAGE_KEY);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_statistics_empty_is_no_data() {
        assert_eq!(empty_store().statistics(), Summary::NoData);
    }

    #[test]
    fn test_export_splits_labels() {
        let mut store = empty_store();
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();
        store.upsert("MRSA", "Methicillin", 72.8).unwrap();

        let payload = store.export().unwrap();
        assert_eq!(payload.total_entries, 2);
        assert_eq!(payload.data[0].pathogen, "E. coli");
        assert_eq!(payload.data[0].antibiotic.as_deref(), Some("Ampicillin"));
        assert_eq!(payload.data[1].resistance, 72.8);
    }

    #[test]
    fn test_entry_parts_and_tier() {
        let entry = Entry {
            label: "K. pneumoniae / Ciprofloxacin".to_string(),
            resistance: 45.1,
        };
        assert_eq!(entry.parts(), ("K. pneumoniae", Some("Ciprofloxacin")));
        assert_eq!(entry.tier(), RiskTier::Moderate);
    }

    #[test]
    fn test_upsert_after_loading_repeated_labels_hits_single_entry() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                DEFAULT_STORAGE_KEY,
                r#"{"labels":["MRSA / Methicillin","MRSA / Methicillin"],"data":[10,20]}"#,
            )
            .unwrap();

        let mut store = RecordStore::load(backend, DEFAULT_STORAGE_KEY);
        assert_eq!(store.values(), vec![20.0]);

        store.upsert("MRSA", "Methicillin", 72.8).unwrap();
        assert_eq!(store.labels(), vec!["MRSA / Methicillin"]);
        assert_eq!(store.values(), vec![72.8]);
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let mut backend = MemoryStore::new();
        seed_samples(&mut backend, DEFAULT_STORAGE_KEY).unwrap();

        let store = RecordStore::load(backend, "otherKey");
        assert!(store.is_empty());
        assert_eq!(store.key(), "otherKey");
    }
}
