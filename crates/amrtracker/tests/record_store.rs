use amrtracker::store::{seed_samples, DEFAULT_STORAGE_KEY};
use amrtracker::{
    Error, Field, KeyValueStore, MemoryStore, RecordStore, SqliteStore, Summary, UpsertOutcome,
};

fn open_sqlite(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::open(dir.path().join("tracker.db")).unwrap()
}

#[test]
fn first_entry_then_update_scenario() {
    let mut store = RecordStore::load(MemoryStore::new(), DEFAULT_STORAGE_KEY);
    assert_eq!(store.statistics(), Summary::NoData);

    store.upsert("E. coli", "Ampicillin", 85.2).unwrap();
    let stats = store.statistics().statistics().cloned().unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.average, 85.2);
    assert_eq!((stats.high, stats.moderate, stats.low), (1, 0, 0));

    let outcome = store.upsert("E. coli", "Ampicillin", 90.0).unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);
    let stats = store.statistics().statistics().cloned().unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.average, 90.0);
}

#[test]
fn boundary_values() {
    let mut store = RecordStore::load(MemoryStore::new(), DEFAULT_STORAGE_KEY);
    assert!(store.upsert("Low", "Edge", 0.0).is_ok());
    assert!(store.upsert("High", "Edge", 100.0).is_ok());

    for bad in [-0.001, 100.001] {
        match store.upsert("Out", "Range", bad) {
            Err(Error::Validation(err)) => assert_eq!(err.field, Field::Resistance),
            other => panic!("expected validation error for {bad}, got {other:?}"),
        }
    }
    assert_eq!(store.len(), 2);
}

#[test]
fn risk_tier_boundaries_in_statistics() {
    let mut store = RecordStore::load(MemoryStore::new(), DEFAULT_STORAGE_KEY);
    store.upsert("P1", "A1", 70.0).unwrap();
    store.upsert("P2", "A2", 69.999).unwrap();
    store.upsert("P3", "A3", 30.0).unwrap();
    store.upsert("P4", "A4", 29.999).unwrap();

    let stats = store.statistics().statistics().cloned().unwrap();
    assert_eq!((stats.high, stats.moderate, stats.low), (1, 2, 1));
}

#[test]
fn clear_and_export_on_empty_store() {
    let mut store = RecordStore::load(MemoryStore::new(), DEFAULT_STORAGE_KEY);
    assert!(store.clear().unwrap_err().is_empty_store());

    store.upsert("MRSA", "Methicillin", 72.8).unwrap();
    store.clear().unwrap();
    assert!(store.export().unwrap_err().is_empty_store());
}

#[test]
fn sqlite_round_trip_preserves_order_and_values() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store = RecordStore::load(open_sqlite(&dir), DEFAULT_STORAGE_KEY);
        store.upsert("K. pneumoniae", "Ciprofloxacin", 45.1).unwrap();
        store.upsert("E. coli", "Ampicillin", 85.2).unwrap();
        store.upsert("MRSA", "Methicillin", 72.8).unwrap();
        store.upsert("E. coli", "Ampicillin", 12.5).unwrap();
    }

    let store = RecordStore::load(open_sqlite(&dir), DEFAULT_STORAGE_KEY);
    assert_eq!(
        store.labels(),
        vec![
            "K. pneumoniae / Ciprofloxacin",
            "E. coli / Ampicillin",
            "MRSA / Methicillin"
        ]
    );
    assert_eq!(store.values(), vec![45.1, 12.5, 72.8]);
}

#[test]
fn sqlite_first_run_seeding() {
    let dir = tempfile::tempdir().unwrap();

    let mut backend = open_sqlite(&dir);
    assert!(seed_samples(&mut backend, DEFAULT_STORAGE_KEY).unwrap());

    let mut store = RecordStore::load(backend, DEFAULT_STORAGE_KEY);
    assert_eq!(store.len(), 3);
    store.clear().unwrap();

    // A cleared collection is still "present", so seeding does not repeat
    let mut backend = store.into_backend();
    assert!(!seed_samples(&mut backend, DEFAULT_STORAGE_KEY).unwrap());
    assert!(RecordStore::load(backend, DEFAULT_STORAGE_KEY).is_empty());
}

#[test]
fn corrupt_stored_value_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = open_sqlite(&dir);
    backend
        .set(DEFAULT_STORAGE_KEY, r#"{"labels":["A / B"],"data":[]}"#)
        .unwrap();

    let mut store = RecordStore::load(backend, DEFAULT_STORAGE_KEY);
    assert!(store.is_empty());

    // The next write replaces the corrupt value
    store.upsert("A1", "B1", 5.0).unwrap();
    let reloaded = RecordStore::load(store.into_backend(), DEFAULT_STORAGE_KEY);
    assert_eq!(reloaded.labels(), vec!["A1 / B1"]);
}

#[test]
fn export_payload_from_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = open_sqlite(&dir);
    seed_samples(&mut backend, DEFAULT_STORAGE_KEY).unwrap();
    let store = RecordStore::load(backend, DEFAULT_STORAGE_KEY);

    let payload = store.export().unwrap();
    assert_eq!(payload.total_entries, 3);
    assert!(payload.export_date.ends_with('Z'));

    let pathogens: Vec<&str> = payload.data.iter().map(|e| e.pathogen.as_str()).collect();
    assert_eq!(pathogens, vec!["E. coli", "MRSA", "K. pneumoniae"]);
}

#[test]
fn export_keeps_first_two_label_segments() {
    let mut store = RecordStore::load(MemoryStore::new(), DEFAULT_STORAGE_KEY);
    store.upsert("Aa / Bb", "Cc", 50.0).unwrap();
    store.upsert("Orphan", "Drug", 10.0).unwrap();

    let payload = store.export().unwrap();
    assert_eq!(payload.data[0].pathogen, "Aa");
    assert_eq!(payload.data[0].antibiotic.as_deref(), Some("Bb"));
    assert_eq!(payload.data[1].antibiotic.as_deref(), Some("Drug"));
}
