//! Demo Tests
//!
//! Runs the walkthrough against the in-memory store. These tests verify:
//! - Each step's observable effect on the store
//! - TTL expiry is visible across the sleep
//! - The full run order and console output

use std::cell::{Cell, RefCell};

use aerospike_demo::record::{Bin, BinSelection, Operation, Record, RecordKey, Value, WriteOptions};
use aerospike_demo::{Config, DemoError, Demo, MemoryStore, RecordStore, Result, Step, StepOutcome};

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config() -> Config {
    Config::builder()
        .ttl_seconds(1)
        .ttl_wait_ms(1200)
        .batch_size(32)
        .build()
}

/// MemoryStore wrapper that counts close calls
#[derive(Default)]
struct ClosingStore {
    inner: MemoryStore,
    closed: Cell<usize>,
}

impl RecordStore for ClosingStore {
    fn put(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()> {
        self.inner.put(options, key, bins)
    }

    fn exists(&self, key: &RecordKey) -> Result<bool> {
        self.inner.exists(key)
    }

    fn add(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()> {
        self.inner.add(options, key, bins)
    }

    fn get(&self, key: &RecordKey, bins: &BinSelection) -> Result<Option<Record>> {
        self.inner.get(key, bins)
    }

    fn delete(&self, key: &RecordKey) -> Result<bool> {
        self.inner.delete(key)
    }

    fn batch_get(&self, keys: &[RecordKey]) -> Result<Vec<Option<Record>>> {
        self.inner.batch_get(keys)
    }

    fn operate(
        &self,
        options: &WriteOptions,
        key: &RecordKey,
        ops: &[Operation],
    ) -> Result<Option<Record>> {
        self.inner.operate(options, key, ops)
    }

    fn close(&self) -> Result<()> {
        self.closed.set(self.closed.get() + 1);
        self.inner.close()
    }
}

// =============================================================================
// Single Record Tests
// =============================================================================

#[test]
fn test_write_then_exists() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    demo.write_single_value().unwrap();
    let outcome = demo.check_key_exists(&demo.main_key()).unwrap();

    assert!(matches!(outcome, StepOutcome::KeyExists { exists: true, .. }));
    assert_eq!(
        outcome.to_string(),
        "Check a record exists\n<Key: ns=\"test\", set=\"myset\", key=\"mykey\"> exists? true"
    );
}

#[test]
fn test_add_single_value_increments_counter() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    demo.add_single_value().unwrap();
    demo.add_single_value().unwrap();

    let record = store.get(&demo.add_key(), &BinSelection::All).unwrap().unwrap();
    assert_eq!(record.bin("mybin"), Some(&Value::Int(2)));
}

#[test]
fn test_read_some_values_returns_only_selected_bins() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    demo.write_single_value().unwrap();
    demo.write_multiple_values().unwrap();

    match demo.read_all_values().unwrap() {
        StepOutcome::ReadAllValues { record: Some(record), .. } => {
            assert_eq!(record.bins.len(), 4);
            assert_eq!(record.generation, 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    match demo.read_some_values().unwrap() {
        StepOutcome::ReadSomeValues { record: Some(record), .. } => {
            let names: Vec<_> = record.bins.keys().cloned().collect();
            assert_eq!(names, vec!["age".to_string(), "name".to_string()]);
            assert_eq!(record.bin("age"), Some(&Value::Int(42)));
            assert_eq!(record.bin("name"), Some(&Value::from("Lynn")));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_delete_value_removes_only_that_bin() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    demo.write_single_value().unwrap();
    demo.write_multiple_values().unwrap();
    let outcome = demo.delete_value().unwrap();

    assert_eq!(outcome.to_string(), "Deleted this value: mybin=<null>");
    let record = store.get(&demo.main_key(), &BinSelection::All).unwrap().unwrap();
    assert!(record.bin("mybin").is_none());
    assert_eq!(record.bin("location"), Some(&Value::from("Oslo")));
}

#[test]
fn test_delete_record_leaves_key_absent() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    demo.write_single_value().unwrap();
    let outcome = demo.delete_record().unwrap();

    assert_eq!(
        outcome,
        StepOutcome::DeletedRecord {
            key: demo.main_key(),
            existed: true,
            exists_after: false,
        }
    );
}

// =============================================================================
// TTL Tests
// =============================================================================

#[test]
fn test_ttl_record_exists_then_expires() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    match demo.write_value_with_ttl().unwrap() {
        StepOutcome::ValueWithTtl {
            exists_before,
            exists_after,
            ttl_seconds,
            ..
        } => {
            assert!(exists_before);
            assert!(!exists_after);
            assert_eq!(ttl_seconds, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_ttl_step_announces_sleep_and_checks() {
    let store = MemoryStore::new();
    let config = test_config();
    let notices = RefCell::new(Vec::new());
    let demo = Demo::new(&store, &config)
        .with_progress(|message| notices.borrow_mut().push(message.to_string()));

    let outcome = demo.write_value_with_ttl().unwrap();
    drop(demo);

    assert_eq!(notices.into_inner(), vec!["sleeping for 1200 ms".to_string()]);
    let text = outcome.to_string();
    assert_eq!(text.matches("Check a record exists").count(), 2);
    assert!(text.ends_with("key=\"myTtlKey\"> exists? false"));
}

#[test]
fn test_delete_record_output_includes_check() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    demo.write_single_value().unwrap();
    let text = demo.delete_record().unwrap().to_string();

    assert_eq!(
        text,
        "Check a record exists\n\
         <Key: ns=\"test\", set=\"myset\", key=\"mykey\"> exists? false\n\
         Deleted this record: <Key: ns=\"test\", set=\"myset\", key=\"mykey\">"
    );
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_batch_read_finds_every_written_record() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    let added = demo.add_records().unwrap();
    assert_eq!(added.to_string(), "Added 32 Records");

    let read = demo.batch_read_records().unwrap();
    assert_eq!(read, StepOutcome::BatchReadRecords { requested: 32, found: 32 });

    let first = store.get(&demo.batch_keys()[0], &BinSelection::All).unwrap().unwrap();
    assert_eq!(first.bin("dots"), Some(&Value::from("0 dots")));
}

#[test]
fn test_batch_read_before_write_finds_nothing() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    let read = demo.batch_read_records().unwrap();
    assert_eq!(read, StepOutcome::BatchReadRecords { requested: 32, found: 0 });
}

// =============================================================================
// Multi-op Tests
// =============================================================================

#[test]
fn test_multi_ops_adds_and_replaces() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    match demo.multi_ops().unwrap() {
        StepOutcome::MultiOps { record: Some(record), .. } => {
            assert_eq!(record.bin("optintbin"), Some(&Value::Int(11)));
            assert_eq!(record.bin("optstringbin"), Some(&Value::from("new string")));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

// =============================================================================
// Full Run Tests
// =============================================================================

#[test]
fn test_full_run_yields_every_step_in_order() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    let mut printed = Vec::new();
    let outcomes = demo.run(|outcome| printed.push(outcome.to_string())).unwrap();

    assert_eq!(outcomes.len(), Step::ALL.len());
    assert_eq!(printed.len(), outcomes.len());
    assert!(matches!(outcomes[0], StepOutcome::WroteSingleValue { .. }));
    assert!(matches!(outcomes[1], StepOutcome::KeyExists { exists: true, .. }));
    assert!(matches!(
        outcomes[8],
        StepOutcome::DeletedRecord { exists_after: false, .. }
    ));
    assert!(matches!(outcomes[11], StepOutcome::MultiOps { record: Some(_), .. }));
    assert!(printed[11].starts_with("Multiops\nRecord: bins: {"));

    // multi-ops recreates the deleted main record
    let record = store.get(&demo.main_key(), &BinSelection::All).unwrap().unwrap();
    assert!(record.bin("name").is_none());
    assert_eq!(record.bin("optintbin"), Some(&Value::Int(11)));

    store.close().unwrap();
}

#[test]
fn test_run_selected_steps_only() {
    let store = MemoryStore::new();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    let outcomes = demo
        .run_steps(&[Step::CheckKeyExists, Step::WriteSingleValue, Step::CheckKeyExists], |_| {})
        .unwrap();

    assert!(matches!(outcomes[0], StepOutcome::KeyExists { exists: false, .. }));
    assert!(matches!(outcomes[2], StepOutcome::KeyExists { exists: true, .. }));
}

#[test]
fn test_store_closed_after_successful_run() {
    let store = ClosingStore::default();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    let outcomes = demo
        .run_steps_and_close(&[Step::WriteSingleValue, Step::CheckKeyExists], |_| {})
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(store.closed.get(), 1);
}

#[test]
fn test_store_closed_when_step_fails() {
    let store = ClosingStore::default();
    let config = test_config();
    let demo = Demo::new(&store, &config);

    // A string in the counter bin makes the increment step fail
    store
        .put(&WriteOptions::default(), &demo.add_key(), &[Bin::new("mybin", "text")])
        .unwrap();

    let mut seen = 0;
    let result = demo.run_steps_and_close(
        &[Step::WriteSingleValue, Step::AddSingleValue, Step::CheckKeyExists],
        |_| seen += 1,
    );

    assert!(matches!(result, Err(DemoError::BinType(_))));
    assert_eq!(seen, 1);
    assert_eq!(store.closed.get(), 1);
}
