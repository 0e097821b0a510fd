//! Demo Module
//!
//! The walkthrough itself: a fixed sequence of client calls against one
//! store, each reported as a `StepOutcome`.
//!
//! ## Sequence
//! 1. Write, check, increment and multi-bin write on single records
//! 2. Watch a TTL record expire
//! 3. Read all bins, then selected bins
//! 4. Delete a bin, then the whole record
//! 5. Batch write and batch read
//! 6. Compound operate (add + put + get in one call)

use std::fmt;
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::record::{Bin, BinSelection, Operation, Record, RecordKey, WriteOptions};
use crate::store::RecordStore;

/// A single demo step, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Step {
    WriteSingleValue,
    CheckKeyExists,
    AddSingleValue,
    WriteMultipleValues,
    WriteValueWithTtl,
    ReadAllValues,
    ReadSomeValues,
    DeleteValue,
    DeleteRecord,
    AddRecords,
    BatchReadRecords,
    MultiOps,
}

impl Step {
    /// Every step in the order a full run performs them
    pub const ALL: [Step; 12] = [
        Step::WriteSingleValue,
        Step::CheckKeyExists,
        Step::AddSingleValue,
        Step::WriteMultipleValues,
        Step::WriteValueWithTtl,
        Step::ReadAllValues,
        Step::ReadSomeValues,
        Step::DeleteValue,
        Step::DeleteRecord,
        Step::AddRecords,
        Step::BatchReadRecords,
        Step::MultiOps,
    ];
}

/// What a step did, printed as the demo's console output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    WroteSingleValue { key: RecordKey, bin: Bin },
    KeyExists { key: RecordKey, exists: bool },
    AddedSingleValue { key: RecordKey, bin: Bin },
    WroteMultipleValues { key: RecordKey, bins: Vec<Bin> },
    ValueWithTtl {
        key: RecordKey,
        ttl_seconds: u32,
        waited: Duration,
        exists_before: bool,
        exists_after: bool,
    },
    ReadAllValues { key: RecordKey, record: Option<Record> },
    ReadSomeValues { key: RecordKey, bins: Vec<String>, record: Option<Record> },
    DeletedValue { key: RecordKey, bin: Bin },
    DeletedRecord { key: RecordKey, existed: bool, exists_after: bool },
    AddedRecords { count: usize },
    BatchReadRecords { requested: usize, found: usize },
    MultiOps { key: RecordKey, record: Option<Record> },
}

fn fmt_record(record: &Option<Record>) -> String {
    match record {
        Some(r) => r.to_string(),
        None => "<none>".to_string(),
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::WroteSingleValue { key, bin } => {
                write!(f, "Wrote this new value (or bin): {} {}", key, bin)
            }
            StepOutcome::KeyExists { key, exists } => {
                writeln!(f, "Check a record exists")?;
                write!(f, "{} exists? {}", key, exists)
            }
            StepOutcome::AddedSingleValue { key, bin } => {
                write!(f, "Wrote this additional value (or bin): {} {}", key, bin)
            }
            StepOutcome::WroteMultipleValues { key, bins } => {
                write!(f, "Wrote these additional values: {}", key)?;
                for bin in bins {
                    write!(f, " {}", bin)?;
                }
                Ok(())
            }
            StepOutcome::ValueWithTtl {
                key,
                ttl_seconds,
                waited,
                exists_before,
                exists_after,
            } => {
                writeln!(f, "Wrote {} with a {} second TTL", key, ttl_seconds)?;
                writeln!(f, "Check a record exists")?;
                writeln!(f, "{} exists? {}", key, exists_before)?;
                writeln!(f, "slept for {} ms", waited.as_millis())?;
                writeln!(f, "Check a record exists")?;
                write!(f, "{} exists? {}", key, exists_after)
            }
            StepOutcome::ReadAllValues { record, .. } => {
                writeln!(f, "Read all bins of a record")?;
                write!(f, "Read these values: {}", fmt_record(record))
            }
            StepOutcome::ReadSomeValues { record, .. } => {
                writeln!(f, "Read specific values (or bins) of a record")?;
                write!(f, "Read these values: {}", fmt_record(record))
            }
            StepOutcome::DeletedValue { bin, .. } => {
                write!(f, "Deleted this value: {}", bin)
            }
            StepOutcome::DeletedRecord {
                key, exists_after, ..
            } => {
                writeln!(f, "Check a record exists")?;
                writeln!(f, "{} exists? {}", key, exists_after)?;
                write!(f, "Deleted this record: {}", key)
            }
            StepOutcome::AddedRecords { count } => write!(f, "Added {} Records", count),
            StepOutcome::BatchReadRecords { requested, found } => {
                writeln!(f, "Batch Reads")?;
                write!(f, "Read {} records ({} found)", requested, found)
            }
            StepOutcome::MultiOps { record, .. } => {
                writeln!(f, "Multiops")?;
                write!(f, "Record: {}", fmt_record(record))
            }
        }
    }
}

/// Runs the demo steps against a store
pub struct Demo<'a, S: RecordStore> {
    store: &'a S,
    config: &'a Config,
    /// Notices emitted while a step is still running
    progress: Option<Box<dyn Fn(&str) + 'a>>,
}

impl<'a, S: RecordStore> Demo<'a, S> {
    pub fn new(store: &'a S, config: &'a Config) -> Self {
        Self {
            store,
            config,
            progress: None,
        }
    }

    /// Receive in-step notices, such as the one before the TTL sleep
    pub fn with_progress(mut self, progress: impl Fn(&str) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    fn notify(&self, message: &str) {
        info!("{}", message);
        if let Some(progress) = &self.progress {
            progress(message);
        }
    }

    /// Key of the record most steps operate on
    pub fn main_key(&self) -> RecordKey {
        RecordKey::new(&self.config.namespace, &self.config.set, self.config.key.as_str())
    }

    pub fn add_key(&self) -> RecordKey {
        RecordKey::new(
            &self.config.namespace,
            &self.config.add_set,
            self.config.add_key.as_str(),
        )
    }

    pub fn ttl_key(&self) -> RecordKey {
        RecordKey::new(
            &self.config.namespace,
            &self.config.ttl_set,
            self.config.ttl_key.as_str(),
        )
    }

    /// Integer keys `1..=batch_size` in the main set
    pub fn batch_keys(&self) -> Vec<RecordKey> {
        (1..=self.config.batch_size)
            .map(|i| RecordKey::new(&self.config.namespace, &self.config.set, i))
            .collect()
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions::default()
    }

    /// Run every step in order, handing each outcome to `on_step`
    pub fn run(&self, on_step: impl FnMut(&StepOutcome)) -> Result<Vec<StepOutcome>> {
        self.run_steps(&Step::ALL, on_step)
    }

    /// Run the given steps in the given order
    pub fn run_steps(
        &self,
        steps: &[Step],
        mut on_step: impl FnMut(&StepOutcome),
    ) -> Result<Vec<StepOutcome>> {
        let mut outcomes = Vec::with_capacity(steps.len());
        for &step in steps {
            info!(?step, "Running step");
            let outcome = self.run_step(step)?;
            on_step(&outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Run the given steps, then close the store whether or not a step
    /// failed. A step error takes precedence over a close error.
    pub fn run_steps_and_close(
        &self,
        steps: &[Step],
        on_step: impl FnMut(&StepOutcome),
    ) -> Result<Vec<StepOutcome>> {
        let outcomes = self.run_steps(steps, on_step);
        let closed = self.store.close();
        let outcomes = outcomes?;
        closed?;
        Ok(outcomes)
    }

    pub fn run_step(&self, step: Step) -> Result<StepOutcome> {
        match step {
            Step::WriteSingleValue => self.write_single_value(),
            Step::CheckKeyExists => self.check_key_exists(&self.main_key()),
            Step::AddSingleValue => self.add_single_value(),
            Step::WriteMultipleValues => self.write_multiple_values(),
            Step::WriteValueWithTtl => self.write_value_with_ttl(),
            Step::ReadAllValues => self.read_all_values(),
            Step::ReadSomeValues => self.read_some_values(),
            Step::DeleteValue => self.delete_value(),
            Step::DeleteRecord => self.delete_record(),
            Step::AddRecords => self.add_records(),
            Step::BatchReadRecords => self.batch_read_records(),
            Step::MultiOps => self.multi_ops(),
        }
    }

    // =========================================================================
    // Steps
    // =========================================================================

    pub fn write_single_value(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let bin = Bin::new("mybin", "myReadModifyWriteValue");
        self.store
            .put(&self.write_options(), &key, std::slice::from_ref(&bin))?;
        Ok(StepOutcome::WroteSingleValue { key, bin })
    }

    pub fn check_key_exists(&self, key: &RecordKey) -> Result<StepOutcome> {
        let exists = self.store.exists(key)?;
        Ok(StepOutcome::KeyExists {
            key: key.clone(),
            exists,
        })
    }

    pub fn add_single_value(&self) -> Result<StepOutcome> {
        let key = self.add_key();
        let bin = Bin::new("mybin", 1);
        self.store
            .add(&self.write_options(), &key, std::slice::from_ref(&bin))?;
        Ok(StepOutcome::AddedSingleValue { key, bin })
    }

    pub fn write_multiple_values(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let bins = vec![
            Bin::new("location", "Oslo"),
            Bin::new("name", "Lynn"),
            Bin::new("age", 42),
        ];
        self.store.put(&self.write_options(), &key, &bins)?;
        Ok(StepOutcome::WroteMultipleValues { key, bins })
    }

    pub fn write_value_with_ttl(&self) -> Result<StepOutcome> {
        let key = self.ttl_key();
        let ttl_seconds = self.config.ttl_seconds;
        self.store.put(
            &WriteOptions::with_ttl(ttl_seconds),
            &key,
            &[Bin::new("gender", "female")],
        )?;

        let exists_before = self.store.exists(&key)?;

        let waited = Duration::from_millis(self.config.ttl_wait_ms);
        self.notify(&format!("sleeping for {} ms", waited.as_millis()));
        thread::sleep(waited);

        let exists_after = self.store.exists(&key)?;

        Ok(StepOutcome::ValueWithTtl {
            key,
            ttl_seconds,
            waited,
            exists_before,
            exists_after,
        })
    }

    pub fn read_all_values(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let record = self.store.get(&key, &BinSelection::All)?;
        Ok(StepOutcome::ReadAllValues { key, record })
    }

    pub fn read_some_values(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let bins = vec!["name".to_string(), "age".to_string()];
        let record = self.store.get(&key, &BinSelection::Only(bins.clone()))?;
        Ok(StepOutcome::ReadSomeValues { key, bins, record })
    }

    pub fn delete_value(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let bin = Bin::nil("mybin");
        self.store
            .put(&self.write_options(), &key, std::slice::from_ref(&bin))?;
        Ok(StepOutcome::DeletedValue { key, bin })
    }

    pub fn delete_record(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let existed = self.store.delete(&key)?;
        let exists_after = self.store.exists(&key)?;
        Ok(StepOutcome::DeletedRecord {
            key,
            existed,
            exists_after,
        })
    }

    pub fn add_records(&self) -> Result<StepOutcome> {
        let options = self.write_options();
        let keys = self.batch_keys();
        for (i, key) in keys.iter().enumerate() {
            self.store
                .put(&options, key, &[Bin::new("dots", format!("{} dots", i))])?;
        }
        Ok(StepOutcome::AddedRecords { count: keys.len() })
    }

    pub fn batch_read_records(&self) -> Result<StepOutcome> {
        let keys = self.batch_keys();
        let records = self.store.batch_get(&keys)?;
        let found = records.iter().filter(|r| r.is_some()).count();
        Ok(StepOutcome::BatchReadRecords {
            requested: records.len(),
            found,
        })
    }

    pub fn multi_ops(&self) -> Result<StepOutcome> {
        let key = self.main_key();
        let options = self.write_options();

        let int_bin = Bin::new("optintbin", 7);
        let string_bin = Bin::new("optstringbin", "string value");
        self.store
            .put(&options, &key, &[int_bin.clone(), string_bin.clone()])?;

        let ops = [
            Operation::Add(Bin::new(int_bin.name, 4)),
            Operation::Put(Bin::new(string_bin.name, "new string")),
            Operation::Get,
        ];
        let record = self.store.operate(&options, &key, &ops)?;
        Ok(StepOutcome::MultiOps { key, record })
    }
}
