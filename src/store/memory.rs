//! In-memory store
//!
//! HashMap-based record store with RwLock for concurrency. Mirrors the
//! server-side record semantics the demo depends on: generations, Nil bin
//! removal, integer adds, and TTL expiry.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use super::RecordStore;
use crate::error::{DemoError, Result};
use crate::record::{Bin, BinSelection, Operation, Record, RecordKey, Value, WriteOptions};

/// A stored record plus its expiry deadline
#[derive(Debug, Clone)]
struct StoredRecord {
    bins: BTreeMap<String, Value>,
    generation: u32,
    expires_at: Option<Instant>,
}

impl StoredRecord {
    fn new() -> Self {
        Self {
            bins: BTreeMap::new(),
            generation: 0,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |deadline| now >= deadline)
    }

    fn snapshot(&self, selection: &BinSelection) -> Record {
        Record {
            bins: self
                .bins
                .iter()
                .filter(|(name, _)| selection.includes(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            generation: self.generation,
        }
    }

    fn apply_put(&mut self, bin: &Bin) {
        if bin.value.is_nil() {
            self.bins.remove(&bin.name);
        } else {
            self.bins.insert(bin.name.clone(), bin.value.clone());
        }
    }

    fn apply_add(&mut self, bin: &Bin) -> Result<()> {
        let delta = bin.value.as_int().ok_or_else(|| {
            DemoError::BinType(format!("cannot add non-integer value to bin '{}'", bin.name))
        })?;

        let current = match self.bins.get(&bin.name) {
            None => 0,
            Some(Value::Int(i)) => *i,
            Some(_) => {
                return Err(DemoError::BinType(format!(
                    "bin '{}' does not hold an integer",
                    bin.name
                )))
            }
        };

        self.bins.insert(bin.name.clone(), Value::Int(current.wrapping_add(delta)));
        Ok(())
    }

    fn touch(&mut self, options: &WriteOptions, now: Instant) {
        self.generation = self.generation.wrapping_add(1);
        self.expires_at = options
            .ttl_seconds
            .map(|secs| now + Duration::from_secs(u64::from(secs)));
    }
}

/// Record store held entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKey, StoredRecord>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) records
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.records.read().values().filter(|r| !r.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against the live record for `key` under the write lock.
    /// Expired records are purged first, and the record is dropped again if
    /// `f` leaves it without bins. Alongside `f`'s output, returns the
    /// committed generation, or None if the record no longer exists.
    fn write_record<T>(
        &self,
        key: &RecordKey,
        options: &WriteOptions,
        f: impl FnOnce(&mut StoredRecord) -> Result<T>,
    ) -> Result<(T, Option<u32>)> {
        let now = Instant::now();
        let mut records = self.records.write();

        let mut record = match records.remove(key) {
            Some(existing) if !existing.is_expired(now) => existing,
            _ => StoredRecord::new(),
        };
        // Keep the original on failure so a rejected write changes nothing
        let original = record.clone();

        match f(&mut record) {
            Ok(out) => {
                if record.bins.is_empty() {
                    return Ok((out, None));
                }
                record.touch(options, now);
                let generation = record.generation;
                records.insert(key.clone(), record);
                Ok((out, Some(generation)))
            }
            Err(e) => {
                if original.generation > 0 {
                    records.insert(key.clone(), original);
                }
                Err(e)
            }
        }
    }

    /// Snapshot the live record for `key`. An expired record found here is
    /// purged under the write lock.
    fn read_record(&self, key: &RecordKey, selection: &BinSelection) -> Option<Record> {
        let now = Instant::now();
        {
            let records = self.records.read();
            match records.get(key) {
                None => return None,
                Some(record) if !record.is_expired(now) => return Some(record.snapshot(selection)),
                Some(_) => {}
            }
        }

        // Re-check: a writer may have replaced the record between the locks
        let mut records = self.records.write();
        if records.get(key).map_or(false, |r| r.is_expired(now)) {
            records.remove(key);
        }
        None
    }
}

impl RecordStore for MemoryStore {
    fn put(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()> {
        debug!(%key, bins = bins.len(), "put");
        self.write_record(key, options, |record| {
            bins.iter().for_each(|bin| record.apply_put(bin));
            Ok(())
        })?;
        Ok(())
    }

    fn exists(&self, key: &RecordKey) -> Result<bool> {
        debug!(%key, "exists");
        Ok(self.read_record(key, &BinSelection::Only(Vec::new())).is_some())
    }

    fn add(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()> {
        debug!(%key, bins = bins.len(), "add");
        self.write_record(key, options, |record| {
            bins.iter().try_for_each(|bin| record.apply_add(bin))
        })?;
        Ok(())
    }

    fn get(&self, key: &RecordKey, bins: &BinSelection) -> Result<Option<Record>> {
        debug!(%key, ?bins, "get");
        Ok(self.read_record(key, bins))
    }

    fn delete(&self, key: &RecordKey) -> Result<bool> {
        debug!(%key, "delete");
        let now = Instant::now();
        Ok(self
            .records
            .write()
            .remove(key)
            .map_or(false, |r| !r.is_expired(now)))
    }

    fn batch_get(&self, keys: &[RecordKey]) -> Result<Vec<Option<Record>>> {
        debug!(keys = keys.len(), "batch_get");
        Ok(keys
            .iter()
            .map(|key| self.read_record(key, &BinSelection::All))
            .collect())
    }

    fn operate(
        &self,
        options: &WriteOptions,
        key: &RecordKey,
        ops: &[Operation],
    ) -> Result<Option<Record>> {
        debug!(%key, ops = ops.len(), "operate");

        let has_writes = ops.iter().any(|op| !matches!(op, Operation::Get));
        if !has_writes {
            return Ok(self
                .read_record(key, &BinSelection::All)
                .filter(|_| ops.contains(&Operation::Get)));
        }

        let (read, generation) = self.write_record(key, options, |record| {
            let mut read: Option<BTreeMap<String, Value>> = None;
            for op in ops {
                match op {
                    Operation::Add(bin) => record.apply_add(bin)?,
                    Operation::Put(bin) => record.apply_put(bin),
                    Operation::Get => read = Some(record.bins.clone()),
                }
            }
            Ok(read)
        })?;

        // A record the operations emptied has been deleted
        Ok(read
            .zip(generation)
            .map(|(bins, generation)| Record { bins, generation }))
    }

    fn close(&self) -> Result<()> {
        debug!("close");
        Ok(())
    }
}
