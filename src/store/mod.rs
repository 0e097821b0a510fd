//! Store Module
//!
//! The slice of the Aerospike client API the demo exercises.
//!
//! ## Backends
//! - `AerospikeStore`: delegates every call to a live cluster
//! - `MemoryStore`: in-process stand-in with the same record semantics

mod client;
mod memory;

pub use client::AerospikeStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::record::{Bin, BinSelection, Operation, Record, RecordKey, WriteOptions};

/// Operations the demo performs against a record store
pub trait RecordStore {
    /// Write bins, creating the record if needed. Nil bins are removed.
    fn put(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()>;

    /// Check whether a record exists
    fn exists(&self, key: &RecordKey) -> Result<bool>;

    /// Add integer bins to existing values (missing bins start at 0)
    fn add(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()>;

    /// Read a record. Returns None if it does not exist.
    fn get(&self, key: &RecordKey, bins: &BinSelection) -> Result<Option<Record>>;

    /// Delete a record. Returns whether it existed.
    fn delete(&self, key: &RecordKey) -> Result<bool>;

    /// Read many records at once, one slot per key in request order
    fn batch_get(&self, keys: &[RecordKey]) -> Result<Vec<Option<Record>>>;

    /// Apply operations in order to a single record
    fn operate(
        &self,
        options: &WriteOptions,
        key: &RecordKey,
        ops: &[Operation],
    ) -> Result<Option<Record>>;

    /// Release the connection
    fn close(&self) -> Result<()>;
}
