//! Aerospike-backed store
//!
//! Thin adapter: each method converts its arguments and makes one client call.

use std::time::Duration;

use aerospike::errors::ErrorKind;
use aerospike::operations;
use aerospike::{
    BatchPolicy, BatchRead, Bins, Client, ClientPolicy, Expiration, Key, ReadPolicy, ResultCode,
    WritePolicy,
};
use tracing::{debug, info};

use super::RecordStore;
use crate::config::Config;
use crate::error::{DemoError, Result};
use crate::record::{Bin, BinSelection, Operation, Record, RecordKey, Value, WriteOptions};

/// Record store backed by a live Aerospike cluster
pub struct AerospikeStore {
    client: Client,
    read_policy: ReadPolicy,
    write_policy: WritePolicy,
    batch_policy: BatchPolicy,
}

impl AerospikeStore {
    /// Connect to the cluster named by the config's seed hosts
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut client_policy = ClientPolicy::default();
        client_policy.timeout = Some(Duration::from_millis(config.connect_timeout_ms));
        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            client_policy.set_user_password(user.clone(), password.clone())?;
        }

        let mut write_policy = WritePolicy::default();
        write_policy.base_policy.timeout = Some(Duration::from_millis(config.write_timeout_ms));

        let hosts = config.hosts_string();
        info!("Connecting to Aerospike cluster at {}", hosts);
        let client = Client::new(&client_policy, &hosts)?;
        info!("Connected, {} node(s) discovered", client.nodes().len());

        Ok(Self {
            client,
            read_policy: ReadPolicy::default(),
            write_policy,
            batch_policy: BatchPolicy::default(),
        })
    }

    fn write_policy(&self, options: &WriteOptions) -> WritePolicy {
        let mut policy = self.write_policy.clone();
        if let Some(secs) = options.ttl_seconds {
            policy.expiration = Expiration::Seconds(secs);
        }
        policy
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn to_value(value: &Value) -> aerospike::Value {
    match value {
        Value::Nil => aerospike::Value::Nil,
        Value::Int(i) => aerospike::Value::Int(*i),
        Value::String(s) => aerospike::Value::String(s.clone()),
    }
}

/// Types the demo never writes fall back to their string form
fn from_value(value: aerospike::Value) -> Value {
    match value {
        aerospike::Value::Nil => Value::Nil,
        aerospike::Value::Int(i) => Value::Int(i),
        aerospike::Value::String(s) => Value::String(s),
        other => Value::String(other.to_string()),
    }
}

fn to_key(key: &RecordKey) -> Result<Key> {
    Ok(Key::new(
        key.namespace.as_str(),
        key.set.as_str(),
        to_value(&key.user_key),
    )?)
}

fn to_bin(bin: &Bin) -> aerospike::Bin<'_> {
    aerospike::Bin::new(&bin.name, to_value(&bin.value))
}

fn to_bins(selection: &BinSelection) -> Bins {
    match selection {
        BinSelection::All => Bins::All,
        BinSelection::Only(names) => Bins::Some(names.clone()),
    }
}

/// Batch reads borrow their bin selection, so it must outlive the call
fn to_batch_reads<'a>(keys: &[RecordKey], bins: &'a Bins) -> Result<Vec<BatchRead<'a>>> {
    keys.iter()
        .map(|key| Ok(BatchRead::new(to_key(key)?, bins)))
        .collect()
}

fn from_record(record: aerospike::Record) -> Record {
    Record {
        bins: record
            .bins
            .into_iter()
            .map(|(name, value)| (name, from_value(value)))
            .collect(),
        generation: record.generation,
    }
}

fn is_not_found(err: &aerospike::Error) -> bool {
    matches!(err.kind(), ErrorKind::ServerError(ResultCode::KeyNotFoundError))
}

// =============================================================================
// RecordStore
// =============================================================================

impl RecordStore for AerospikeStore {
    fn put(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()> {
        debug!(%key, bins = bins.len(), "put");
        let bins: Vec<_> = bins.iter().map(to_bin).collect();
        self.client.put(&self.write_policy(options), &to_key(key)?, &bins)?;
        Ok(())
    }

    fn exists(&self, key: &RecordKey) -> Result<bool> {
        debug!(%key, "exists");
        Ok(self.client.exists(&self.write_policy, &to_key(key)?)?)
    }

    fn add(&self, options: &WriteOptions, key: &RecordKey, bins: &[Bin]) -> Result<()> {
        debug!(%key, bins = bins.len(), "add");
        if let Some(bin) = bins.iter().find(|b| b.value.as_int().is_none()) {
            return Err(DemoError::BinType(format!(
                "cannot add non-integer value to bin '{}'",
                bin.name
            )));
        }
        let bins: Vec<_> = bins.iter().map(to_bin).collect();
        self.client.add(&self.write_policy(options), &to_key(key)?, &bins)?;
        Ok(())
    }

    fn get(&self, key: &RecordKey, bins: &BinSelection) -> Result<Option<Record>> {
        debug!(%key, ?bins, "get");
        match self.client.get(&self.read_policy, &to_key(key)?, to_bins(bins)) {
            Ok(record) => Ok(Some(from_record(record))),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &RecordKey) -> Result<bool> {
        debug!(%key, "delete");
        Ok(self.client.delete(&self.write_policy, &to_key(key)?)?)
    }

    fn batch_get(&self, keys: &[RecordKey]) -> Result<Vec<Option<Record>>> {
        debug!(keys = keys.len(), "batch_get");
        let all = Bins::All;
        let reads = to_batch_reads(keys, &all)?;

        let results = self.client.batch_get(&self.batch_policy, reads)?;
        Ok(results
            .into_iter()
            .map(|read| read.record.map(from_record))
            .collect())
    }

    fn operate(
        &self,
        options: &WriteOptions,
        key: &RecordKey,
        ops: &[Operation],
    ) -> Result<Option<Record>> {
        debug!(%key, ops = ops.len(), "operate");

        // Client operations borrow their bins, so convert those first
        let bins: Vec<Option<aerospike::Bin<'_>>> = ops
            .iter()
            .map(|op| match op {
                Operation::Add(bin) | Operation::Put(bin) => Some(to_bin(bin)),
                Operation::Get => None,
            })
            .collect();

        let client_ops: Vec<operations::Operation<'_>> = ops
            .iter()
            .zip(&bins)
            .map(|(op, bin)| match (op, bin) {
                (Operation::Add(_), Some(bin)) => operations::add(bin),
                (Operation::Put(_), Some(bin)) => operations::put(bin),
                _ => operations::get(),
            })
            .collect();

        match self
            .client
            .operate(&self.write_policy(options), &to_key(key)?, &client_ops)
        {
            Ok(record) => Ok(Some(from_record(record))),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) -> Result<()> {
        info!("Closing Aerospike client");
        self.client.close()?;
        Ok(())
    }
}
