//! Record Types
//!
//! Backend-neutral keys, bins and records the demo steps work with.

use std::collections::BTreeMap;
use std::fmt;

/// A bin value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Writing Nil to a bin removes the bin
    Nil,
    Int(i64),
    String(String),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "<null>"),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A named value inside a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bin {
    pub name: String,
    pub value: Value,
}

impl Bin {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// A bin that deletes `name` when written
    pub fn nil(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Nil,
        }
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Record address: namespace, set and user key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub namespace: String,
    pub set: String,
    pub user_key: Value,
}

impl RecordKey {
    pub fn new(
        namespace: impl Into<String>,
        set: impl Into<String>,
        user_key: impl Into<Value>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            set: set.into(),
            user_key: user_key.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Key: ns=\"{}\", set=\"{}\", key=\"{}\">",
            self.namespace, self.set, self.user_key
        )
    }
}

/// A record as read back from the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Bins sorted by name so output is stable
    pub bins: BTreeMap<String, Value>,
    pub generation: u32,
}

impl Record {
    pub fn bin(&self, name: &str) -> Option<&Value> {
        self.bins.get(name)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bins: {{")?;
        for (i, (name, value)) in self.bins.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}, generation: {}", self.generation)
    }
}

/// Which bins a read returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinSelection {
    All,
    Only(Vec<String>),
}

impl BinSelection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BinSelection::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            BinSelection::All => true,
            BinSelection::Only(names) => names.iter().any(|n| n == name),
        }
    }
}

/// One step of a compound `operate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Integer increment
    Add(Bin),
    Put(Bin),
    /// Read every bin, after the operations before it
    Get,
}

/// Per-write options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// None keeps the namespace default TTL
    pub ttl_seconds: Option<u32>,
}

impl WriteOptions {
    pub fn with_ttl(secs: u32) -> Self {
        Self {
            ttl_seconds: Some(secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = RecordKey::new("test", "myset", "mykey");
        assert_eq!(key.to_string(), "<Key: ns=\"test\", set=\"myset\", key=\"mykey\">");

        let key = RecordKey::new("test", "myset", 7);
        assert_eq!(key.to_string(), "<Key: ns=\"test\", set=\"myset\", key=\"7\">");
    }

    #[test]
    fn test_bin_display() {
        assert_eq!(Bin::new("age", 42).to_string(), "age=42");
        assert_eq!(Bin::new("name", "Lynn").to_string(), "name=Lynn");
        assert_eq!(Bin::nil("mybin").to_string(), "mybin=<null>");
    }

    #[test]
    fn test_record_display_sorted() {
        let mut record = Record {
            generation: 3,
            ..Default::default()
        };
        record.bins.insert("name".to_string(), Value::from("Lynn"));
        record.bins.insert("age".to_string(), Value::Int(42));

        assert_eq!(record.to_string(), "bins: {age: 42, name: Lynn}, generation: 3");
    }

    #[test]
    fn test_bin_selection() {
        let only = BinSelection::only(["name", "age"]);
        assert!(only.includes("age"));
        assert!(!only.includes("location"));
        assert!(BinSelection::All.includes("anything"));
    }
}
