use std::collections::{BTreeMap, HashSet};
use tunables_common::Value;

use crate::table::{check_kind, Table, TableError};

/// In-memory table.
///
/// Keeps keys in a BTreeMap so enumeration order is deterministic. Carries
/// fault injection hooks (disconnect, unreadable keys, rejected writes) so
/// engine behaviour under a misbehaving network table can be exercised
/// without one.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    entries: BTreeMap<String, Value>,
    connected: bool,
    unreadable: HashSet<String>,
    rejected: HashSet<String>,
    writes: usize,
    flushes: usize,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            connected: true,
            unreadable: HashSet::new(),
            rejected: HashSet::new(),
            writes: 0,
            flushes: 0,
        }
    }
}

impl MemoryTable {
    /// Create an empty, connected table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table directly, bypassing type checks and counters.
    pub fn with_entry(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.entries.insert(key.to_owned(), value.into());
        self
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make `get(key)` report no value while the key stays enumerable.
    pub fn make_unreadable(&mut self, key: &str) {
        self.unreadable.insert(key.to_owned());
    }

    /// Make every put to `key` fail.
    pub fn reject_writes_to(&mut self, key: &str) {
        self.rejected.insert(key.to_owned());
    }

    /// Stored value, ignoring connectivity and fault injection.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful puts.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    fn store(&mut self, key: &str, value: Value) -> Result<(), TableError> {
        if !self.connected {
            return Err(TableError::Disconnected);
        }
        if self.rejected.contains(key) {
            return Err(TableError::Rejected {
                key: key.to_owned(),
                reason: "write refused by table".into(),
            });
        }
        check_kind(key, self.entries.get(key), value.kind())?;
        self.entries.insert(key.to_owned(), value);
        self.writes += 1;
        Ok(())
    }
}

impl Table for MemoryTable {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn keys(&self) -> Result<Vec<String>, TableError> {
        if !self.connected {
            return Err(TableError::Disconnected);
        }
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, TableError> {
        if !self.connected {
            return Err(TableError::Disconnected);
        }
        if self.unreadable.contains(key) {
            return Ok(None);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn put_boolean(&mut self, key: &str, value: bool) -> Result<(), TableError> {
        self.store(key, Value::Boolean(value))
    }

    fn put_number(&mut self, key: &str, value: f64) -> Result<(), TableError> {
        self.store(key, Value::Number(value))
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), TableError> {
        self.store(key, Value::String(value.to_owned()))
    }

    fn flush(&mut self) -> Result<(), TableError> {
        if !self.connected {
            return Err(TableError::Disconnected);
        }
        self.flushes += 1;
        Ok(())
    }
}
