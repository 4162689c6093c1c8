//! File-backed table.
//!
//! Workaround: the network transport to the robot is not implemented. This
//! table stands in for it by treating a JSON object file as the published
//! table. Writes are buffered in memory and reach the file on `flush`, the
//! same way network writes only leave the process on flush.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use tunables_common::Value;

use crate::table::{check_kind, Table, TableError};

#[derive(Debug)]
pub struct JsonTable {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    dirty: bool,
}

impl JsonTable {
    /// Open the table file at `path`. A missing file opens as an empty table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let file = std::fs::File::open(&path)?;
            let raw: BTreeMap<String, Option<Value>> = serde_json::from_reader(file)?;
            raw.into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect()
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "opened table file");
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are writes not yet flushed to the file.
    pub fn has_pending_writes(&self) -> bool {
        self.dirty
    }

    fn store(&mut self, key: &str, value: Value) -> Result<(), TableError> {
        check_kind(key, self.entries.get(key), value.kind())?;
        if !value.is_representable() {
            return Err(TableError::Rejected {
                key: key.to_owned(),
                reason: "non-finite number".into(),
            });
        }
        self.entries.insert(key.to_owned(), value);
        self.dirty = true;
        Ok(())
    }
}

impl Table for JsonTable {
    fn is_connected(&self) -> bool {
        true
    }

    fn keys(&self) -> Result<Vec<String>, TableError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, TableError> {
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
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        serde_json::to_writer_pretty(std::fs::File::create(&self.path)?, &self.entries)?;
        self.dirty = false;
        debug!(path = %self.path.display(), keys = self.entries.len(), "flushed table file");
        Ok(())
    }
}
