use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};
use tunables_common::{Classifier, Key, Value};
use tunables_table::{Table, TableError};

use crate::error::BackupError;

/// A point-in-time capture of configuration keys and their typed values.
///
/// Built once, either by `capture` from a live table or by loading a backup
/// file, and never mutated afterwards. Keys are held in a BTreeMap so
/// iteration and the written file are in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<Key, Value>,
}

impl Snapshot {
    /// Read every configuration key from `table`.
    ///
    /// Telemetry keys (per `classifier`) are skipped, as are keys the table
    /// cannot produce a value for. Fails with `EmptySource` when the table has
    /// no keys at all and `NoConfigurationFound` when nothing survives the
    /// filter.
    pub fn capture<T: Table + ?Sized>(
        table: &T,
        classifier: &Classifier,
    ) -> Result<Self, BackupError> {
        if !table.is_connected() {
            return Err(TableError::Disconnected.into());
        }
        let keys = table.keys()?;
        if keys.is_empty() {
            return Err(BackupError::EmptySource);
        }

        let mut entries = BTreeMap::new();
        let mut telemetry = 0usize;
        let mut absent = 0usize;
        for key in keys {
            if classifier.is_telemetry(&key) {
                trace!(key = %key, "skipping telemetry key");
                telemetry += 1;
                continue;
            }
            match table.get(&key)? {
                Some(value) => {
                    debug!(key = %key, value = %value, "captured");
                    entries.insert(Key::from(key), value);
                }
                None => {
                    debug!(key = %key, "no value, skipping");
                    absent += 1;
                }
            }
        }

        if entries.is_empty() {
            return Err(BackupError::NoConfigurationFound);
        }
        info!(
            captured = entries.len(),
            telemetry, absent, "snapshot captured"
        );
        Ok(Self { entries })
    }

    /// Number of keys in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }
}

impl FromIterator<(Key, Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a Key, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
