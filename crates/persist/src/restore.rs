use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use tunables_common::Key;
use tunables_table::{Table, TableError};

use crate::config::DEFAULT_SETTLE_DELAY;
use crate::error::BackupError;
use crate::snapshot::Snapshot;

/// A key the table refused to take during a restore.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFailure {
    pub key: Key,
    pub reason: String,
}

/// Outcome of one restore. Reported to the caller, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreResult {
    /// Keys a write was attempted for (every key in the snapshot).
    pub attempted: usize,
    pub succeeded: usize,
    /// One entry per failed key, in snapshot order.
    pub failures: Vec<KeyFailure>,
}

impl RestoreResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every attempted key was written.
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.attempted
    }

    pub fn failed_key(&self, key: &str) -> bool {
        self.failures.iter().any(|f| f.key.as_str() == key)
    }
}

impl fmt::Display for RestoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "restored {}/{} keys ({} failed)",
            self.succeeded,
            self.attempted,
            self.failed()
        )
    }
}

/// Pushes a snapshot back into a live table.
///
/// Every key gets its own typed write. A rejected key is recorded and the
/// rest of the batch carries on. After the batch the table is flushed and the
/// restorer blocks for the settle delay so the writes can propagate before
/// the caller reports success.
#[derive(Debug, Clone)]
pub struct Restorer {
    settle_delay: Duration,
}

impl Default for Restorer {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl Restorer {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Write every entry of `snapshot` into `table`.
    ///
    /// Fails with `StoreUnavailable` only if the table is disconnected before
    /// the first write or the final flush fails. Per-key failures, including
    /// a connection dropping mid-batch, land in `RestoreResult::failures`.
    pub fn restore<T: Table + ?Sized>(
        &self,
        table: &mut T,
        snapshot: &Snapshot,
    ) -> Result<RestoreResult, BackupError> {
        if !table.is_connected() {
            return Err(TableError::Disconnected.into());
        }

        let mut result = RestoreResult::default();
        for (key, value) in snapshot {
            result.attempted += 1;
            match table.put(key.as_str(), value) {
                Ok(()) => {
                    debug!(key = %key, value = %value, "restored");
                    result.succeeded += 1;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to restore");
                    result.failures.push(KeyFailure {
                        key: key.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        table.flush()?;
        if !self.settle_delay.is_zero() {
            debug!(delay = ?self.settle_delay, "waiting for writes to settle");
            thread::sleep(self.settle_delay);
        }

        info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed(),
            "restore complete"
        );
        Ok(result)
    }
}
