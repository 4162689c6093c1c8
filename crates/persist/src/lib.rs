//! Configuration backup and restore for the robot's published key-value table.
//!
//! # Invariants
//! - A snapshot holds configuration keys only; telemetry keys never enter a capture.
//! - Snapshot files are write-once. An existing backup is never overwritten.
//! - `load(write(s)) == s`, including float precision and boolean vs. string identity.
//! - A failed key write during restore never stops the remaining writes.

pub mod config;
pub mod error;
pub mod plan;
pub mod restore;
pub mod snapshot;
pub mod store;

pub use config::BackupConfig;
pub use error::BackupError;
pub use plan::{ChangeStatus, KeyChange, RestorePlan};
pub use restore::{KeyFailure, RestoreResult, Restorer};
pub use snapshot::Snapshot;
pub use store::{BackupDir, BackupEntry};
