use tunables_common::Key;
use tunables_table::TableError;

/// Errors from capturing, persisting and restoring snapshots.
///
/// Individual key writes that fail during a restore are not errors; they are
/// collected in `RestoreResult::failures`.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("table unavailable: {0}")]
    StoreUnavailable(#[from] TableError),
    #[error("table is empty, no configuration found to back up")]
    EmptySource,
    #[error("no tunable configuration found after filtering telemetry")]
    NoConfigurationFound,
    #[error("refusing to write an empty snapshot")]
    EmptySnapshot,
    #[error("backup file not found: {name}")]
    FileNotFound { name: String },
    #[error("failed to parse {name}, is it valid JSON? ({reason})")]
    MalformedFile { name: String, reason: String },
    #[error("backup file already exists, not overwriting: {name}")]
    FileExists { name: String },
    #[error("value of {key} is not a finite number and cannot be saved")]
    UnrepresentableValue { key: Key },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
