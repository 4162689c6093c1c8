use std::time::Duration;
use tunables_common::{Value, ValueKind};

/// Errors raised by a live table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table is not connected")]
    Disconnected,
    #[error("type mismatch for {key}: table holds a {existing}, refused a {attempted}")]
    TypeMismatch {
        key: String,
        existing: ValueKind,
        attempted: ValueKind,
    },
    #[error("write to {key} rejected: {reason}")]
    Rejected { key: String, reason: String },
    #[error("no connection to the table after {timeout:?}")]
    ConnectTimeout { timeout: Duration },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A published key-value table shared with the robot.
///
/// Reads return typed scalars. Writes go through one put per value type, as
/// the network table API requires; `put` picks the right one for a `Value`.
pub trait Table {
    /// Whether the table is reachable right now.
    fn is_connected(&self) -> bool;

    /// All keys currently present, in the table's own order.
    fn keys(&self) -> Result<Vec<String>, TableError>;

    /// Current value of `key`, or `None` if the table has no value for it.
    fn get(&self, key: &str) -> Result<Option<Value>, TableError>;

    fn put_boolean(&mut self, key: &str, value: bool) -> Result<(), TableError>;

    fn put_number(&mut self, key: &str, value: f64) -> Result<(), TableError>;

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), TableError>;

    /// Push buffered writes out to the network.
    fn flush(&mut self) -> Result<(), TableError>;

    /// Write `value` with the put matching its type.
    fn put(&mut self, key: &str, value: &Value) -> Result<(), TableError> {
        match value {
            Value::Boolean(b) => self.put_boolean(key, *b),
            Value::Number(n) => self.put_number(key, *n),
            Value::String(s) => self.put_string(key, s),
        }
    }
}

/// Refuse a write whose type differs from the value already stored under `key`.
pub(crate) fn check_kind(
    key: &str,
    existing: Option<&Value>,
    attempted: ValueKind,
) -> Result<(), TableError> {
    match existing {
        Some(v) if v.kind() != attempted => Err(TableError::TypeMismatch {
            key: key.to_owned(),
            existing: v.kind(),
            attempted,
        }),
        _ => Ok(()),
    }
}
