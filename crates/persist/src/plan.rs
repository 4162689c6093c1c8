use tunables_common::{Key, Value};
use tunables_table::{Table, TableError};

use crate::error::BackupError;
use crate::snapshot::Snapshot;

/// How restoring one key would change the live table.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeStatus {
    /// Live value already equals the snapshot value.
    Unchanged,
    /// Live value differs and will be overwritten.
    Changed { current: Value },
    /// Live value has a different type. The table will refuse the write.
    Conflict { current: Value },
    /// Key is not in the live table yet.
    Added,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyChange {
    pub key: Key,
    pub restored: Value,
    pub status: ChangeStatus,
}

/// Preview of a restore, computed from reads only.
///
/// Lets a caller show what would be overwritten and ask for confirmation
/// before running the `Restorer`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestorePlan {
    changes: Vec<KeyChange>,
}

impl RestorePlan {
    pub fn compute<T: Table + ?Sized>(table: &T, snapshot: &Snapshot) -> Result<Self, BackupError> {
        if !table.is_connected() {
            return Err(TableError::Disconnected.into());
        }
        let mut changes = Vec::with_capacity(snapshot.len());
        for (key, restored) in snapshot {
            let status = match table.get(key.as_str())? {
                None => ChangeStatus::Added,
                Some(current) if current == *restored => ChangeStatus::Unchanged,
                Some(current) if current.kind() != restored.kind() => {
                    ChangeStatus::Conflict { current }
                }
                Some(current) => ChangeStatus::Changed { current },
            };
            changes.push(KeyChange {
                key: key.clone(),
                restored: restored.clone(),
                status,
            });
        }
        Ok(Self { changes })
    }

    pub fn changes(&self) -> &[KeyChange] {
        &self.changes
    }

    pub fn changed_count(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Changed { .. }))
    }

    pub fn conflict_count(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Conflict { .. }))
    }

    pub fn added_count(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Added))
    }

    pub fn unchanged_count(&self) -> usize {
        self.count(|s| matches!(s, ChangeStatus::Unchanged))
    }

    /// True when restoring would not modify the table.
    pub fn is_noop(&self) -> bool {
        self.unchanged_count() == self.changes.len()
    }

    fn count(&self, pred: impl Fn(&ChangeStatus) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(&c.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunables_table::MemoryTable;

    fn snapshot() -> Snapshot {
        [
            (Key::from("Auto/Mode"), Value::from("left")),
            (Key::from("Turret/kD"), Value::Number(0.0)),
            (Key::from("Turret/kI"), Value::Number(0.01)),
            (Key::from("Turret/kP"), Value::Number(1.5)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn plan_classifies_each_key() {
        let table = MemoryTable::new()
            .with_entry("Turret/kP", 1.5)
            .with_entry("Turret/kI", 0.5)
            .with_entry("Auto/Mode", true);
        let plan = RestorePlan::compute(&table, &snapshot()).unwrap();

        let status = |key: &str| {
            plan.changes()
                .iter()
                .find(|c| c.key.as_str() == key)
                .map(|c| c.status.clone())
        };
        assert_eq!(status("Turret/kP"), Some(ChangeStatus::Unchanged));
        assert_eq!(
            status("Turret/kI"),
            Some(ChangeStatus::Changed {
                current: Value::Number(0.5)
            })
        );
        assert_eq!(status("Turret/kD"), Some(ChangeStatus::Added));
        assert_eq!(
            status("Auto/Mode"),
            Some(ChangeStatus::Conflict {
                current: Value::Boolean(true)
            })
        );
        assert_eq!(plan.changed_count(), 1);
        assert_eq!(plan.added_count(), 1);
        assert_eq!(plan.conflict_count(), 1);
        assert_eq!(plan.unchanged_count(), 1);
        assert!(!plan.is_noop());
    }

    #[test]
    fn plan_against_identical_table_is_noop() {
        let table = MemoryTable::new()
            .with_entry("Auto/Mode", "left")
            .with_entry("Turret/kD", 0.0)
            .with_entry("Turret/kI", 0.01)
            .with_entry("Turret/kP", 1.5);
        let plan = RestorePlan::compute(&table, &snapshot()).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn plan_does_not_write() {
        let table = MemoryTable::new();
        RestorePlan::compute(&table, &snapshot()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.write_count(), 0);
    }

    #[test]
    fn plan_on_disconnected_table_fails() {
        let mut table = MemoryTable::new();
        table.set_connected(false);
        assert!(matches!(
            RestorePlan::compute(&table, &snapshot()),
            Err(BackupError::StoreUnavailable(_))
        ));
    }
}
