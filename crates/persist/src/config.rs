//! Engine configuration.
//!
//! Resolution order: built-in defaults, then environment variables
//! (`BackupConfig::from_env`), then explicit `with_*` overrides from the caller.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tunables_common::{Classifier, DEFAULT_TELEMETRY_SUFFIXES};

use crate::restore::Restorer;
use crate::store::BackupDir;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_TEAM_NUMBER: u16 = 2026;

/// Name of the backup directory next to the installed executable.
pub const BACKUP_DIR_NAME: &str = "backups";

/// Environment variable names.
pub const ENV_BACKUP_DIR: &str = "TUNABLES_BACKUP_DIR";
pub const ENV_TEAM: &str = "TUNABLES_TEAM";
pub const ENV_SETTLE_MS: &str = "TUNABLES_SETTLE_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "TUNABLES_CONNECT_TIMEOUT_MS";
pub const ENV_IGNORE_SUFFIXES: &str = "TUNABLES_IGNORE_SUFFIXES";

/// Tunables for backup and restore runs.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Where snapshot files are written and looked up.
    pub backup_dir: PathBuf,
    /// Key suffixes treated as telemetry and left out of backups.
    pub telemetry_suffixes: Vec<String>,
    /// Wait after flushing restored values before reporting success.
    pub settle_delay: Duration,
    /// Upper bound on the initial wait for a table connection.
    pub connect_timeout: Duration,
    /// Gap between connection polls.
    pub poll_interval: Duration,
    /// FRC team number, used to derive the robot address.
    pub team_number: u16,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            telemetry_suffixes: DEFAULT_TELEMETRY_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            team_number: DEFAULT_TEAM_NUMBER,
        }
    }
}

impl BackupConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup(ENV_BACKUP_DIR) {
            let v = v.trim();
            if !v.is_empty() {
                cfg.backup_dir = PathBuf::from(v);
            }
        }
        if let Some(v) = lookup(ENV_TEAM) {
            match v.trim().parse::<u16>() {
                Ok(n) => cfg.team_number = n,
                Err(_) => warn!(var = ENV_TEAM, value = %v, "ignoring invalid value"),
            }
        }
        if let Some(v) = lookup(ENV_SETTLE_MS) {
            match v.trim().parse::<u64>() {
                Ok(ms) => cfg.settle_delay = Duration::from_millis(ms),
                Err(_) => warn!(var = ENV_SETTLE_MS, value = %v, "ignoring invalid value"),
            }
        }
        if let Some(v) = lookup(ENV_CONNECT_TIMEOUT_MS) {
            match v.trim().parse::<u64>() {
                Ok(ms) => cfg.connect_timeout = Duration::from_millis(ms),
                Err(_) => warn!(var = ENV_CONNECT_TIMEOUT_MS, value = %v, "ignoring invalid value"),
            }
        }
        if let Some(v) = lookup(ENV_IGNORE_SUFFIXES) {
            cfg.telemetry_suffixes.extend(
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        cfg
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Add suffixes on top of the current telemetry set.
    pub fn with_extra_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.telemetry_suffixes
            .extend(suffixes.into_iter().map(Into::into));
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_team_number(mut self, team: u16) -> Self {
        self.team_number = team;
        self
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.telemetry_suffixes.iter().cloned())
    }

    pub fn restorer(&self) -> Restorer {
        Restorer::new(self.settle_delay)
    }

    pub fn open_backup_dir(&self) -> BackupDir {
        BackupDir::new(&self.backup_dir)
    }
}

/// `<directory of the running executable>/backups`, or `./backups` when the
/// executable path cannot be determined.
pub fn default_backup_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join(BACKUP_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(BACKUP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_robot_tool() {
        let cfg = BackupConfig::default();
        assert_eq!(cfg.settle_delay, Duration::from_millis(500));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert_eq!(cfg.team_number, 2026);
        assert!(cfg.backup_dir.ends_with(BACKUP_DIR_NAME));
        assert_eq!(cfg.classifier(), Classifier::default());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = BackupConfig::from_lookup(lookup(&[
            (ENV_BACKUP_DIR, "/tmp/robot-backups"),
            (ENV_TEAM, "254"),
            (ENV_SETTLE_MS, "0"),
            (ENV_CONNECT_TIMEOUT_MS, "1500"),
            (ENV_IGNORE_SUFFIXES, "_Amps, _RPM,,"),
        ]));
        assert_eq!(cfg.backup_dir, PathBuf::from("/tmp/robot-backups"));
        assert_eq!(cfg.team_number, 254);
        assert_eq!(cfg.settle_delay, Duration::ZERO);
        assert_eq!(cfg.connect_timeout, Duration::from_millis(1500));
        let classifier = cfg.classifier();
        assert!(classifier.is_telemetry("Intake/Roller_Amps"));
        assert!(classifier.is_telemetry("Shooter/Wheel_RPM"));
        assert!(classifier.is_telemetry("Turret/Motor_Temp"));
    }

    #[test]
    fn invalid_values_are_ignored() {
        let cfg = BackupConfig::from_lookup(lookup(&[
            (ENV_TEAM, "not-a-team"),
            (ENV_SETTLE_MS, "-5"),
            (ENV_BACKUP_DIR, "   "),
        ]));
        assert_eq!(cfg.team_number, DEFAULT_TEAM_NUMBER);
        assert_eq!(cfg.settle_delay, DEFAULT_SETTLE_DELAY);
        assert!(cfg.backup_dir.ends_with(BACKUP_DIR_NAME));
    }

    #[test]
    fn builder_setters_apply() {
        let cfg = BackupConfig::default()
            .with_backup_dir("out")
            .with_extra_suffixes(["_Amps"])
            .with_settle_delay(Duration::from_millis(10))
            .with_connect_timeout(Duration::from_millis(20))
            .with_team_number(1678);
        assert_eq!(cfg.open_backup_dir().root(), PathBuf::from("out").as_path());
        assert!(cfg.classifier().is_telemetry("Arm_Amps"));
        assert_eq!(cfg.restorer().settle_delay(), Duration::from_millis(10));
        assert_eq!(cfg.connect_timeout, Duration::from_millis(20));
        assert_eq!(cfg.team_number, 1678);
    }
}
