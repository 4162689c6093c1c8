//! Backup directory: write-once snapshot files and the catalog over them.
//!
//! Layout inside the backup directory:
//! ```text
//! config_backup_20240101_100000.json   - one snapshot, a flat JSON object
//! config_backup_20240102_090000.json
//! ```
//! The fixed-width timestamp makes lexicographic order of file names equal to
//! creation order.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tunables_common::{Key, Value};

use crate::error::BackupError;
use crate::snapshot::Snapshot;

pub const FILE_PREFIX: &str = "config_backup_";
pub const FILE_EXTENSION: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

/// File name for a backup taken at `at`, e.g. `config_backup_20240101_100000.json`.
pub fn backup_file_name(at: NaiveDateTime) -> String {
    format!("{FILE_PREFIX}{}{FILE_EXTENSION}", at.format(TIMESTAMP_FORMAT))
}

/// Parse the creation time out of a backup file name.
/// Returns `None` for anything that does not follow the naming pattern.
pub fn parse_backup_file_name(name: &str) -> Option<NaiveDateTime> {
    let stamp = name
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_EXTENSION)?;
    let bytes = stamp.as_bytes();
    if bytes.len() != TIMESTAMP_LEN || bytes[8] != b'_' {
        return None;
    }
    let (date, time) = (&stamp[..8], &stamp[9..]);
    if !date.bytes().chain(time.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |s: &str| s.parse::<u32>().ok();
    NaiveDate::from_ymd_opt(num(&date[..4])? as i32, num(&date[4..6])?, num(&date[6..])?)?
        .and_hms_opt(num(&time[..2])?, num(&time[2..4])?, num(&time[4..])?)
}

/// A backup file found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    /// File name, used as the identifier for `BackupDir::load`.
    pub name: String,
    /// Creation time encoded in the file name (local wall clock).
    pub created: NaiveDateTime,
}

/// Directory holding snapshot files.
///
/// Files are written whole and never overwritten or appended to. The
/// directory itself is created on the first write.
#[derive(Debug, Clone)]
pub struct BackupDir {
    root: PathBuf,
}

impl BackupDir {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root: path.as_ref().to_path_buf(),
        }
    }

    /// Get the path to the backup directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the backup file called `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write `snapshot` to a new file named after the current local time.
    /// Returns the file name.
    pub fn write(&self, snapshot: &Snapshot) -> Result<String, BackupError> {
        self.write_at(snapshot, Local::now().naive_local())
    }

    /// Write `snapshot` to a new file named after `at`.
    ///
    /// Two writes within the same second map to the same name. The second
    /// one fails with `FileExists`; an existing backup is never replaced.
    pub fn write_at(&self, snapshot: &Snapshot, at: NaiveDateTime) -> Result<String, BackupError> {
        if snapshot.is_empty() {
            return Err(BackupError::EmptySnapshot);
        }
        if let Some((key, _)) = snapshot.iter().find(|(_, v)| !v.is_representable()) {
            return Err(BackupError::UnrepresentableValue { key: key.clone() });
        }

        fs::create_dir_all(&self.root)?;
        let name = backup_file_name(at);
        let path = self.root.join(&name);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(BackupError::FileExists { name });
            }
            Err(e) => return Err(e.into()),
        };

        let mut writer = BufWriter::new(file);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        snapshot.serialize(&mut ser)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!(file = %name, keys = snapshot.len(), "wrote backup");
        Ok(name)
    }

    /// Load the backup file called `name`.
    ///
    /// The file is trusted to hold configuration only; keys are not
    /// re-checked against a classifier. JSON `null` values are dropped.
    pub fn load(&self, name: &str) -> Result<Snapshot, BackupError> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(BackupError::FileNotFound {
                name: name.to_owned(),
            });
        }
        let bytes = fs::read(&path)?;
        let raw: BTreeMap<Key, Option<Value>> =
            serde_json::from_slice(&bytes).map_err(|e| BackupError::MalformedFile {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;

        let mut dropped = 0usize;
        let snapshot: Snapshot = raw
            .into_iter()
            .filter_map(|(k, v)| {
                if v.is_none() {
                    dropped += 1;
                }
                v.map(|v| (k, v))
            })
            .collect();
        debug!(file = %name, keys = snapshot.len(), dropped, "loaded backup");
        Ok(snapshot)
    }

    /// All backup files in the directory, newest first.
    ///
    /// A missing directory is an empty catalog, not an error. Files that do
    /// not follow the naming pattern are ignored.
    pub fn list(&self) -> Result<Vec<BackupEntry>, BackupError> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for item in dir {
            let item = item?;
            // Follows symlinks, so a linked backup file is listed too.
            if !item.path().is_file() {
                continue;
            }
            let Ok(name) = item.file_name().into_string() else {
                continue;
            };
            if let Some(created) = parse_backup_file_name(&name) {
                entries.push(BackupEntry { name, created });
            }
        }
        entries.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(entries)
    }

    /// The newest backup, if any.
    pub fn latest(&self) -> Result<Option<BackupEntry>, BackupError> {
        Ok(self.list()?.into_iter().next())
    }
}
