// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! On-disk layout of stored log records.
//!
//! Every record lands in its own file:
//!
//! ```text
//! <root>/<source_type>/<YYYY-MM-DD>/<HH>_<digest>.json
//! ```
//!
//! The directory path is the only index. Files are write-once: a name that already
//! exists is never reused, so a read always returns the record written under it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::LogsApiError;

pub const UNKNOWN_SOURCE_TYPE: &str = "unknown";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
const HOUR_FORMAT: &str = "%H";
const DIGEST_LEN: usize = 8;
const MAX_FILE_NAME_ATTEMPTS: i64 = 16;

/// Composite key of one stored record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredLogKey {
    pub source_type: String,
    pub date: String,
    pub file: String,
}

pub struct LogStore {
    root: PathBuf,
    clock: Box<dyn Clock + Send + Sync>,
}

impl LogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, SystemClock)
    }

    pub fn with_clock(root: impl Into<PathBuf>, clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            root: root.into(),
            clock: Box::new(clock),
        }
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn today(&self) -> String {
        self.now().format(DATE_FORMAT).to_string()
    }

    pub fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Writes one record under `<root>/<source_type>/<date>/` and returns its key.
    ///
    /// Two writes in the same microsecond derive the same digest. The second one then
    /// advances the digest timestamp until it finds a free name instead of overwriting.
    pub fn write_record(&self, record: &serde_json::Value) -> Result<StoredLogKey, LogsApiError> {
        let source_type = source_type_of(record);
        let now = self.clock.now();
        let date = now.format(DATE_FORMAT).to_string();
        let hour = now.format(HOUR_FORMAT).to_string();

        let dir = self.root.join(&source_type).join(&date);
        fs::create_dir_all(&dir)?;

        let contents = serde_json::to_vec_pretty(record)?;
        let micros = now.timestamp_micros();

        for attempt in 0..MAX_FILE_NAME_ATTEMPTS {
            let file = format!("{hour}_{}.json", file_name_digest(micros + attempt));
            let path = dir.join(&file);
            let mut f = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(f) => f,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("{} already exists, deriving a new name", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            f.write_all(&contents)?;

            info!("Saved log entry to {}", path.display());
            return Ok(StoredLogKey {
                source_type,
                date,
                file,
            });
        }

        Err(LogsApiError::Server(format!(
            "Unable to find a free file name in {}",
            dir.display()
        )))
    }

    /// Names of the source-type directories directly under the root. Directories whose
    /// names could not have been written by the store are skipped.
    pub fn source_types(&self) -> Result<Vec<String>, LogsApiError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut source_types = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) if is_path_component(name) => source_types.push(name.to_string()),
                _ => debug!("Skipping {} in storage root", entry.path().display()),
            }
        }
        source_types.sort();
        Ok(source_types)
    }

    /// File names stored for one source type and date. A missing directory is not
    /// an error, it just has nothing in it.
    pub fn list_files(&self, source_type: &str, date: &str) -> Result<Vec<String>, LogsApiError> {
        ensure_path_component("type", source_type)?;
        ensure_path_component("date", date)?;

        let dir = self.root.join(source_type).join(date);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Reads back and parses the record stored under `key`.
    pub fn read_record(&self, key: &StoredLogKey) -> Result<serde_json::Value, LogsApiError> {
        let path = self.record_path(key)?;
        if !path.is_file() {
            return Err(LogsApiError::NotFound);
        }
        let contents = fs::read(&path)?;
        Ok(serde_json::from_slice(&contents)?)
    }

    fn record_path(&self, key: &StoredLogKey) -> Result<PathBuf, LogsApiError> {
        ensure_path_component("type", &key.source_type)?;
        ensure_path_component("date", &key.date)?;
        ensure_path_component("file", &key.file)?;
        Ok(self.root.join(&key.source_type).join(&key.date).join(&key.file))
    }
}

/// Runs blocking storage work on tokio's blocking thread pool.
pub async fn run_blocking<T, F>(work: F) -> Result<T, LogsApiError>
where
    F: FnOnce() -> Result<T, LogsApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LogsApiError::Server(format!("Storage task failed: {e}")))?
}

/// Source type of a record: `@metadata.beat` when it is a usable directory name,
/// `unknown` otherwise.
pub fn source_type_of(record: &serde_json::Value) -> String {
    record
        .get("@metadata")
        .and_then(|metadata| metadata.get("beat"))
        .and_then(|beat| beat.as_str())
        .filter(|beat| is_path_component(beat))
        .unwrap_or(UNKNOWN_SOURCE_TYPE)
        .to_string()
}

/// First 8 hex chars of the SHA-256 of the write time, rendered as fractional Unix seconds.
pub fn file_name_digest(timestamp_micros: i64) -> String {
    let seconds = timestamp_micros.div_euclid(1_000_000);
    let fraction = timestamp_micros.rem_euclid(1_000_000);
    let mut hasher = Sha256::new();
    hasher.update(format!("{seconds}.{fraction:06}").as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(DIGEST_LEN);
    digest
}

fn is_path_component(value: &str) -> bool {
    if value.is_empty() || value.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn ensure_path_component(name: &str, value: &str) -> Result<(), LogsApiError> {
    if is_path_component(value) {
        Ok(())
    } else {
        Err(LogsApiError::BadRequest(format!(
            "Invalid {name} parameter: {value}"
        )))
    }
}
