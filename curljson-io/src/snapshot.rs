//! Single-file document snapshots
//!
//! A snapshot is the compact JSON encoding of a fetched document. Freshness
//! comes from the file's modification time; the file is always replaced as a
//! whole through a temporary sibling and a rename.

use curljson_format::{CurlJsonError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Snapshot file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Snapshot stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode `document` and replace the snapshot file with it.
    ///
    /// Returns the number of bytes written.
    pub fn save(&self, document: &Value) -> Result<usize> {
        let bytes = serde_json::to_vec(document).map_err(CurlJsonError::Encode)?;
        let temp_path = self.temp_path();

        let written =
            fs::write(&temp_path, &bytes).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(source) = written {
            // A partial temp file is never left behind.
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_error(source));
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "data saved to file");
        Ok(bytes.len())
    }

    /// Modification time, or `None` when the filesystem cannot tell or
    /// reports a time at or before the epoch.
    pub fn modified(&self) -> Result<Option<SystemTime>> {
        let metadata = fs::metadata(&self.path).map_err(|source| self.read_error(source))?;
        Ok(metadata.modified().ok().filter(|t| *t > UNIX_EPOCH))
    }

    /// Fail with `Stale` when the file is older than `max_age` at `now`.
    ///
    /// Ages are compared in whole seconds and only an age strictly greater
    /// than `max_age` fails. An unknown or future modification time passes.
    pub fn check_age(&self, max_age: Duration, now: SystemTime) -> Result<()> {
        let Some(modified) = self.modified()? else {
            debug!(path = %self.path.display(), "file time unknown, age not checked");
            return Ok(());
        };
        let Ok(age) = now.duration_since(modified) else {
            debug!(path = %self.path.display(), "file time is in the future");
            return Ok(());
        };

        debug!(
            file_time = unix_secs(modified),
            current_time = unix_secs(now),
            age_secs = age.as_secs(),
            "snapshot age"
        );

        if age.as_secs() > max_age.as_secs() {
            return Err(CurlJsonError::Stale {
                path: self.path.clone(),
                age_secs: age.as_secs(),
                max_age_secs: max_age.as_secs(),
            });
        }
        Ok(())
    }

    /// Raw snapshot bytes
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|source| self.read_error(source))
    }

    /// Decode snapshot bytes
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes).map_err(|source| CurlJsonError::Decode {
            context: format!("snapshot {}", self.path.display()),
            source,
        })
    }

    /// Read and decode the snapshot
    pub fn load(&self) -> Result<Value> {
        let bytes = self.read_bytes()?;
        self.decode(&bytes)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    fn read_error(&self, source: std::io::Error) -> CurlJsonError {
        CurlJsonError::FileUnavailable {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: std::io::Error) -> CurlJsonError {
        CurlJsonError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
