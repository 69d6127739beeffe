//! Document acquisition: live fetch or snapshot read

use crate::fetch::{FetchRequest, Fetcher};
use crate::snapshot::SnapshotStore;
use curljson_format::{is_empty_document, CurlJsonError, Limits, Result};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Snapshot source with optional freshness bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    /// Snapshot path
    pub path: PathBuf,
    /// Maximum allowed age; `None` skips the check
    pub max_age: Option<Duration>,
}

impl CachedFile {
    /// Snapshot at `path` without an age bound
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: None,
        }
    }

    /// Bound the age in seconds; zero leaves the age unchecked
    pub fn with_max_age_secs(mut self, secs: u64) -> Self {
        self.max_age = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }
}

/// Where the document comes from
#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// HTTP request
    Live(FetchRequest),
    /// Previously saved snapshot
    Cached(CachedFile),
}

/// Which kind of source produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// HTTP request
    Live,
    /// Snapshot file
    Cached,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Live => f.write_str("live"),
            SourceKind::Cached => f.write_str("cached"),
        }
    }
}

impl SourceSpec {
    /// Kind of this source
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceSpec::Live(_) => SourceKind::Live,
            SourceSpec::Cached(_) => SourceKind::Cached,
        }
    }
}

/// A decoded, non-empty document
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    /// The document
    pub document: Value,
    /// Size of the raw payload in bytes
    pub raw_bytes: usize,
    /// Source kind
    pub kind: SourceKind,
}

/// Acquire and decode the document described by `spec`.
///
/// `now` is the reference time for the snapshot age check.
pub fn load(
    spec: &SourceSpec,
    fetcher: &dyn Fetcher,
    limits: &Limits,
    now: SystemTime,
) -> Result<Loaded> {
    let (document, raw_bytes) = match spec {
        SourceSpec::Cached(cached) => load_cached(cached, limits, now)?,
        SourceSpec::Live(request) => load_live(request, fetcher, limits)?,
    };

    debug!(document = %document, "json");
    if is_empty_document(&document) {
        return Err(CurlJsonError::Empty);
    }

    Ok(Loaded {
        document,
        raw_bytes,
        kind: spec.kind(),
    })
}

fn load_cached(cached: &CachedFile, limits: &Limits, now: SystemTime) -> Result<(Value, usize)> {
    let store = SnapshotStore::new(&cached.path);
    debug!(path = %cached.path.display(), "input from file");

    // Readability first, so a missing file reports as unavailable
    // before any age is computed.
    store.modified()?;
    if let Some(max_age) = cached.max_age {
        store.check_age(max_age, now)?;
    }

    let bytes = store.read_bytes()?;
    check_size(bytes.len(), limits)?;
    let document = store.decode(&bytes)?;
    Ok((document, bytes.len()))
}

fn load_live(
    request: &FetchRequest,
    fetcher: &dyn Fetcher,
    limits: &Limits,
) -> Result<(Value, usize)> {
    debug!(
        url = %request.url,
        method = ?request.method(),
        auth = request.usable_credentials().is_some(),
        "input from http"
    );

    let response = fetcher
        .fetch(request)
        .map_err(|e| CurlJsonError::Transport(e.to_string()))?;
    debug!(status = response.status, bytes = response.body.len(), "response received");

    if response.status != 200 {
        return Err(CurlJsonError::HttpStatus(response.status));
    }
    check_size(response.body.len(), limits)?;

    let document = serde_json::from_slice(&response.body).map_err(|source| {
        CurlJsonError::Decode {
            context: "response body".to_string(),
            source,
        }
    })?;
    Ok((document, response.body.len()))
}

fn check_size(size: usize, limits: &Limits) -> Result<()> {
    if size > limits.max_document_bytes {
        return Err(CurlJsonError::DocumentTooLarge {
            size,
            limit: limits.max_document_bytes,
        });
    }
    Ok(())
}
