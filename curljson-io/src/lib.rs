//! curljson I/O - Acquisition and the end-to-end extraction run
//!
//! This crate ties the primitives together:
//!
//! - Snapshot files with a freshness bound
//! - Live fetching behind the [`Fetcher`] trait
//! - [`run`]: acquire, resolve the primary key, shape the output

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fetch;
pub mod snapshot;
pub mod source;

// Re-export commonly used types
pub use curljson_feature::{Feature, FeatureOutput, Macro, Sum};
pub use curljson_format::{CurlJsonError, ErrorKind, Limits, PathSpec, Result};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{encode_default_vhost, Credentials, FetchRequest, Fetcher, StaticFetcher};
pub use snapshot::SnapshotStore;
pub use source::{CachedFile, Loaded, SourceKind, SourceSpec};

use curljson_format::{resolve_present, type_name};
use serde_json::{Number, Value};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

/// What to do with the resolved value
#[derive(Debug, Clone)]
pub enum Mode {
    /// Emit the value itself; it must be a scalar
    Value,
    /// Shape the value with a feature
    Feature {
        /// Selected feature
        feature: Feature,
        /// Per-record key paths
        macros: Vec<Macro>,
    },
    /// Persist the fetched document as a snapshot
    Save(PathBuf),
}

/// One extraction run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Document source
    pub source: SourceSpec,
    /// Primary key path
    pub key: PathSpec,
    /// Output mode
    pub mode: Mode,
    /// Path and document limits
    pub limits: Limits,
}

impl RunRequest {
    /// Emit the value at `key` from `source`
    pub fn new(source: SourceSpec, key: PathSpec) -> Self {
        Self {
            source,
            key,
            mode: Mode::Value,
            limits: Limits::default(),
        }
    }

    /// Use `mode` instead of plain value output
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Limits the run applies, capped at [`Limits::hard_maximums`]
    pub fn effective_limits(&self) -> Limits {
        self.limits.clamped()
    }
}

/// Printable primary-key result
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text, printed verbatim
    String(String),
    /// JSON number
    Number(Number),
    /// Printed as `1` or `0`
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", u8::from(*b)),
        }
    }
}

impl TryFrom<&Value> for Scalar {
    type Error = CurlJsonError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Scalar::String(s.clone())),
            Value::Number(n) => Ok(Scalar::Number(n.clone())),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            other => Err(CurlJsonError::NotScalar {
                found_type: type_name(other),
            }),
        }
    }
}

/// Result of a run
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Plain value
    Scalar(Scalar),
    /// `{"data": [...]}` discovery document
    Discovery(Value),
    /// Numeric total
    Sum(Sum),
    /// Snapshot written
    Saved {
        /// Snapshot path
        path: PathBuf,
        /// Bytes written
        bytes: usize,
    },
}

impl Output {
    /// Text for stdout, or `None` when the run prints nothing
    pub fn render(&self) -> Option<String> {
        match self {
            Output::Scalar(scalar) => Some(scalar.to_string()),
            Output::Discovery(doc) => Some(doc.to_string()),
            Output::Sum(total) => Some(total.to_string()),
            Output::Saved { .. } => None,
        }
    }
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Source kind
    pub source: SourceKind,
    /// Raw document size
    pub document_bytes: usize,
    /// Records consumed by a feature
    pub records: Option<usize>,
    /// Wall-clock duration
    pub elapsed: Duration,
}

/// Output plus metrics
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Result
    pub output: Output,
    /// Metrics
    pub metrics: RunMetrics,
}

/// Execute `request` against the current time
pub fn run(request: &RunRequest, fetcher: &dyn Fetcher) -> Result<RunSummary> {
    run_at(request, fetcher, SystemTime::now())
}

/// Execute `request`, using `now` for the snapshot age check
pub fn run_at(request: &RunRequest, fetcher: &dyn Fetcher, now: SystemTime) -> Result<RunSummary> {
    let start = Instant::now();
    if let (Mode::Save(path), SourceSpec::Cached(_)) = (&request.mode, &request.source) {
        return Err(CurlJsonError::SaveWithoutLiveSource { path: path.clone() });
    }

    let limits = request.effective_limits();
    let loaded = source::load(&request.source, fetcher, &limits, now)?;

    let keyed = resolve_present(&loaded.document, &request.key).map_err(|_| {
        CurlJsonError::PathNotFound {
            path: request.key.to_string(),
        }
    })?;
    if !request.key.is_empty() {
        debug!(value = %keyed, "keyed json");
    }

    let mut records = None;
    let output = match &request.mode {
        Mode::Value => Output::Scalar(Scalar::try_from(keyed)?),
        Mode::Feature { feature, macros } => {
            debug!(%feature, macros = macros.len(), "feature mode");
            let shaped = curljson_feature::apply(*feature, keyed, macros)?;
            records = shaped.record_count();
            match shaped {
                FeatureOutput::Discovery(doc) => Output::Discovery(doc),
                FeatureOutput::Sum(total) => Output::Sum(total),
            }
        }
        Mode::Save(path) => {
            let bytes = SnapshotStore::new(path).save(&loaded.document)?;
            Output::Saved {
                path: path.clone(),
                bytes,
            }
        }
    };

    Ok(RunSummary {
        output,
        metrics: RunMetrics {
            source: loaded.kind,
            document_bytes: loaded.raw_bytes,
            records,
            elapsed: start.elapsed(),
        },
    })
}
