//! Error types for curljson

use std::path::PathBuf;
use thiserror::Error;

/// Coarse error classification, stable across releases.
///
/// The CLI boundary uses this to map failures consistently; log lines carry
/// [`ErrorKind::as_str`] as a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Fetch or snapshot read failed.
    SourceUnavailable,
    /// Snapshot is older than the allowed age.
    Stale,
    /// Response or snapshot payload is not valid JSON.
    DecodeFailure,
    /// Document is empty or null.
    Empty,
    /// Primary or macro key path did not resolve.
    PathNotFound,
    /// Sum hit a value that is neither numeric nor null.
    NotNumeric,
    /// Feature selector is not recognized.
    UnknownFeature,
    /// Snapshot could not be written.
    WriteFailure,
    /// Plain-value output resolved to an array or object.
    NotScalar,
    /// Key path text could not be parsed.
    InvalidPath,
}

impl ErrorKind {
    /// Tag used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SourceUnavailable => "source_unavailable",
            ErrorKind::Stale => "stale",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::Empty => "empty",
            ErrorKind::PathNotFound => "path_not_found",
            ErrorKind::NotNumeric => "not_numeric",
            ErrorKind::UnknownFeature => "unknown_feature",
            ErrorKind::WriteFailure => "write_failure",
            ErrorKind::NotScalar => "not_scalar",
            ErrorKind::InvalidPath => "invalid_path",
        }
    }
}

/// curljson error types
#[derive(Debug, Error)]
pub enum CurlJsonError {
    /// Snapshot file is missing or unreadable.
    #[error("File is not available: {}: {source}", path.display())]
    FileUnavailable {
        /// Snapshot path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// HTTP transport failed before a response arrived.
    #[error("The error occured while request executes: {0}")]
    Transport(String),
    /// Server answered with something other than 200.
    #[error("Response code is not 200: {0}")]
    HttpStatus(u16),
    /// Document exceeds the configured size limit.
    #[error("Document too large: {size} bytes (limit: {limit} bytes)")]
    DocumentTooLarge {
        /// Observed size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },
    /// Snapshot is older than the allowed age.
    #[error("File is too old: {} (age {age_secs}s, max {max_age_secs}s)", path.display())]
    Stale {
        /// Snapshot path
        path: PathBuf,
        /// Observed age in seconds
        age_secs: u64,
        /// Allowed age in seconds
        max_age_secs: u64,
    },
    /// Payload could not be decoded as JSON.
    #[error("The error occured while JSON decoding {context}: {source}")]
    Decode {
        /// What was being decoded
        context: String,
        /// Underlying serde_json error
        source: serde_json::Error,
    },
    /// Document is empty or null.
    #[error("Empty json")]
    Empty,
    /// Key path did not resolve.
    #[error("Can not find key path in JSON: {path}")]
    PathNotFound {
        /// Display form of the key path, e.g. `"hits"."hits"`
        path: String,
    },
    /// Sum hit a value that is neither numeric nor null.
    #[error("Not a number value: {value}")]
    NotNumeric {
        /// Compact JSON rendering of the offending value
        value: String,
    },
    /// Feature selector is not recognized.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
    /// Snapshot could not be written.
    #[error("An error occured while save data to file: {}: {source}", path.display())]
    Write {
        /// Snapshot path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// Serializing the snapshot payload failed.
    #[error("An error occured while encoding snapshot: {0}")]
    Encode(serde_json::Error),
    /// Plain-value output resolved to a container.
    #[error("Result value is {found_type}")]
    NotScalar {
        /// `array` or `object`
        found_type: &'static str,
    },
    /// Save mode was requested for a snapshot source.
    #[error("Output to file requires a live source: {}", path.display())]
    SaveWithoutLiveSource {
        /// Requested snapshot path
        path: PathBuf,
    },
    /// Key path text is malformed.
    #[error("Invalid key path '{path}': {reason}")]
    InvalidPath {
        /// Original key path text
        path: String,
        /// Why it was rejected
        reason: String,
    },
}

impl CurlJsonError {
    /// Taxonomy tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CurlJsonError::FileUnavailable { .. }
            | CurlJsonError::Transport(_)
            | CurlJsonError::HttpStatus(_)
            | CurlJsonError::DocumentTooLarge { .. } => ErrorKind::SourceUnavailable,
            CurlJsonError::Stale { .. } => ErrorKind::Stale,
            CurlJsonError::Decode { .. } => ErrorKind::DecodeFailure,
            CurlJsonError::Empty => ErrorKind::Empty,
            CurlJsonError::PathNotFound { .. } => ErrorKind::PathNotFound,
            CurlJsonError::NotNumeric { .. } => ErrorKind::NotNumeric,
            CurlJsonError::UnknownFeature(_) => ErrorKind::UnknownFeature,
            CurlJsonError::Write { .. }
            | CurlJsonError::Encode(_)
            | CurlJsonError::SaveWithoutLiveSource { .. } => ErrorKind::WriteFailure,
            CurlJsonError::NotScalar { .. } => ErrorKind::NotScalar,
            CurlJsonError::InvalidPath { .. } => ErrorKind::InvalidPath,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CurlJsonError>;
