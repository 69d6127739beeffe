//! curljson features - Output shaping for resolved JSON values
//!
//! A feature reinterprets the value found at the primary key path as a
//! collection of records and reduces it to one output:
//!
//! - `zabbix-lld`: a low-level discovery document `{"data": [...]}`
//! - `sum`: the numeric total of the records, or of macro values per record
//!
//! Macros are secondary key paths resolved against every record.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod discovery;
pub mod macros;
pub mod records;
pub mod sum;

// Re-export commonly used types
pub use curljson_format::{CurlJsonError, ErrorKind, PathSpec, Result};

pub use discovery::discover;
pub use macros::{Macro, MacroLabel};
pub use records::{records, RecordKey};
pub use sum::{sum, Sum};

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Feature selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Zabbix low-level discovery list
    Discovery,
    /// Sum of record values
    Sum,
}

impl Feature {
    /// Selector as accepted on the command line
    pub fn selector(&self) -> &'static str {
        match self {
            Feature::Discovery => "zabbix-lld",
            Feature::Sum => "sum",
        }
    }

    /// Every supported feature
    pub fn all() -> [Feature; 2] {
        [Feature::Discovery, Feature::Sum]
    }
}

impl FromStr for Feature {
    type Err = CurlJsonError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::all()
            .into_iter()
            .find(|feature| feature.selector() == s)
            .ok_or_else(|| CurlJsonError::UnknownFeature(s.to_string()))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Result of applying a feature
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutput {
    /// `{"data": [...]}` discovery document
    Discovery(Value),
    /// Numeric total
    Sum(Sum),
}

impl FeatureOutput {
    /// Number of records the feature consumed
    pub fn record_count(&self) -> Option<usize> {
        match self {
            FeatureOutput::Discovery(doc) => doc
                .get("data")
                .and_then(Value::as_array)
                .map(|items| items.len()),
            FeatureOutput::Sum(_) => None,
        }
    }
}

/// Apply `feature` to `value` with the given macros
pub fn apply(feature: Feature, value: &Value, macros: &[Macro]) -> Result<FeatureOutput> {
    match feature {
        Feature::Discovery => discover(value, macros).map(FeatureOutput::Discovery),
        Feature::Sum => sum(value, macros).map(FeatureOutput::Sum),
    }
}
