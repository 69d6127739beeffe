//! Macros: per-record key paths with discovery labels

use curljson_format::{Limits, PathSpec, Result};
use std::fmt;

/// Discovery label of a macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroLabel {
    /// `{#ID}`: the record's own key or index
    Id,
    /// `{#NAME}` style label with the uppercased name inside
    Named(String),
}

impl fmt::Display for MacroLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroLabel::Id => f.write_str("{#ID}"),
            MacroLabel::Named(name) => write!(f, "{{#{}}}", name),
        }
    }
}

/// A secondary key path applied to every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    path: PathSpec,
    label: MacroLabel,
}

impl Macro {
    /// Build a macro from a parsed path.
    ///
    /// A path with no named segment refers to the record itself and is
    /// labeled `{#ID}`; otherwise the label is the last named segment,
    /// uppercased.
    pub fn new(path: PathSpec) -> Self {
        let label = match path.last_key() {
            Some(key) => MacroLabel::Named(key.to_uppercase()),
            None => MacroLabel::Id,
        };
        Self { path, label }
    }

    /// Parse macro text with default limits
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_limits(text, &Limits::default())
    }

    /// Parse macro text, enforcing path limits
    pub fn parse_with_limits(text: &str, limits: &Limits) -> Result<Self> {
        PathSpec::parse_with_limits(text, limits).map(Self::new)
    }

    /// Key path resolved against each record
    pub fn path(&self) -> &PathSpec {
        &self.path
    }

    /// Discovery label
    pub fn label(&self) -> &MacroLabel {
        &self.label
    }
}
