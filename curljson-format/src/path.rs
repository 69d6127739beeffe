//! Key paths and their textual syntax
//!
//! A key path is written as dot-separated fields, CSV style:
//!
//! - `hits.hits` → `[Key("hits"), Key("hits")]`
//! - `"mysite.com".requests` → a quoted field may contain dots
//! - `"say ""hi"""` → a doubled quote inside quotes is a literal quote
//! - `data..name` → an unquoted empty field is [`Segment::First`]
//! - `""` → a quoted empty field is the literal empty key
//!
//! The empty string is the identity path.

use crate::error::{CurlJsonError, Result};
use crate::limits::Limits;
use std::fmt;
use std::str::FromStr;

/// One step of a key path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// First key of an object or first element of an array
    First,
    /// Object key, or decimal index into an array
    Key(String),
}

impl Segment {
    /// Named key, if this is not the first-element shorthand
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::First => None,
            Segment::Key(key) => Some(key),
        }
    }
}

/// Ordered sequence of segments; empty means the root itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathSpec {
    segments: Vec<Segment>,
}

impl PathSpec {
    /// The identity path
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from already-parsed segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Parse path text with default limits
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_limits(text, &Limits::default())
    }

    /// Parse path text, enforcing length and depth limits
    pub fn parse_with_limits(text: &str, limits: &Limits) -> Result<Self> {
        if text.len() > limits.max_path_length {
            return Err(CurlJsonError::InvalidPath {
                path: text.to_string(),
                reason: format!(
                    "length {} exceeds limit {}",
                    text.len(),
                    limits.max_path_length
                ),
            });
        }

        if text.is_empty() {
            return Ok(Self::root());
        }

        let segments = split_fields(text)?;

        if segments.len() > limits.max_path_segments {
            return Err(CurlJsonError::InvalidPath {
                path: text.to_string(),
                reason: format!(
                    "{} segments exceeds limit {}",
                    segments.len(),
                    limits.max_path_segments
                ),
            });
        }

        Ok(Self { segments })
    }

    /// Segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the identity path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last named segment, skipping trailing first-element shorthands
    pub fn last_key(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(Segment::as_key)
    }
}

impl FromStr for PathSpec {
    type Err = CurlJsonError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PathSpec {
    /// Renders `"a".."b"`: keys quoted, first-element shorthand left empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            if let Segment::Key(key) = segment {
                write!(f, "\"{}\"", key.replace('"', "\"\""))?;
            }
        }
        Ok(())
    }
}

fn split_fields(text: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        let mut field = String::new();
        let mut quoted = false;

        if chars.peek() == Some(&'"') {
            chars.next();
            quoted = true;
            let mut closed = false;
            while let Some(ch) = chars.next() {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        closed = true;
                        break;
                    }
                } else {
                    field.push(ch);
                }
            }
            if !closed {
                return Err(CurlJsonError::InvalidPath {
                    path: text.to_string(),
                    reason: "unterminated quote".to_string(),
                });
            }
        }

        // Anything after a closing quote up to the next dot is kept verbatim.
        let mut at_separator = false;
        for ch in chars.by_ref() {
            if ch == '.' {
                at_separator = true;
                break;
            }
            field.push(ch);
        }

        segments.push(if field.is_empty() && !quoted {
            Segment::First
        } else {
            Segment::Key(field)
        });

        if !at_separator {
            break;
        }
    }

    Ok(segments)
}
