//! Key-path resolution over JSON documents

use crate::path::{PathSpec, Segment};
use serde_json::Value;

/// A key path did not resolve.
///
/// `depth` is the number of segments consumed before the failing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unresolved {
    /// Segments successfully navigated before failure
    pub depth: usize,
}

/// Navigate `root` along `path`.
///
/// The identity path returns `root`. [`Segment::First`] takes the first
/// entry of a non-empty object or array. [`Segment::Key`] looks up an object
/// key, or a canonical decimal index into an array. Anything else is
/// [`Unresolved`].
pub fn resolve<'a>(root: &'a Value, path: &PathSpec) -> Result<&'a Value, Unresolved> {
    let mut current = root;

    for (depth, segment) in path.segments().iter().enumerate() {
        current = step(current, segment).ok_or(Unresolved { depth })?;
    }

    Ok(current)
}

/// Like [`resolve`], but a JSON `null` at the end of the path is also
/// [`Unresolved`].
pub fn resolve_present<'a>(root: &'a Value, path: &PathSpec) -> Result<&'a Value, Unresolved> {
    match resolve(root, path)? {
        Value::Null => Err(Unresolved {
            depth: path.len().saturating_sub(1),
        }),
        value => Ok(value),
    }
}

fn step<'a>(current: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (current, segment) {
        (Value::Object(map), Segment::First) => map.values().next(),
        (Value::Array(arr), Segment::First) => arr.first(),
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Array(arr), Segment::Key(key)) => parse_index(key).and_then(|idx| arr.get(idx)),
        _ => None,
    }
}

/// Accept `0` and digit strings without a leading zero.
fn parse_index(key: &str) -> Option<usize> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}
