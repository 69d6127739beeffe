//! Numeric aggregation over records

use crate::macros::Macro;
use crate::records::records;
use curljson_format::{resolve, CurlJsonError, Result};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Running total.
///
/// Stays integral while every addend is an integer and nothing overflows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sum {
    /// Exact integer total
    Int(i64),
    /// Floating-point total
    Float(f64),
}

impl Default for Sum {
    fn default() -> Self {
        Sum::Int(0)
    }
}

impl Sum {
    /// Add another number
    pub fn add(self, addend: Sum) -> Sum {
        match (self, addend) {
            (Sum::Int(a), Sum::Int(b)) => match a.checked_add(b) {
                Some(total) => Sum::Int(total),
                None => Sum::Float(a as f64 + b as f64),
            },
            (a, b) => Sum::Float(a.as_f64() + b.as_f64()),
        }
    }

    /// Total as a float
    pub fn as_f64(&self) -> f64 {
        match self {
            Sum::Int(n) => *n as f64,
            Sum::Float(f) => *f,
        }
    }
}

impl fmt::Display for Sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sum::Int(n) => write!(f, "{}", n),
            Sum::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Sum the records of `value`.
///
/// Without macros each record value is an addend; with macros every macro
/// path is resolved against each record and each result is an addend.
/// Numbers and numeric strings add, `null` and unresolved macro paths add
/// nothing, and anything else fails with `NotNumeric`.
pub fn sum(value: &Value, macros: &[Macro]) -> Result<Sum> {
    let mut total = Sum::default();

    for (key, record) in records(value) {
        if macros.is_empty() {
            total = accumulate(total, record)?;
            continue;
        }

        for m in macros {
            match resolve(record, m.path()) {
                Ok(found) => total = accumulate(total, found)?,
                Err(_) => debug!(record = %key, path = %m.path(), "macro path not found, skipped"),
            }
        }
    }

    Ok(total)
}

fn accumulate(total: Sum, value: &Value) -> Result<Sum> {
    if value.is_null() {
        return Ok(total);
    }

    let addend = numeric(value).ok_or_else(|| CurlJsonError::NotNumeric {
        value: value.to_string(),
    })?;
    debug!(%addend, "add to sum");
    Ok(total.add(addend))
}

/// Interpret a JSON value as a number, if it is one or spells one.
pub fn numeric(value: &Value) -> Option<Sum> {
    match value {
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Sum::Int(i),
            None => Sum::Float(n.as_f64()?),
        }),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

/// Decimal numbers with optional sign, fraction, exponent and surrounding
/// whitespace. No `inf`, `nan`, hex, or digit separators.
fn parse_numeric_str(s: &str) -> Option<Sum> {
    let text = s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = pos - int_start;

    let mut frac_digits = 0;
    let mut integral = true;
    if pos < bytes.len() && bytes[pos] == b'.' {
        integral = false;
        pos += 1;
        let frac_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        frac_digits = pos - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        integral = false;
        pos += 1;
        if pos < bytes.len() && matches!(bytes[pos], b'+' | b'-') {
            pos += 1;
        }
        let exp_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == exp_start {
            return None;
        }
    }

    if pos != bytes.len() {
        return None;
    }

    if integral {
        if let Ok(i) = text.parse::<i64>() {
            return Some(Sum::Int(i));
        }
    }
    text.parse::<f64>().ok().map(Sum::Float)
}
