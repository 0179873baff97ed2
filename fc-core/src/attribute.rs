//! Raw sysfs-style attribute access
//!
//! Attribute files hold a single scalar. Reads infer the scalar type the same
//! way for hardware attributes and for preferences element text, so both
//! share [`Scalar`].
//!
//! A read never fails loudly: a missing, unreadable or non-file path yields
//! `None` ("unavailable") and the caller picks the default it wants.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::trace;

/// A scalar value with inferred type
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl Scalar {
    /// Infer a scalar from text: integer, then float, then the
    /// case-insensitive literals `true`/`false`, else the raw string.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Scalar::Empty;
        }
        let trimmed = text.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Scalar::Int(v);
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Scalar::Float(v);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            Scalar::Bool(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Scalar::Bool(false)
        } else {
            Scalar::Text(text.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            Scalar::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    /// Nonzero number, `true`, or non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Int(v) => *v != 0,
            Scalar::Float(v) => *v != 0.0,
            Scalar::Bool(v) => *v,
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Empty => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(true) => f.write_str("true"),
            Scalar::Bool(false) => f.write_str("false"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Empty => Ok(()),
        }
    }
}

/// Read an attribute file and infer its value.
///
/// Surrounding newlines are stripped before inference.
pub fn read_attribute(path: &Path) -> Option<Scalar> {
    match fs::read_to_string(path) {
        Ok(raw) => Some(Scalar::parse(raw.trim_matches('\n'))),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "attribute unavailable");
            None
        }
    }
}

/// Read an attribute as text, empty when unavailable.
pub fn read_text(path: &Path) -> String {
    read_attribute(path).map(|v| v.to_string()).unwrap_or_default()
}
