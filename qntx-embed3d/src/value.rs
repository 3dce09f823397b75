//! Sample field values and dotted-path lookup.
//!
//! A coloring field such as `ground_truth.label` is resolved one segment at a
//! time through [`FieldAccess`]. Any missing segment, a `null` along the way,
//! or a lookup on something that has no named fields ends the walk with `None`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value stored on a sample or nested inside a label document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FieldValue>),
    Document(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Numeric view used for continuous coloring. Booleans count as 1/0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Named field lookup, one segment at a time.
pub trait FieldAccess {
    /// Look up a directly contained field.
    fn get_field(&self, name: &str) -> Option<&FieldValue>;
}

impl FieldAccess for FieldValue {
    fn get_field(&self, name: &str) -> Option<&FieldValue> {
        match self {
            FieldValue::Document(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl FieldAccess for BTreeMap<String, FieldValue> {
    fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

/// Resolve a dotted path such as `predictions.detections.label` against `root`.
pub fn resolve_path<'a>(root: &'a dyn FieldAccess, path: &str) -> Option<&'a FieldValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut value = non_null(root.get_field(first)?)?;
    for segment in segments {
        value = non_null(value.get_field(segment)?)?;
    }
    Some(value)
}

fn non_null(value: &FieldValue) -> Option<&FieldValue> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Formats a float the way the host's label display does: whole numbers keep
/// a trailing `.0`, and decimal exponents below -4 or from 16 up switch to
/// scientific notation with a signed two-digit exponent (`1e-05`, `1e+16`).
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return write!(f, "nan");
    }
    if value.is_infinite() {
        return write!(f, "{}", if value > 0.0 { "inf" } else { "-inf" });
    }

    // `{:e}` gives the shortest round-trip mantissa, e.g. `1.5e20`
    let scientific = format!("{:e}", value);
    if let Some((mantissa, exp)) = scientific.split_once('e') {
        if let Ok(exp) = exp.parse::<i32>() {
            if value != 0.0 && !(-4..16).contains(&exp) {
                let sign = if exp < 0 { '-' } else { '+' };
                return write!(f, "{}e{}{:02}", mantissa, sign, exp.abs());
            }
        }
    }

    if value.fract() == 0.0 {
        write!(f, "{:.1}", value)
    } else {
        write!(f, "{}", value)
    }
}

fn write_nested(f: &mut fmt::Formatter<'_>, value: &FieldValue) -> fmt::Result {
    match value {
        FieldValue::Str(s) => write!(f, "'{}'", s),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "None"),
            FieldValue::Bool(true) => write!(f, "True"),
            FieldValue::Bool(false) => write!(f, "False"),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write_float(f, *x),
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_nested(f, item)?;
                }
                write!(f, "]")
            }
            FieldValue::Document(fields) => {
                write!(f, "{{")?;
                for (i, (name, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}': ", name)?;
                    write_nested(f, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}
