//! Native values
//!
//! What a callback sees once the tags are stripped. Objects keep insertion
//! order so that a wire object's pair order survives unwrapping.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Persistent state as seen by callbacks
pub type State = IndexMap<String, Native>;

/// Unwrapped value handed to and returned from native callbacks
#[derive(Debug, Clone, Default)]
pub enum Native {
    /// Nothing was returned
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Native>),
    Object(IndexMap<String, Native>),
}

impl Native {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Native::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; floats only when integral
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Native::Int(n) => Some(*n),
            Native::Float(f) => float_to_i64(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Native::Int(n) => Some(*n as f64),
            Native::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Native]> {
        match self {
            Native::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Native>> {
        match self {
            Native::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Native::Int(_) | Native::Float(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Native::Array(_) | Native::Object(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Native::Null => "Null",
            Native::Bool(_) => "Bool",
            Native::Int(_) => "Int",
            Native::Float(_) => "Float",
            Native::Str(_) => "Str",
            Native::Array(_) => "Array",
            Native::Object(_) => "Object",
        }
    }

    // ========== Conversions ==========

    /// Truthiness cast. Arrays and objects are truthy even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Native::Null => false,
            Native::Bool(b) => *b,
            Native::Int(n) => *n != 0,
            Native::Float(f) => *f != 0.0 && !f.is_nan(),
            Native::Str(s) => !s.is_empty(),
            Native::Array(_) | Native::Object(_) => true,
        }
    }

    /// Numeric conversion. Always yields `Int` or `Float`; NaN when the value
    /// has no numeric reading.
    pub fn to_number(&self) -> Native {
        match self {
            Native::Null => Native::Float(f64::NAN),
            Native::Bool(b) => Native::Int(i64::from(*b)),
            Native::Int(n) => Native::Int(*n),
            Native::Float(f) => Native::Float(*f),
            Native::Str(s) => parse_number(s),
            Native::Array(items) => match items.as_slice() {
                [] | [Native::Null] => Native::Int(0),
                [single] if !matches!(single, Native::Object(_) | Native::Bool(_)) => single.to_number(),
                _ => Native::Float(f64::NAN),
            },
            Native::Object(_) => Native::Float(f64::NAN),
        }
    }

    /// Deterministic compact JSON. Keys keep insertion order, integral floats
    /// print as integers and non-finite floats as `null`.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("null"))
    }
}

/// Parse text the way the host's numeric cast does: trimmed, empty is 0,
/// radix prefixes, signed `Infinity`, decimal and exponent forms. Anything
/// else is NaN.
pub fn parse_number(text: &str) -> Native {
    let t = text.trim();
    if t.is_empty() {
        return Native::Int(0);
    }

    match t {
        "Infinity" | "+Infinity" => return Native::Float(f64::INFINITY),
        "-Infinity" => return Native::Float(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match t.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&t[2..], radix);
    }

    if let Ok(n) = t.parse::<i64>() {
        return Native::Int(n);
    }

    // Rust's float parser also takes "inf" and "nan"; the host does not
    let plain = t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    match t.parse::<f64>() {
        Ok(f) if plain => Native::Float(f),
        _ => Native::Float(f64::NAN),
    }
}

/// Unsigned digits after a radix prefix. Too large for i64 keeps going as
/// a float.
fn parse_radix(digits: &str, radix: u32) -> Native {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Native::Float(f64::NAN);
    }
    match i64::from_str_radix(digits, radix) {
        Ok(n) => Native::Int(n),
        Err(_) => Native::Float(digits.chars().fold(0.0, |acc, c| {
            acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
        })),
    }
}

/// Exact integer value of a float, if it has one that fits
pub fn float_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Host number formatting: exponent form from 1e21 up and below 1e-6,
/// with an explicit `+` on positive exponents.
pub(crate) fn format_f64(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let name = if f > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if f != 0.0 && (f.abs() >= 1e21 || f.abs() < 1e-6) {
        let text = format!("{:e}", f);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Native::Null, Native::Null) => true,
            (Native::Bool(a), Native::Bool(b)) => a == b,
            (Native::Int(a), Native::Int(b)) => a == b,
            (Native::Float(a), Native::Float(b)) => a == b,
            (Native::Int(a), Native::Float(b)) => (*a as f64) == *b,
            (Native::Float(a), Native::Int(b)) => *a == (*b as f64),
            (Native::Str(a), Native::Str(b)) => a == b,
            (Native::Array(a), Native::Array(b)) => a == b,
            (Native::Object(a), Native::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// String form: scalars print plainly, composites as canonical JSON
impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Null => f.write_str("null"),
            Native::Bool(b) => write!(f, "{}", b),
            Native::Int(n) => write!(f, "{}", n),
            Native::Float(x) => f.write_str(&format_f64(*x)),
            Native::Str(s) => f.write_str(s),
            Native::Array(_) | Native::Object(_) => f.write_str(&self.canonical_json()),
        }
    }
}

impl Serialize for Native {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Native::Null => serializer.serialize_none(),
            Native::Bool(b) => serializer.serialize_bool(*b),
            Native::Int(n) => serializer.serialize_i64(*n),
            Native::Float(x) => match float_to_i64(*x) {
                Some(n) => serializer.serialize_i64(n),
                None if x.is_finite() => serializer.serialize_f64(*x),
                None => serializer.serialize_none(),
            },
            Native::Str(s) => serializer.serialize_str(s),
            Native::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Native::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

// From implementations for convenience
impl From<()> for Native {
    fn from(_: ()) -> Self {
        Native::Null
    }
}

impl From<bool> for Native {
    fn from(b: bool) -> Self {
        Native::Bool(b)
    }
}

impl From<i64> for Native {
    fn from(n: i64) -> Self {
        Native::Int(n)
    }
}

impl From<i32> for Native {
    fn from(n: i32) -> Self {
        Native::Int(i64::from(n))
    }
}

impl From<u32> for Native {
    fn from(n: u32) -> Self {
        Native::Int(i64::from(n))
    }
}

impl From<f64> for Native {
    fn from(f: f64) -> Self {
        Native::Float(f)
    }
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Native::Str(s.to_string())
    }
}

impl From<String> for Native {
    fn from(s: String) -> Self {
        Native::Str(s)
    }
}

impl<T: Into<Native>> From<Vec<T>> for Native {
    fn from(items: Vec<T>) -> Self {
        Native::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Native>> From<IndexMap<String, T>> for Native {
    fn from(entries: IndexMap<String, T>) -> Self {
        Native::Object(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
