//! Value codec
//!
//! Moves values across the host boundary:
//! - `unwrap`: tagged value -> native value
//! - `coerce`: native value -> native value of a declared type (total)
//! - `wrap`: native value -> tagged value, after coercion
//!
//! Coercion never fails. Ill-typed inputs degrade (a non-numeric string
//! coerced to Integer is NaN), they do not raise.

use crate::native::float_to_i64;
use crate::{ArgType, Native, TaggedValue, ValueType};
use indexmap::IndexMap;

/// Tag of a raw wire value, or `None` when it does not carry exactly one
/// known tag.
pub fn type_of_wire(json: &serde_json::Value) -> Option<ValueType> {
    match json {
        serde_json::Value::Object(map) if map.len() == 1 => {
            map.keys().next().and_then(|k| ValueType::from_name(k))
        }
        _ => None,
    }
}

/// Strip tags recursively.
///
/// Object pairs become a native mapping. Keys that were arrays or objects
/// are collapsed to their canonical JSON text; scalar keys use their string
/// form. A repeated key keeps its first position and its last value.
pub fn unwrap(value: &TaggedValue) -> Native {
    match value {
        TaggedValue::Integer(n) => Native::Int(*n),
        TaggedValue::Float(f) => Native::Float(*f),
        TaggedValue::String(s) => Native::Str(s.clone()),
        TaggedValue::Boolean(b) => Native::Bool(*b),
        TaggedValue::Array(items) => Native::Array(items.iter().map(unwrap).collect()),
        TaggedValue::Object(pairs) => {
            let mut map = IndexMap::with_capacity(pairs.len());
            for (k, v) in pairs {
                let key = unwrap(k);
                let key = if k.is_composite() {
                    key.canonical_json()
                } else {
                    key.to_string()
                };
                map.insert(key, unwrap(v));
            }
            Native::Object(map)
        }
    }
}

/// Convert a native value to the representation a declared type requires.
///
/// Array coercion of an object keeps only its values; the keys are dropped
/// and cannot be recovered.
pub fn coerce(value: Native, target: ArgType) -> Native {
    match target {
        ArgType::Integer => match value.to_number() {
            Native::Float(f) => {
                let floored = f.floor();
                match float_to_i64(floored) {
                    Some(n) => Native::Int(n),
                    None => Native::Float(floored),
                }
            }
            n => n,
        },
        ArgType::Float | ArgType::Numeric => value.to_number(),
        ArgType::Boolean => Native::Bool(value.is_truthy()),
        ArgType::String => match value {
            Native::Str(s) => Native::Str(s),
            other => Native::Str(other.to_string()),
        },
        ArgType::Array => match value {
            Native::Array(items) => Native::Array(items),
            Native::Object(map) => Native::Array(map.into_values().collect()),
            scalar => Native::Array(vec![scalar]),
        },
        ArgType::Object => match value {
            Native::Array(items) => Native::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
            ),
            Native::Object(map) => Native::Object(map),
            scalar => {
                let mut map = IndexMap::new();
                map.insert("0".to_string(), scalar);
                Native::Object(map)
            }
        },
        ArgType::Any => value,
    }
}

/// Coerce, then tag by structure.
///
/// Precedence: array, object, string, integral number, other number,
/// boolean. Integral floats are tagged Integer; `Null` becomes
/// `Boolean(false)`. Elements and values are wrapped with `Any`, object keys
/// as strings.
pub fn wrap(value: Native, target: ArgType) -> TaggedValue {
    match coerce(value, target) {
        Native::Array(items) => {
            TaggedValue::Array(items.into_iter().map(|e| wrap(e, ArgType::Any)).collect())
        }
        Native::Object(map) => TaggedValue::Object(
            map.into_iter()
                .map(|(k, v)| (TaggedValue::String(k), wrap(v, ArgType::Any)))
                .collect(),
        ),
        Native::Str(s) => TaggedValue::String(s),
        Native::Int(n) => TaggedValue::Integer(n),
        Native::Float(f) => match float_to_i64(f) {
            Some(n) => TaggedValue::Integer(n),
            None => TaggedValue::Float(f),
        },
        Native::Bool(b) => TaggedValue::Boolean(b),
        Native::Null => TaggedValue::Boolean(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(entries: &[(&str, Native)]) -> Native {
        Native::Object(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    // ========== type_of ==========

    #[test]
    fn test_type_of_wire() {
        assert_eq!(type_of_wire(&json!({"Integer": 1})), Some(ValueType::Integer));
        assert_eq!(type_of_wire(&json!({"Object": []})), Some(ValueType::Object));
        assert_eq!(type_of_wire(&json!({})), None);
        assert_eq!(type_of_wire(&json!({"Integer": 1, "Float": 2.0})), None);
        assert_eq!(type_of_wire(&json!([1])), None);
    }

    // ========== unwrap ==========

    #[test]
    fn test_unwrap_scalars() {
        assert_eq!(unwrap(&TaggedValue::Integer(3)), Native::Int(3));
        assert_eq!(unwrap(&TaggedValue::from("x")), Native::from("x"));
        assert_eq!(unwrap(&TaggedValue::Boolean(true)), Native::Bool(true));
    }

    #[test]
    fn test_unwrap_nested_array() {
        let value = TaggedValue::Array(vec![
            TaggedValue::Integer(1),
            TaggedValue::Array(vec![TaggedValue::from("a")]),
        ]);
        assert_eq!(
            unwrap(&value),
            Native::Array(vec![Native::Int(1), Native::Array(vec![Native::from("a")])])
        );
    }

    #[test]
    fn test_unwrap_object_keys() {
        let value = TaggedValue::Object(vec![
            (TaggedValue::from("name"), TaggedValue::from("x")),
            (TaggedValue::Integer(1), TaggedValue::Boolean(true)),
            (TaggedValue::Float(2.5), TaggedValue::Integer(0)),
            (
                TaggedValue::Array(vec![TaggedValue::Integer(1), TaggedValue::Integer(2)]),
                TaggedValue::Integer(3),
            ),
            (
                TaggedValue::Object(vec![(TaggedValue::from("k"), TaggedValue::from("v"))]),
                TaggedValue::Integer(4),
            ),
        ]);
        let native = unwrap(&value);
        let keys: Vec<&str> = native.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "1", "2.5", "[1,2]", r#"{"k":"v"}"#]);
    }

    #[test]
    fn test_unwrap_string_key_is_not_quoted() {
        // A string key that looks like JSON stays verbatim
        let value = TaggedValue::Object(vec![(TaggedValue::from("[1,2]"), TaggedValue::Integer(1))]);
        assert_eq!(unwrap(&value), object(&[("[1,2]", Native::Int(1))]));
    }

    #[test]
    fn test_unwrap_duplicate_keys() {
        let value = TaggedValue::Object(vec![
            (TaggedValue::from("a"), TaggedValue::Integer(1)),
            (TaggedValue::from("b"), TaggedValue::Integer(2)),
            (TaggedValue::from("a"), TaggedValue::Integer(3)),
        ]);
        assert_eq!(
            unwrap(&value),
            object(&[("a", Native::Int(3)), ("b", Native::Int(2))])
        );
    }

    // ========== coerce ==========

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce(Native::Float(5.5), ArgType::Integer), Native::Int(5));
        assert_eq!(coerce(Native::Float(-5.5), ArgType::Integer), Native::Int(-6));
        assert_eq!(coerce(Native::from("7.9"), ArgType::Integer), Native::Int(7));
        assert_eq!(coerce(Native::Bool(true), ArgType::Integer), Native::Int(1));
        assert!(matches!(
            coerce(Native::from("abc"), ArgType::Integer),
            Native::Float(f) if f.is_nan()
        ));
        assert_eq!(
            coerce(Native::Float(f64::INFINITY), ArgType::Integer),
            Native::Float(f64::INFINITY)
        );
    }

    #[test]
    fn test_coerce_float_and_numeric() {
        assert_eq!(coerce(Native::from("2.25"), ArgType::Float), Native::Float(2.25));
        assert_eq!(coerce(Native::Int(2), ArgType::Numeric), Native::Int(2));
        assert!(matches!(coerce(Native::from("x"), ArgType::Numeric), Native::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(coerce(Native::Int(0), ArgType::Boolean), Native::Bool(false));
        assert_eq!(coerce(Native::from("no"), ArgType::Boolean), Native::Bool(true));
        assert_eq!(coerce(Native::Array(vec![]), ArgType::Boolean), Native::Bool(true));
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce(Native::Float(5.5), ArgType::String), Native::from("5.5"));
        assert_eq!(coerce(Native::Bool(false), ArgType::String), Native::from("false"));
        assert_eq!(coerce(Native::from(vec![1, 2]), ArgType::String), Native::from("[1,2]"));
        assert_eq!(
            coerce(object(&[("a", Native::Int(1))]), ArgType::String),
            Native::from(r#"{"a":1}"#)
        );
    }

    #[test]
    fn test_coerce_array() {
        assert_eq!(coerce(Native::Int(1), ArgType::Array), Native::from(vec![1]));
        assert_eq!(
            coerce(object(&[("a", Native::Int(1)), ("b", Native::Int(2))]), ArgType::Array),
            Native::from(vec![1, 2])
        );
        assert_eq!(coerce(Native::from(vec![3]), ArgType::Array), Native::from(vec![3]));
    }

    #[test]
    fn test_coerce_object() {
        assert_eq!(
            coerce(Native::from(vec!["x", "y"]), ArgType::Object),
            object(&[("0", Native::from("x")), ("1", Native::from("y"))])
        );
        assert_eq!(coerce(Native::Bool(true), ArgType::Object), object(&[("0", Native::Bool(true))]));
    }

    #[test]
    fn test_coerce_any_passes_through() {
        assert_eq!(coerce(Native::from("5"), ArgType::Any), Native::from("5"));
        assert_eq!(coerce(Native::Null, ArgType::Any), Native::Null);
    }

    // ========== wrap ==========

    #[test]
    fn test_wrap_precedence() {
        assert_eq!(
            wrap(Native::from(vec![1, 2, 3]), ArgType::Any),
            TaggedValue::Array(vec![
                TaggedValue::Integer(1),
                TaggedValue::Integer(2),
                TaggedValue::Integer(3)
            ])
        );
        assert_eq!(wrap(Native::Float(5.0), ArgType::Any), TaggedValue::Integer(5));
        assert_eq!(wrap(Native::Float(5.5), ArgType::Any), TaggedValue::Float(5.5));
        assert_eq!(wrap(Native::from("5"), ArgType::Any), TaggedValue::from("5"));
        assert_eq!(wrap(Native::Null, ArgType::Any), TaggedValue::Boolean(false));
    }

    #[test]
    fn test_wrap_coerces_first() {
        assert_eq!(wrap(Native::Float(2.7), ArgType::Integer), TaggedValue::Integer(2));
        assert_eq!(wrap(Native::Int(2), ArgType::String), TaggedValue::from("2"));
        assert_eq!(
            wrap(Native::Int(2), ArgType::Object),
            TaggedValue::Object(vec![(TaggedValue::from("0"), TaggedValue::Integer(2))])
        );
        // Array coercion of an object stays an array
        assert_eq!(
            wrap(object(&[("a", Native::Float(0.5))]), ArgType::Array),
            TaggedValue::Array(vec![TaggedValue::Float(0.5)])
        );
    }

    #[test]
    fn test_wrap_object_pairs_keep_order() {
        let value = object(&[("b", Native::Int(1)), ("a", Native::Bool(true))]);
        assert_eq!(
            wrap(value, ArgType::Any),
            TaggedValue::Object(vec![
                (TaggedValue::from("b"), TaggedValue::Integer(1)),
                (TaggedValue::from("a"), TaggedValue::Boolean(true)),
            ])
        );
    }

    #[test]
    fn test_wrap_nan() {
        assert!(matches!(wrap(Native::from("x"), ArgType::Integer), TaggedValue::Float(f) if f.is_nan()));
    }
}
