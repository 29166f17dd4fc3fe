//! Tagged values
//!
//! The host exchanges values as single-entry mappings from a type tag to a
//! payload: `{"Integer": 5}`, `{"Array": [...]}`. Objects are an ordered list
//! of `[key, value]` pairs because keys may themselves be arrays or objects.
//! Serde's externally tagged enum form is exactly that wire format.

use crate::codec;
use crate::{BindingError, ValueType};
use serde::{Deserialize, Serialize};

/// Value exchanged with the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaggedValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Array(Vec<TaggedValue>),
    Object(Vec<(TaggedValue, TaggedValue)>),
}

impl TaggedValue {
    /// Tag carried by this value
    pub fn type_of(&self) -> ValueType {
        match self {
            TaggedValue::Integer(_) => ValueType::Integer,
            TaggedValue::Float(_) => ValueType::Float,
            TaggedValue::String(_) => ValueType::String,
            TaggedValue::Boolean(_) => ValueType::Boolean,
            TaggedValue::Array(_) => ValueType::Array,
            TaggedValue::Object(_) => ValueType::Object,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.type_of().is_composite()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TaggedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Decode one value from its JSON wire form
    pub fn from_wire(json: &serde_json::Value) -> Result<Self, BindingError> {
        if codec::type_of_wire(json).is_none() {
            return Err(BindingError::decode(match json {
                serde_json::Value::Object(map) if map.is_empty() => "value has no type tag".to_string(),
                serde_json::Value::Object(map) => format!(
                    "expected exactly one known type tag, found {:?}",
                    map.keys().collect::<Vec<_>>()
                ),
                other => format!("expected a tagged mapping, found {}", other),
            }));
        }
        serde_json::from_value(json.clone()).map_err(|e| BindingError::decode(e.to_string()))
    }

    /// Encode to the JSON wire form
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<i64> for TaggedValue {
    fn from(n: i64) -> Self {
        TaggedValue::Integer(n)
    }
}

impl From<f64> for TaggedValue {
    fn from(n: f64) -> Self {
        TaggedValue::Float(n)
    }
}

impl From<&str> for TaggedValue {
    fn from(s: &str) -> Self {
        TaggedValue::String(s.to_string())
    }
}

impl From<String> for TaggedValue {
    fn from(s: String) -> Self {
        TaggedValue::String(s)
    }
}

impl From<bool> for TaggedValue {
    fn from(b: bool) -> Self {
        TaggedValue::Boolean(b)
    }
}
