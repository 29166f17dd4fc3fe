//! Type tags
//!
//! `ValueType` names the tag actually carried by a tagged value.
//! `ArgType` is what a binding declares for a parameter or return value;
//! it adds `Numeric` (Integer or Float) and `Any` on top of the wire tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag carried by a tagged value on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Integer,
    Float,
    String,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    pub const ALL: [ValueType; 6] = [
        ValueType::Integer,
        ValueType::Float,
        ValueType::String,
        ValueType::Boolean,
        ValueType::Array,
        ValueType::Object,
    ];

    /// Wire name of the tag
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Integer => "Integer",
            ValueType::Float => "Float",
            ValueType::String => "String",
            ValueType::Boolean => "Boolean",
            ValueType::Array => "Array",
            ValueType::Object => "Object",
        }
    }

    /// Look a tag up by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }

    pub fn is_composite(self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a parameter or of a return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArgType {
    Integer,
    Float,
    /// Integer or Float
    Numeric,
    String,
    Boolean,
    Array,
    Object,
    /// Matches every tag; values pass through uncoerced
    #[default]
    Any,
}

impl ArgType {
    pub fn name(self) -> &'static str {
        match self {
            ArgType::Integer => "Integer",
            ArgType::Float => "Float",
            ArgType::Numeric => "Numeric",
            ArgType::String => "String",
            ArgType::Boolean => "Boolean",
            ArgType::Array => "Array",
            ArgType::Object => "Object",
            ArgType::Any => "Any",
        }
    }

    /// Integer, Float and Numeric only accept numeric tags
    pub fn is_numeric(self) -> bool {
        matches!(self, ArgType::Integer | ArgType::Float | ArgType::Numeric)
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ValueType> for ArgType {
    fn from(t: ValueType) -> Self {
        match t {
            ValueType::Integer => ArgType::Integer,
            ValueType::Float => ArgType::Float,
            ValueType::String => ArgType::String,
            ValueType::Boolean => ArgType::Boolean,
            ValueType::Array => ArgType::Array,
            ValueType::Object => ArgType::Object,
        }
    }
}
