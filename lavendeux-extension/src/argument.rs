//! Argument specifications

use lavendeux_core::{codec, ArgType, Native, TaggedValue};
use serde::Serialize;

/// Declared type and optionality of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgumentSpec {
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    pub optional: bool,
}

impl ArgumentSpec {
    pub const fn new(arg_type: ArgType, optional: bool) -> Self {
        Self { arg_type, optional }
    }

    pub const fn required(arg_type: ArgType) -> Self {
        Self::new(arg_type, false)
    }

    pub const fn optional(arg_type: ArgType) -> Self {
        Self::new(arg_type, true)
    }

    /// Numeric parameters only accept Integer or Float tags. Every other
    /// declared type accepts anything and relies on coercion in `unwrap`.
    pub fn validate(&self, value: &TaggedValue) -> bool {
        if self.arg_type.is_numeric() {
            value.type_of().is_numeric()
        } else {
            true
        }
    }

    /// Strip tags, then coerce to the declared type
    pub fn unwrap(&self, value: &TaggedValue) -> Native {
        codec::coerce(codec::unwrap(value), self.arg_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap() {
        let argument = ArgumentSpec::required(ArgType::Integer);
        assert_eq!(argument.unwrap(&TaggedValue::Float(5.5)), Native::Int(5));

        let argument = ArgumentSpec::required(ArgType::String);
        assert_eq!(argument.unwrap(&TaggedValue::Float(5.5)), Native::from("5.5"));
    }

    #[test]
    fn test_validate() {
        let argument = ArgumentSpec::required(ArgType::Integer);
        assert!(argument.validate(&TaggedValue::Float(5.5)));
        assert!(argument.validate(&TaggedValue::Integer(5)));
        assert!(!argument.validate(&TaggedValue::from("5.5")));

        let argument = ArgumentSpec::required(ArgType::Numeric);
        assert!(!argument.validate(&TaggedValue::Boolean(true)));
        assert!(!argument.validate(&TaggedValue::Array(vec![TaggedValue::Integer(1)])));

        let argument = ArgumentSpec::required(ArgType::String);
        assert!(argument.validate(&TaggedValue::Float(5.5)));
        assert!(argument.validate(&TaggedValue::Boolean(false)));

        let argument = ArgumentSpec::optional(ArgType::Any);
        assert!(argument.validate(&TaggedValue::Float(5.5)));
    }

    #[test]
    fn test_serializes_with_type_key() {
        let json = serde_json::to_value(ArgumentSpec::optional(ArgType::Numeric)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Numeric", "optional": true}));
    }
}
