//! Lavendeux Core - Fundamental types
//!
//! This crate provides the types exchanged between a Lavendeux host and a
//! native extension:
//! - `TaggedValue`: the host's single-tag wire representation
//! - `Native`: unwrapped values as callbacks see them
//! - `ArgType` / `ValueType`: declared and carried types
//! - `codec`: unwrap, coerce and wrap between the two sides
//! - `BindingError`: everything that can fail at the boundary

pub mod codec;
mod error;
mod native;
mod types;
mod value;

pub use error::{codes, BindingError, CallbackError, Result};
pub use native::{float_to_i64, parse_number, Native, State};
pub use types::{ArgType, ValueType};
pub use value::TaggedValue;

/// Host-side state mapping: name to tagged value
pub type WireState = indexmap::IndexMap<String, TaggedValue>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::codec;
    pub use crate::error::codes;
    pub use crate::{ArgType, BindingError, CallbackError, Native, State, TaggedValue, ValueType, WireState};
}

#[cfg(test)]
mod tests {
    use super::*;

    mod example_values {
        use super::*;

        #[test]
        fn test_sum_of_two_integers_wraps_as_integer() {
            let a = codec::coerce(codec::unwrap(&TaggedValue::Integer(2)), ArgType::Numeric);
            let b = codec::coerce(codec::unwrap(&TaggedValue::Integer(3)), ArgType::Numeric);
            let sum = a.as_f64().unwrap() + b.as_f64().unwrap();
            assert_eq!(codec::wrap(Native::Float(sum), ArgType::Any), TaggedValue::Integer(5));
        }

        #[test]
        fn test_state_round_trip_through_wire() {
            let mut state = State::new();
            state.insert("counter".to_string(), Native::Int(2));
            state.insert("names".to_string(), Native::from(vec!["a", "b"]));

            let wire: WireState = state
                .iter()
                .map(|(k, v)| (k.clone(), codec::wrap(v.clone(), ArgType::Any)))
                .collect();
            let back: State = wire.iter().map(|(k, v)| (k.clone(), codec::unwrap(v))).collect();
            assert_eq!(back, state);
        }
    }
}
