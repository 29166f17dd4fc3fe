//! Binding errors
//!
//! Coercion never fails. Everything that can go wrong at the boundary is a
//! `BindingError`: too few arguments, a non-numeric value for a numeric
//! parameter, a misdeclared parameter list, a failing callback, an unknown
//! registered name, or a malformed wire value.

use crate::{ArgType, ValueType};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const CONFIGURATION: &str = "CONFIGURATION";
    pub const CALLBACK: &str = "CALLBACK";
    pub const UNKNOWN_BINDING: &str = "UNKNOWN_BINDING";
    pub const DECODE: &str = "DECODE";
}

/// Error raised by a native callback
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for binding operations
pub type Result<T> = std::result::Result<T, BindingError>;

#[derive(Debug, Error)]
pub enum BindingError {
    /// Fewer arguments than required parameters
    #[error("Missing a parameter for {function}: expected {expected} arguments, got {got}")]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },

    /// A numeric parameter received a non-numeric tag. `position` is 1-based.
    #[error("Invalid value for parameter {position} of {function}: expected {expected}, got {got}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: ArgType,
        got: ValueType,
    },

    /// A required parameter was appended after an optional one
    #[error("Optional arguments must be the last parameters of {function}")]
    Configuration { function: String },

    /// The native callback itself failed
    #[error("{function} failed: {source}")]
    Callback {
        function: String,
        #[source]
        source: CallbackError,
    },

    #[error("Unknown binding: {name}")]
    UnknownBinding {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Malformed tagged value: {0}")]
    Decode(String),
}

impl BindingError {
    pub fn arity(function: &str, expected: usize, got: usize) -> Self {
        Self::Arity {
            function: function.to_string(),
            expected,
            got,
        }
    }

    pub fn argument_type(function: &str, position: usize, expected: ArgType, got: ValueType) -> Self {
        Self::ArgumentType {
            function: function.to_string(),
            position,
            expected,
            got,
        }
    }

    pub fn configuration(function: &str) -> Self {
        Self::Configuration {
            function: function.to_string(),
        }
    }

    pub fn callback(function: &str, source: CallbackError) -> Self {
        Self::Callback {
            function: function.to_string(),
            source,
        }
    }

    pub fn unknown_binding(name: &str, suggestions: Vec<String>) -> Self {
        Self::UnknownBinding {
            name: name.to_string(),
            suggestions,
        }
    }

    pub fn decode(details: impl Into<String>) -> Self {
        Self::Decode(details.into())
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Arity { .. } => codes::ARG_COUNT,
            Self::ArgumentType { .. } => codes::ARG_TYPE,
            Self::Configuration { .. } => codes::CONFIGURATION,
            Self::Callback { .. } => codes::CALLBACK,
            Self::UnknownBinding { .. } => codes::UNKNOWN_BINDING,
            Self::Decode(_) => codes::DECODE,
        }
    }

    /// Similar registered names, for `UnknownBinding`
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::UnknownBinding { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}
