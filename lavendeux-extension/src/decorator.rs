//! Decorator bindings
//!
//! A decorator formats one value as text. It wraps a `FunctionBinding` with
//! exactly one parameter of the declared type and a String return type.

use crate::{ArgumentSpec, BindingKind, BindingMeta, CallbackResult, FunctionBinding, StateStore};
use lavendeux_core::{codec, ArgType, BindingError, Native, State, TaggedValue};
use std::rc::Rc;

const DECORATOR_PREFIX: &str = "lavendeuxdecorator_";

#[derive(Debug)]
pub struct DecoratorBinding {
    function: FunctionBinding,
}

impl DecoratorBinding {
    pub fn new<F>(name: &str, arg_type: ArgType, callback: F) -> Self
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        let function = FunctionBinding::with_arguments(
            name,
            vec![ArgumentSpec::required(arg_type)],
            ArgType::String,
            callback,
        );
        let registered_name = Self::registered_name_for(function.name());
        Self {
            function: function.with_registered_name(registered_name),
        }
    }

    /// Stable registered name for a decorator name
    pub fn registered_name_for(name: &str) -> String {
        format!("{}{}", DECORATOR_PREFIX, name.trim_start_matches('@'))
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn registered_name(&self) -> &str {
        self.function.registered_name()
    }

    /// Declared type of the single parameter
    pub fn argument_type(&self) -> ArgType {
        self.function
            .arguments()
            .first()
            .map_or(ArgType::Any, |a| a.arg_type)
    }

    /// Always String
    pub fn return_type(&self) -> ArgType {
        self.function.return_type()
    }

    pub fn meta(&self) -> BindingMeta {
        BindingMeta {
            kind: BindingKind::Decorator,
            ..self.function.meta()
        }
    }

    pub fn with_state_store(mut self, store: Rc<dyn StateStore>) -> Self {
        self.function.set_state_store(store);
        self
    }

    pub fn set_state_store(&mut self, store: Rc<dyn StateStore>) {
        self.function.set_state_store(store);
    }

    pub fn has_state_store(&self) -> bool {
        self.function.has_state_store()
    }

    /// Decorate one tagged value
    pub fn call(&self, value: &TaggedValue) -> Result<TaggedValue, BindingError> {
        self.call_with(std::slice::from_ref(value))
    }

    /// Host form: the argument list as received. Only the first value is
    /// decorated; the result is always tagged String.
    pub fn call_with(&self, args: &[TaggedValue]) -> Result<TaggedValue, BindingError> {
        Ok(match self.function.call(args)? {
            text @ TaggedValue::String(_) => text,
            other => TaggedValue::String(codec::unwrap(&other).to_string()),
        })
    }

    /// Run the callback directly on one native value
    pub fn call_native(&self, value: Native) -> Result<Native, BindingError> {
        self.function.call_native(&[value])
    }
}
