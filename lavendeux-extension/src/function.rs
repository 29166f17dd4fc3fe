//! Function bindings
//!
//! A named native callback with an ordered parameter list and a declared
//! return type. A call checks arity and numeric tags, unwraps and coerces
//! the arguments, threads state through the callback and wraps the result.

use crate::{ArgumentSpec, StateStore};
use lavendeux_core::{codec, ArgType, BindingError, CallbackError, Native, State, TaggedValue};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// What a native callback returns
pub type CallbackResult = Result<Native, CallbackError>;

/// Native callback: positional arguments, then the state mapping
pub type Callback = Box<dyn Fn(&[Native], &mut State) -> CallbackResult>;

const FUNCTION_PREFIX: &str = "lavendeuxfunction_";

/// Kind of binding, for introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Function,
    Decorator,
}

/// Signature of a binding as the host sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingMeta {
    pub kind: BindingKind,
    pub name: String,
    pub registered_name: String,
    pub arguments: Vec<ArgumentSpec>,
    pub returns: ArgType,
}

impl BindingMeta {
    /// `name(Numeric, [String]) -> Any`, optional parameters bracketed
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .arguments
            .iter()
            .map(|a| {
                if a.optional {
                    format!("[{}]", a.arg_type)
                } else {
                    a.arg_type.to_string()
                }
            })
            .collect();
        let prefix = match self.kind {
            BindingKind::Function => "",
            BindingKind::Decorator => "@",
        };
        format!("{}{}({}) -> {}", prefix, self.name, args.join(", "), self.returns)
    }
}

/// Callable function exposed to the host
pub struct FunctionBinding {
    name: String,
    registered_name: String,
    arguments: Vec<ArgumentSpec>,
    return_type: ArgType,
    callback: Callback,
    state: Option<Rc<dyn StateStore>>,
}

impl FunctionBinding {
    /// Build a binding with no parameters. A leading `@` is dropped from the name.
    pub fn new<F>(name: &str, return_type: ArgType, callback: F) -> Self
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        Self::with_arguments(name, Vec::new(), return_type, callback)
    }

    /// Build with a fixed parameter list. Callers must keep optional
    /// parameters at the end.
    pub(crate) fn with_arguments<F>(
        name: &str,
        arguments: Vec<ArgumentSpec>,
        return_type: ArgType,
        callback: F,
    ) -> Self
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        let name = exposed_name(name);
        Self {
            registered_name: Self::registered_name_for(&name),
            name,
            arguments,
            return_type,
            callback: Box::new(callback),
            state: None,
        }
    }

    /// Stable registered name for a function name
    pub fn registered_name_for(name: &str) -> String {
        format!("{}{}", FUNCTION_PREFIX, exposed_name(name))
    }

    pub(crate) fn with_registered_name(mut self, registered_name: String) -> Self {
        self.registered_name = registered_name;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registered_name(&self) -> &str {
        &self.registered_name
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn return_type(&self) -> ArgType {
        self.return_type
    }

    /// Number of arguments a call must supply: every parameter except a
    /// trailing optional one
    pub fn required_arguments(&self) -> usize {
        let trailing_optional = self.arguments.last().is_some_and(|a| a.optional);
        self.arguments.len() - usize::from(trailing_optional)
    }

    pub fn meta(&self) -> BindingMeta {
        BindingMeta {
            kind: BindingKind::Function,
            name: self.name.clone(),
            registered_name: self.registered_name.clone(),
            arguments: self.arguments.clone(),
            returns: self.return_type,
        }
    }

    // ========== State capability ==========

    pub fn with_state_store(mut self, store: Rc<dyn StateStore>) -> Self {
        self.state = Some(store);
        self
    }

    pub fn set_state_store(&mut self, store: Rc<dyn StateStore>) {
        self.state = Some(store);
    }

    pub fn has_state_store(&self) -> bool {
        self.state.is_some()
    }

    // ========== Parameters ==========

    /// Append a parameter. Fails once an optional parameter has been added
    /// and this one is required.
    pub fn add_argument_spec(&mut self, spec: ArgumentSpec) -> Result<&mut Self, BindingError> {
        let locked = self.arguments.last().is_some_and(|a| a.optional);
        if locked && !spec.optional {
            return Err(BindingError::configuration(&self.name));
        }
        self.arguments.push(spec);
        Ok(self)
    }

    pub fn add_argument(&mut self, arg_type: ArgType) -> Result<&mut Self, BindingError> {
        self.add_argument_spec(ArgumentSpec::required(arg_type))
    }

    pub fn add_optional_argument(&mut self, arg_type: ArgType) -> Result<&mut Self, BindingError> {
        self.add_argument_spec(ArgumentSpec::optional(arg_type))
    }

    pub fn add_integer_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::Integer)
    }

    pub fn add_float_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::Float)
    }

    /// Integer or Float
    pub fn add_numeric_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::Numeric)
    }

    pub fn add_string_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::String)
    }

    pub fn add_boolean_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::Boolean)
    }

    pub fn add_array_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::Array)
    }

    pub fn add_object_argument(&mut self) -> Result<&mut Self, BindingError> {
        self.add_argument(ArgType::Object)
    }

    // ========== Calls ==========

    /// Check arity and numeric tags, then unwrap every argument. Arguments
    /// past the declared list are unwrapped as `Any`.
    pub fn decode_arguments(&self, args: &[TaggedValue]) -> Result<Vec<Native>, BindingError> {
        let required = self.required_arguments();
        if args.len() < required {
            return Err(BindingError::arity(&self.name, required, args.len()));
        }

        for (i, (spec, arg)) in self.arguments.iter().zip(args).enumerate() {
            if !spec.validate(arg) {
                return Err(BindingError::argument_type(&self.name, i + 1, spec.arg_type, arg.type_of()));
            }
        }

        Ok(args
            .iter()
            .enumerate()
            .map(|(i, arg)| match self.arguments.get(i) {
                Some(spec) => spec.unwrap(arg),
                None => codec::unwrap(arg),
            })
            .collect())
    }

    /// Invoke from the host side: tagged arguments in, tagged result out.
    ///
    /// Validation failures return before the callback runs. A failing
    /// callback leaves the host state untouched.
    pub fn call(&self, args: &[TaggedValue]) -> Result<TaggedValue, BindingError> {
        debug!(binding = %self.registered_name, args = args.len(), "call");
        let argv = self.decode_arguments(args).inspect_err(|e| {
            debug!(binding = %self.registered_name, error = %e, "call rejected");
        })?;

        let mut state = self.read_state();
        let value = (self.callback)(&argv, &mut state)
            .map_err(|source| BindingError::callback(&self.name, source))?;
        let result = codec::wrap(value, self.return_type);
        self.write_state(state);

        Ok(result)
    }

    /// Run the callback directly on native values with an empty state
    pub fn call_native(&self, args: &[Native]) -> Result<Native, BindingError> {
        let mut state = State::new();
        (self.callback)(args, &mut state).map_err(|source| BindingError::callback(&self.name, source))
    }

    fn read_state(&self) -> State {
        match &self.state {
            Some(store) => {
                let state: State = store
                    .get_state()
                    .iter()
                    .map(|(k, v)| (k.clone(), codec::unwrap(v)))
                    .collect();
                trace!(binding = %self.registered_name, entries = state.len(), "state read");
                state
            }
            None => State::new(),
        }
    }

    fn write_state(&self, state: State) {
        if let Some(store) = &self.state {
            trace!(binding = %self.registered_name, entries = state.len(), "state write");
            store.set_state(
                state
                    .into_iter()
                    .map(|(k, v)| (k, codec::wrap(v, ArgType::Any)))
                    .collect(),
            );
        }
    }
}

impl fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionBinding")
            .field("name", &self.name)
            .field("registered_name", &self.registered_name)
            .field("arguments", &self.arguments)
            .field("return_type", &self.return_type)
            .field("has_state_store", &self.has_state_store())
            .finish()
    }
}

fn exposed_name(name: &str) -> String {
    name.trim_start_matches('@').to_string()
}
