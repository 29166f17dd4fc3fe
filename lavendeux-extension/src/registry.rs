//! Extension registry
//!
//! Holds the extension's metadata, the two exposed-name tables the host
//! reads at load time, and the bindings themselves keyed by registered name.
//! A host keeps exactly one registry alive; building a new one replaces the
//! old extension rather than merging into it.

use crate::{BindingMeta, CallbackResult, DecoratorBinding, FunctionBinding, StateStore};
use indexmap::map::Entry;
use indexmap::IndexMap;
use lavendeux_core::{ArgType, BindingError, Native, State, TaggedValue};
use serde::Serialize;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

pub const DEFAULT_VERSION: &str = "1.0.0";

/// Metadata surface exposed to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionDetails {
    pub name: String,
    pub author: String,
    pub version: String,
    pub functions: IndexMap<String, String>,
    pub decorators: IndexMap<String, String>,
}

pub struct ExtensionRegistry {
    name: String,
    author: String,
    version: String,
    functions: IndexMap<String, String>,
    decorators: IndexMap<String, String>,
    function_bindings: IndexMap<String, FunctionBinding>,
    decorator_bindings: IndexMap<String, DecoratorBinding>,
    state: Option<Rc<dyn StateStore>>,
}

impl ExtensionRegistry {
    pub fn new(name: impl Into<String>, author: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            version: version.into(),
            functions: IndexMap::new(),
            decorators: IndexMap::new(),
            function_bindings: IndexMap::new(),
            decorator_bindings: IndexMap::new(),
            state: None,
        }
    }

    /// Registry with the default version
    pub fn unversioned(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self::new(name, author, DEFAULT_VERSION)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Exposed function name -> registered name
    pub fn functions(&self) -> &IndexMap<String, String> {
        &self.functions
    }

    /// Exposed decorator name -> registered name
    pub fn decorators(&self) -> &IndexMap<String, String> {
        &self.decorators
    }

    pub fn details(&self) -> ExtensionDetails {
        ExtensionDetails {
            name: self.name.clone(),
            author: self.author.clone(),
            version: self.version.clone(),
            functions: self.functions.clone(),
            decorators: self.decorators.clone(),
        }
    }

    /// One signature record per binding, functions first
    pub fn describe(&self) -> Vec<BindingMeta> {
        self.function_bindings
            .values()
            .map(FunctionBinding::meta)
            .chain(self.decorator_bindings.values().map(DecoratorBinding::meta))
            .collect()
    }

    // ========== State capability ==========

    /// Provide the host state accessor to every binding, present and future
    pub fn set_state_store(&mut self, store: Rc<dyn StateStore>) {
        for f in self.function_bindings.values_mut() {
            f.set_state_store(Rc::clone(&store));
        }
        for d in self.decorator_bindings.values_mut() {
            d.set_state_store(Rc::clone(&store));
        }
        self.state = Some(store);
    }

    pub fn with_state_store(mut self, store: Rc<dyn StateStore>) -> Self {
        self.set_state_store(store);
        self
    }

    pub fn has_state_store(&self) -> bool {
        self.state.is_some()
    }

    // ========== Registration ==========

    /// Register a pre-built function. A binding already registered under the
    /// same name is replaced.
    pub fn register_function(&mut self, mut binding: FunctionBinding) -> &mut FunctionBinding {
        if let Some(store) = &self.state {
            binding.set_state_store(Rc::clone(store));
        }
        let registered = binding.registered_name().to_string();
        if self
            .functions
            .insert(binding.name().to_string(), registered.clone())
            .is_some()
        {
            debug!(function = %binding.name(), "replacing registered function");
        } else {
            debug!(function = %binding.name(), registered = %registered, "registered function");
        }

        match self.function_bindings.entry(registered) {
            Entry::Occupied(mut slot) => {
                slot.insert(binding);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(binding),
        }
    }

    /// Register a pre-built decorator. A binding already registered under the
    /// same name is replaced.
    pub fn register_decorator(&mut self, mut binding: DecoratorBinding) -> &mut DecoratorBinding {
        if let Some(store) = &self.state {
            binding.set_state_store(Rc::clone(store));
        }
        let registered = binding.registered_name().to_string();
        if self
            .decorators
            .insert(binding.name().to_string(), registered.clone())
            .is_some()
        {
            debug!(decorator = %binding.name(), "replacing registered decorator");
        } else {
            debug!(decorator = %binding.name(), registered = %registered, "registered decorator");
        }

        match self.decorator_bindings.entry(registered) {
            Entry::Occupied(mut slot) => {
                slot.insert(binding);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(binding),
        }
    }

    /// Add a callable function. Chain `add_*_argument` calls on the result.
    pub fn add_function<F>(&mut self, name: &str, return_type: ArgType, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.register_function(FunctionBinding::new(name, return_type, callback))
    }

    /// Add a function whose result is returned as-is
    pub fn add_any_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Any, callback)
    }

    pub fn add_integer_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Integer, callback)
    }

    pub fn add_float_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Float, callback)
    }

    pub fn add_numeric_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Numeric, callback)
    }

    pub fn add_string_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::String, callback)
    }

    pub fn add_boolean_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Boolean, callback)
    }

    pub fn add_array_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Array, callback)
    }

    pub fn add_object_function<F>(&mut self, name: &str, callback: F) -> &mut FunctionBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_function(name, ArgType::Object, callback)
    }

    /// Add a decorator taking one value of `arg_type`
    pub fn add_typed_decorator<F>(&mut self, name: &str, arg_type: ArgType, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.register_decorator(DecoratorBinding::new(name, arg_type, callback))
    }

    /// Add a decorator that accepts any value
    pub fn add_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Any, callback)
    }

    pub fn add_integer_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Integer, callback)
    }

    pub fn add_float_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Float, callback)
    }

    pub fn add_numeric_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Numeric, callback)
    }

    pub fn add_string_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::String, callback)
    }

    pub fn add_boolean_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Boolean, callback)
    }

    pub fn add_array_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Array, callback)
    }

    pub fn add_object_decorator<F>(&mut self, name: &str, callback: F) -> &mut DecoratorBinding
    where
        F: Fn(&[Native], &mut State) -> CallbackResult + 'static,
    {
        self.add_typed_decorator(name, ArgType::Object, callback)
    }

    // ========== Lookup and dispatch ==========

    /// Function by exposed name
    pub fn function(&self, name: &str) -> Option<&FunctionBinding> {
        self.functions
            .get(name.trim_start_matches('@'))
            .and_then(|registered| self.function_bindings.get(registered))
    }

    /// Decorator by exposed name
    pub fn decorator(&self, name: &str) -> Option<&DecoratorBinding> {
        self.decorators
            .get(name.trim_start_matches('@'))
            .and_then(|registered| self.decorator_bindings.get(registered))
    }

    pub fn is_registered(&self, registered_name: &str) -> bool {
        self.function_bindings.contains_key(registered_name)
            || self.decorator_bindings.contains_key(registered_name)
    }

    /// Host entry point: call whatever is bound under `registered_name`
    pub fn call(&self, registered_name: &str, args: &[TaggedValue]) -> Result<TaggedValue, BindingError> {
        if let Some(f) = self.function_bindings.get(registered_name) {
            return f.call(args);
        }
        if let Some(d) = self.decorator_bindings.get(registered_name) {
            return d.call_with(args);
        }

        let similar = self.find_similar_bindings(registered_name);
        debug!(binding = %registered_name, suggestions = similar.len(), "unknown binding");
        Err(BindingError::unknown_binding(
            registered_name,
            similar.into_iter().take(5).collect(),
        ))
    }

    /// Registered names similar to the given one, best first
    fn find_similar_bindings(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .function_bindings
            .keys()
            .chain(self.decorator_bindings.keys())
            .filter_map(|candidate| {
                let score = Self::similarity_score(&name_lower, &candidate.to_lowercase());
                if score > 0 {
                    Some((candidate.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Similarity between a query and a candidate name; 0 means unrelated
    fn similarity_score(query: &str, candidate: &str) -> usize {
        // Compare the part after the registered-name prefix
        let strip = |s: &str| -> String {
            s.split_once('_')
                .map_or(s, |(_, rest)| rest)
                .to_string()
        };
        let query = strip(query);
        let candidate = strip(candidate);
        if query.is_empty() || candidate.is_empty() {
            return 0;
        }

        let mut score = 0;

        if candidate.starts_with(&query) {
            score += 100;
        } else if candidate.contains(&query) {
            score += 50;
        } else if query.contains(&candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        if score == 0 && common * 2 <= query_chars.len() {
            return 0;
        }
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 {
            score += 5 - len_diff;
        }

        score
    }
}

/// Build a registry from the calling crate's package metadata
#[macro_export]
macro_rules! from_package {
    () => {
        $crate::ExtensionRegistry::new(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_AUTHORS"),
            env!("CARGO_PKG_VERSION"),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryState;

    fn noop(_: &[Native], _: &mut State) -> CallbackResult {
        Ok(Native::Null)
    }

    #[test]
    fn test_constructor() {
        let registry = ExtensionRegistry::new("test1", "test2", "test3");
        assert_eq!(
            registry.details(),
            ExtensionDetails {
                name: "test1".to_string(),
                author: "test2".to_string(),
                version: "test3".to_string(),
                functions: IndexMap::new(),
                decorators: IndexMap::new(),
            }
        );
        assert_eq!(ExtensionRegistry::unversioned("a", "b").version(), DEFAULT_VERSION);
    }

    #[test]
    fn test_typed_functions() {
        let mut registry = ExtensionRegistry::new("test1", "test2", "test3");
        assert_eq!(registry.add_integer_function("test", noop).return_type(), ArgType::Integer);
        assert_eq!(registry.add_float_function("test", noop).return_type(), ArgType::Float);
        assert_eq!(registry.add_numeric_function("test", noop).return_type(), ArgType::Numeric);
        assert_eq!(registry.add_string_function("test", noop).return_type(), ArgType::String);
        assert_eq!(registry.add_boolean_function("test", noop).return_type(), ArgType::Boolean);
        assert_eq!(registry.add_array_function("test", noop).return_type(), ArgType::Array);
        assert_eq!(registry.add_object_function("test", noop).return_type(), ArgType::Object);
        assert_eq!(registry.add_any_function("test", noop).return_type(), ArgType::Any);

        // Re-registering overwrites
        assert_eq!(registry.functions().len(), 1);
        assert_eq!(registry.describe().len(), 1);
    }

    #[test]
    fn test_typed_decorators() {
        let mut registry = ExtensionRegistry::new("test1", "test2", "test3");
        assert_eq!(registry.add_integer_decorator("test", noop).argument_type(), ArgType::Integer);
        assert_eq!(registry.add_float_decorator("test", noop).argument_type(), ArgType::Float);
        assert_eq!(registry.add_numeric_decorator("test", noop).argument_type(), ArgType::Numeric);
        assert_eq!(registry.add_string_decorator("test", noop).argument_type(), ArgType::String);
        assert_eq!(registry.add_boolean_decorator("test", noop).argument_type(), ArgType::Boolean);
        assert_eq!(registry.add_array_decorator("test", noop).argument_type(), ArgType::Array);
        assert_eq!(registry.add_object_decorator("test", noop).argument_type(), ArgType::Object);
        assert_eq!(registry.add_decorator("test", noop).argument_type(), ArgType::Any);
        assert_eq!(registry.decorators().len(), 1);
    }

    #[test]
    fn test_tables_map_names_to_registered_names() {
        let mut registry = ExtensionRegistry::unversioned("ext", "me");
        registry.add_any_function("add", noop);
        registry.add_decorator("@usd", noop);

        assert_eq!(registry.functions().get("add").map(String::as_str), Some("lavendeuxfunction_add"));
        assert_eq!(registry.decorators().get("usd").map(String::as_str), Some("lavendeuxdecorator_usd"));
        assert!(registry.is_registered("lavendeuxfunction_add"));
        assert!(registry.is_registered("lavendeuxdecorator_usd"));
        assert!(registry.function("add").is_some());
        assert!(registry.decorator("@usd").is_some());
        assert!(registry.function("usd").is_none());
    }

    #[test]
    fn test_chained_arguments_are_kept() -> Result<(), BindingError> {
        let mut registry = ExtensionRegistry::unversioned("ext", "me");
        registry
            .add_any_function("add", |args, _| {
                Ok(Native::Float(args[0].as_f64().unwrap_or(0.0) + args[1].as_f64().unwrap_or(0.0)))
            })
            .add_numeric_argument()?
            .add_numeric_argument()?;

        let result = registry.call(
            "lavendeuxfunction_add",
            &[TaggedValue::Integer(2), TaggedValue::Integer(3)],
        )?;
        assert_eq!(result, TaggedValue::Integer(5));

        let err = registry.call("lavendeuxfunction_add", &[TaggedValue::Integer(2)]).unwrap_err();
        assert!(matches!(err, BindingError::Arity { expected: 2, .. }));
        Ok(())
    }

    #[test]
    fn test_decorator_dispatch_takes_argument_list() {
        let mut registry = ExtensionRegistry::unversioned("ext", "me");
        registry.add_numeric_decorator("usd", |args, _| {
            Ok(Native::Str(format!("${:.2}", args[0].as_f64().unwrap_or(0.0))))
        });

        let result = registry
            .call("lavendeuxdecorator_usd", &[TaggedValue::Integer(2), TaggedValue::Integer(3)])
            .unwrap();
        assert_eq!(result, TaggedValue::from("$2.00"));
    }

    #[test]
    fn test_unknown_binding_suggests_similar_names() {
        let mut registry = ExtensionRegistry::unversioned("ext", "me");
        registry.add_any_function("add", noop);
        registry.add_any_function("average", noop);
        registry.add_decorator("usd", noop);

        let err = registry.call("lavendeuxfunction_ad", &[]).unwrap_err();
        assert_eq!(err.code(), lavendeux_core::codes::UNKNOWN_BINDING);
        assert_eq!(err.suggestions().first().map(String::as_str), Some("lavendeuxfunction_add"));
        assert!(!err.suggestions().iter().any(|s| s == "lavendeuxdecorator_usd"));
    }

    #[test]
    fn test_state_store_reaches_every_binding() {
        let mut registry = ExtensionRegistry::unversioned("ext", "me");
        registry.add_any_function("before", noop);
        assert!(!registry.function("before").unwrap().has_state_store());

        registry.set_state_store(Rc::new(MemoryState::new()));
        registry.add_any_function("after", noop);
        registry.add_decorator("deco", noop);

        assert!(registry.has_state_store());
        assert!(registry.function("before").unwrap().has_state_store());
        assert!(registry.function("after").unwrap().has_state_store());
        assert!(registry.decorator("deco").unwrap().has_state_store());
    }

    #[test]
    fn test_counter_through_registry() {
        let store = Rc::new(MemoryState::new());
        let mut registry = ExtensionRegistry::unversioned("ext", "me").with_state_store(store.clone());
        registry.add_any_function("next", |_, state| {
            let next = state.get("next_int").and_then(Native::as_i64).unwrap_or(0);
            state.insert("next_int".to_string(), Native::Int(next + 1));
            Ok(Native::Int(next))
        });

        for expected in 0..3 {
            assert_eq!(
                registry.call("lavendeuxfunction_next", &[]).unwrap(),
                TaggedValue::Integer(expected)
            );
        }
    }

    #[test]
    fn test_from_package() {
        let registry = from_package!();
        assert_eq!(registry.name(), "lavendeux-extension");
        assert_eq!(registry.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_details_serialize() {
        let mut registry = ExtensionRegistry::new("ext", "me", "2.0.0");
        registry.add_any_function("add", noop);
        let json = serde_json::to_value(registry.details()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "ext",
                "author": "me",
                "version": "2.0.0",
                "functions": {"add": "lavendeuxfunction_add"},
                "decorators": {}
            })
        );
    }
}
