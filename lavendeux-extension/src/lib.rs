//! Lavendeux Extension - Bindings and registry
//!
//! Everything an extension author needs to expose native callbacks to a
//! Lavendeux host:
//! - `FunctionBinding`: callable functions with typed, optionally trailing parameters
//! - `DecoratorBinding`: single-value formatters that always return text
//! - `ExtensionRegistry`: metadata plus the name tables the host reads at load
//! - `StateStore`: the host-provided state capability

mod argument;
mod decorator;
mod function;
mod registry;
mod state;

pub use argument::ArgumentSpec;
pub use decorator::DecoratorBinding;
pub use function::{BindingKind, BindingMeta, Callback, CallbackResult, FunctionBinding};
pub use registry::{ExtensionDetails, ExtensionRegistry, DEFAULT_VERSION};
pub use state::{MemoryState, StateStore};

/// Prelude for extension authors
pub mod prelude {
    pub use crate::{
        ArgumentSpec, CallbackResult, DecoratorBinding, ExtensionRegistry, FunctionBinding, MemoryState,
        StateStore,
    };
    pub use lavendeux_core::prelude::*;
}
