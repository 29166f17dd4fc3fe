//! State capability
//!
//! A host may keep a mapping of named values across calls. Bindings read it
//! before invoking a callback and write it back afterwards. Everything here
//! is single-threaded; stores use interior mutability.

use lavendeux_core::WireState;
use std::cell::RefCell;

/// Host-provided state accessor
pub trait StateStore {
    fn get_state(&self) -> WireState;
    fn set_state(&self, state: WireState);
}

/// In-process state store
#[derive(Debug, Default)]
pub struct MemoryState {
    state: RefCell<WireState>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: WireState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    /// Copy of the current mapping
    pub fn snapshot(&self) -> WireState {
        self.state.borrow().clone()
    }
}

impl StateStore for MemoryState {
    fn get_state(&self) -> WireState {
        self.snapshot()
    }

    fn set_state(&self, state: WireState) {
        *self.state.borrow_mut() = state;
    }
}
