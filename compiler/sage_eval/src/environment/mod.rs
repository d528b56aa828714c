//! Variable bindings: one global table plus a stack of call frames.
//!
//! A call pushes a frame and binds its parameters there, hiding any outer
//! binding of the same name without touching it. Popping the frame brings
//! every hidden value back. Each active call owns its own frame, so nested
//! and recursive calls that reuse a parameter name restore correctly.
//!
//! Naming is flat: a lookup walks from the innermost frame outward through
//! every active call before reaching the globals, so a callee sees the
//! bindings of the calls that invoked it.

use rustc_hash::FxHashMap;
use sage_ir::Name;
use sage_value::Value;

/// Bindings owned by one active call.
#[derive(Clone, Debug, Default)]
struct Frame {
    bindings: FxHashMap<Name, Value>,
}

#[derive(Clone, Debug, Default)]
pub struct Environment {
    globals: FxHashMap<Name, Value>,
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active call frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Look up a binding: active frames innermost first, then the globals.
    #[inline]
    pub fn get(&self, key: Name) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(&key))
            .or_else(|| self.globals.get(&key))
    }

    /// Write a binding into the innermost frame, or the globals outside any
    /// call.
    #[inline]
    pub fn set(&mut self, key: Name, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.bindings.insert(key, value);
            }
            None => {
                self.globals.insert(key, value);
            }
        }
    }

    /// Bind a parameter in the innermost frame, hiding any outer value.
    ///
    /// Outside a call there is nothing to hide behind, so this is `set`.
    pub fn shadow(&mut self, key: Name, value: Value) {
        self.set(key, value);
    }

    /// Start a call: later `shadow`/`set` calls go to a fresh frame.
    pub fn enter_call(&mut self) {
        self.frames.push(Frame::default());
    }

    /// End the innermost call, bringing back every value it hid.
    pub fn restore_all(&mut self) {
        self.frames.pop();
    }

    pub fn global(&self, key: Name) -> Option<&Value> {
        self.globals.get(&key)
    }
}
