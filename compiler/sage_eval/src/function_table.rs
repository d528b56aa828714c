//! Function table: user definitions and host built-ins by name.

use rustc_hash::FxHashMap;
use sage_ir::{FunctionDecl, Name, Node, Token};
use sage_jit::JitSlot;
use sage_value::EvalResult;
use std::sync::Arc;

use crate::Interpreter;

/// Host-provided built-in.
///
/// Receives the call token and the unevaluated argument nodes; it evaluates
/// (or ignores) them itself and does its own arity and type checks.
pub type BuiltinFn = Arc<dyn Fn(&mut Interpreter, &Token, &[Node]) -> EvalResult + Send + Sync>;

/// A user definition together with its compiled-tier bookkeeping.
#[derive(Debug)]
pub struct UserFunction {
    pub decl: Arc<FunctionDecl>,
    pub slot: Arc<JitSlot>,
}

#[derive(Clone)]
pub enum FunctionEntry {
    User(Arc<UserFunction>),
    Builtin(BuiltinFn),
}

impl std::fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionEntry::User(function) => f.debug_tuple("User").field(function).finish(),
            FunctionEntry::Builtin(_) => f.write_str("Builtin"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    entries: FxHashMap<Name, FunctionEntry>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Redefinition replaces the old entry and starts
    /// over with a fresh tier state.
    pub fn define(&mut self, decl: Arc<FunctionDecl>) {
        let name = decl.name.name;
        self.entries.insert(
            name,
            FunctionEntry::User(Arc::new(UserFunction {
                decl,
                slot: Arc::new(JitSlot::new()),
            })),
        );
    }

    pub fn register_builtin(&mut self, name: Name, function: BuiltinFn) {
        self.entries.insert(name, FunctionEntry::Builtin(function));
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&FunctionEntry> {
        self.entries.get(&name)
    }

    /// The user definition registered under `name`, if any.
    pub fn user(&self, name: Name) -> Option<&Arc<UserFunction>> {
        match self.entries.get(&name)? {
            FunctionEntry::User(function) => Some(function),
            FunctionEntry::Builtin(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
