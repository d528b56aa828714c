//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use sage_ir::SharedInterner;
use sage_jit::{Jit, JitConfig};
use std::sync::Arc;

use super::Interpreter;
use crate::function_table::FunctionTable;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::Environment;

pub struct InterpreterBuilder {
    interner: SharedInterner,
    env: Option<Environment>,
    functions: Option<FunctionTable>,
    jit: Option<Arc<Jit>>,
    print_handler: Option<SharedPrintHandler>,
}

impl InterpreterBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        Self {
            interner,
            env: None,
            functions: None,
            jit: None,
            print_handler: None,
        }
    }

    /// Set the initial environment.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Start from an existing function table, e.g. one holding built-ins.
    #[must_use]
    pub fn functions(mut self, functions: FunctionTable) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Share a compiled tier. Without one, calls are always interpreted.
    #[must_use]
    pub fn jit(mut self, jit: Arc<Jit>) -> Self {
        self.jit = Some(jit);
        self
    }

    /// Set the print handler. Default is stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    pub fn build(self) -> Interpreter {
        let jit = self
            .jit
            .unwrap_or_else(|| Arc::new(Jit::new(JitConfig::disabled(), self.interner.clone())));
        Interpreter {
            interner: self.interner,
            env: self.env.unwrap_or_default(),
            functions: self.functions.unwrap_or_default(),
            jit,
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
        }
    }
}
