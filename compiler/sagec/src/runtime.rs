//! The embeddable runtime: one interpreter, one compiled tier, and the
//! diagnostic sink they report to.

use sage_diagnostic::{
    render_diagnostics, ColorMode, Diagnostic, DiagnosticConfig, DiagnosticEmitter,
    DiagnosticQueue, TerminalEmitter,
};
use sage_eval::{stdout_handler, Interpreter, InterpreterBuilder, SharedPrintHandler};
use sage_ir::{Node, SharedInterner};
use sage_jit::Jit;
use sage_value::{ControlAction, EvalResult, Value};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::debug;

use crate::builtins::register_defaults;
use crate::report::to_diagnostic;
use crate::tracing_setup::init_tracing;
use crate::RuntimeConfig;

/// Outcome of running one or more programs.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    /// Value of the last program, if it completed.
    pub value: Option<Value>,
    /// Reported errors in the order they occurred.
    pub diagnostics: Vec<Diagnostic>,
}

impl RunOutput {
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Plain-text rendering of the diagnostics.
    pub fn render(&self) -> String {
        render_diagnostics(&self.diagnostics)
    }

    /// Write the diagnostics to stderr. `ColorMode::Auto` colors them only
    /// when stderr is a terminal.
    pub fn report(&self, color: ColorMode) {
        if self.diagnostics.is_empty() {
            return;
        }
        let is_tty = std::io::stderr().is_terminal();
        let mut emitter = TerminalEmitter::stderr(color, is_tty);
        emitter.emit_all(&self.diagnostics);
        emitter.flush();
    }
}

pub struct Runtime {
    interpreter: Interpreter,
    jit: Arc<Jit>,
    diagnostics: DiagnosticConfig,
}

impl Runtime {
    /// A runtime printing to stdout.
    pub fn new(config: RuntimeConfig, interner: SharedInterner) -> Self {
        Self::with_print_handler(config, interner, stdout_handler())
    }

    pub fn with_print_handler(
        config: RuntimeConfig,
        interner: SharedInterner,
        print_handler: SharedPrintHandler,
    ) -> Self {
        init_tracing(config.debug);

        let jit = Arc::new(Jit::new(config.jit.clone(), interner.clone()));
        let mut interpreter = InterpreterBuilder::new(interner)
            .jit(Arc::clone(&jit))
            .print_handler(print_handler)
            .build();
        register_defaults(&mut interpreter);
        for (name, function) in config.functions() {
            interpreter.register_builtin(name, Arc::clone(function));
        }
        debug!(?config, "runtime ready");

        Runtime {
            interpreter,
            jit,
            diagnostics: config.diagnostic_config(),
        }
    }

    /// Evaluate one program. Evaluation stops at the first error.
    pub fn run(&mut self, program: &Node) -> RunOutput {
        let mut queue = DiagnosticQueue::with_config(self.diagnostics.clone());
        let value = self.run_into(program, &mut queue);
        RunOutput {
            value,
            diagnostics: queue.flush(),
        }
    }

    /// Evaluate programs in order against the same globals and functions,
    /// as a session would. A failing program does not stop later ones; the
    /// error limit applies across the whole session.
    pub fn run_session(&mut self, programs: &[Node]) -> RunOutput {
        let mut queue = DiagnosticQueue::with_config(self.diagnostics.clone());
        let mut value = None;
        for program in programs {
            value = self.run_into(program, &mut queue);
        }
        RunOutput {
            value,
            diagnostics: queue.flush(),
        }
    }

    fn run_into(&mut self, program: &Node, queue: &mut DiagnosticQueue) -> Option<Value> {
        let result: EvalResult = self
            .interpreter
            .eval(program)
            .or_else(ControlAction::into_call_result);
        match result {
            Ok(value) => Some(value),
            Err(ControlAction::Error(err)) => {
                debug!(error = %err, "program failed");
                queue.add(to_diagnostic(&err));
                None
            }
            Err(ControlAction::Return(value)) => Some(value),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn jit(&self) -> &Jit {
        &self.jit
    }

    pub fn interner(&self) -> &SharedInterner {
        self.interpreter.interner()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("jit", &self.jit)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
