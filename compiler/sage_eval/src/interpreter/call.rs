//! Function calls and tier dispatch.

use sage_ir::{CallSite, FunctionDecl};
use sage_jit::TierDecision;
use sage_value::{arity_mismatch, undefined_function, ControlAction, EvalResult, Value};
use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::trace;

use super::Interpreter;
use crate::function_table::FunctionEntry;

/// RAII guard for one call frame.
///
/// Pushes a frame on creation and pops it on drop, so the frame depth is the
/// same before and after every call on every exit path, including errors
/// and unwinding.
pub struct CallFrameGuard<'a> {
    interpreter: &'a mut Interpreter,
}

impl<'a> CallFrameGuard<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        interpreter.env.enter_call();
        CallFrameGuard { interpreter }
    }
}

impl Drop for CallFrameGuard<'_> {
    fn drop(&mut self) {
        self.interpreter.env.restore_all();
    }
}

impl Deref for CallFrameGuard<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for CallFrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Evaluate a call expression.
    ///
    /// Built-ins get the raw argument nodes. For user functions the arity is
    /// checked before anything is evaluated, then the arguments are evaluated
    /// once and feed the tier decision, compiled code and parameter binding
    /// alike.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn eval_call(&mut self, site: &CallSite) -> EvalResult {
        let function = match self.functions.get(site.callee) {
            Some(FunctionEntry::User(function)) => Arc::clone(function),
            Some(FunctionEntry::Builtin(builtin)) => {
                let builtin = Arc::clone(builtin);
                return builtin(self, &site.token, &site.args);
            }
            None => {
                return Err(undefined_function(self.interner.lookup(site.callee))
                    .with_token(&site.token)
                    .into());
            }
        };
        let decl = &function.decl;

        if decl.arity() != site.args.len() {
            return Err(arity_mismatch(
                self.interner.lookup(site.callee),
                decl.arity(),
                site.args.len(),
            )
            .with_token(&site.token)
            .into());
        }

        let mut args: SmallVec<[Value; 4]> = SmallVec::with_capacity(site.args.len());
        for arg in &site.args {
            args.push(self.eval(arg)?);
        }

        match self.jit.decide(&function.slot, site.calls()) {
            TierDecision::Attempt => {
                trace!(function = %self.interner.lookup(site.callee), "call triggered compilation");
                self.jit.request_compile(decl, &function.slot, &args);
            }
            TierDecision::Compiled(compiled) => {
                if let Some(value) = self.jit.invoke(&compiled, &args) {
                    return Ok(value);
                }
            }
            TierDecision::Count => {
                site.record_call();
            }
        }

        self.call_user(decl, args)
    }

    /// Interpret a user function body with `args` bound to its parameters.
    pub(crate) fn call_user(
        &mut self,
        decl: &FunctionDecl,
        args: impl IntoIterator<Item = Value>,
    ) -> EvalResult {
        let mut frame = CallFrameGuard::new(self);
        for (param, arg) in decl.params.iter().zip(args) {
            frame.env.shadow(param.name, arg);
        }
        frame
            .eval_block(&decl.body)
            .or_else(ControlAction::into_call_result)
    }
}
