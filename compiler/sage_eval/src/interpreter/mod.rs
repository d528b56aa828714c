//! Tree-walking interpreter.
//!
//! `eval` is one exhaustive `match` over [`Node`]. Early `return` travels as
//! `Err(ControlAction::Return)` through every statement sequence until a call
//! boundary or the root consumes it.

mod builder;
mod call;

pub use builder::InterpreterBuilder;
pub use call::CallFrameGuard;

use sage_ir::{ArithOp, Ident, LogicOp, Name, Node, SharedInterner, Token};
use sage_jit::Jit;
use sage_value::{
    invalid_iterator, loop_arity, undefined_variable, ControlAction, EvalError, EvalResult, Value,
};
use smallvec::SmallVec;
use std::sync::Arc;

use crate::function_table::{BuiltinFn, FunctionTable};
use crate::operators::{evaluate_compare, evaluate_neg, expect_bool, expect_float, fold_arith};
use crate::print_handler::SharedPrintHandler;
use crate::stack::ensure_sufficient_stack;
use crate::Environment;

/// Attach the node's token to an error raised while evaluating it.
fn at(node: &Node, err: EvalError) -> ControlAction {
    match node.origin() {
        Some(token) => err.with_token(token).into(),
        None => err.into(),
    }
}

pub struct Interpreter {
    pub(crate) interner: SharedInterner,
    pub(crate) env: Environment,
    pub(crate) functions: FunctionTable,
    pub(crate) jit: Arc<Jit>,
    pub(crate) print_handler: SharedPrintHandler,
}

impl Interpreter {
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn jit(&self) -> &Jit {
        &self.jit
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Register a host built-in under `name`, replacing any previous entry.
    pub fn register_builtin(&mut self, name: &str, function: BuiltinFn) {
        let name = self.interner.intern(name);
        self.functions.register_builtin(name, function);
    }

    /// Look up a binding by its source text.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.env.get(self.interner.intern(name))
    }

    /// Evaluate a node.
    pub fn eval(&mut self, node: &Node) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(node))
    }

    /// Evaluate statements in order; the value is the last statement's, or
    /// void for an empty body.
    pub fn eval_block(&mut self, body: &[Node]) -> EvalResult {
        let mut last = Value::Void;
        for stmt in body {
            last = self.eval(stmt)?;
        }
        Ok(last)
    }

    fn eval_inner(&mut self, node: &Node) -> EvalResult {
        match node {
            Node::Float { value, .. } => Ok(Value::Float(*value)),
            Node::Str { value, .. } => Ok(Value::Str(Arc::clone(value))),
            Node::Boolean { value, .. } => Ok(Value::Bool(*value)),
            Node::Array { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|element| self.eval(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(items))
            }
            Node::Ident(ident) => self.eval_ident(ident),
            Node::Arith { op, operands, .. } => self.eval_arith(*op, operands),
            Node::Neg { operand, .. } => {
                let value = self.eval(operand)?;
                evaluate_neg(&value).map_err(|e| at(operand, e))
            }
            Node::Compare { op, lhs, rhs, .. } => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                evaluate_compare(*op, &left, &right).map_err(|e| at(node, e))
            }
            Node::Logic { op, operands, .. } => self.eval_logic(*op, operands),
            Node::If {
                condition, body, ..
            } => {
                if self.eval_bool(condition)? {
                    self.eval_block(body)
                } else {
                    Ok(Value::Void)
                }
            }
            Node::For {
                token,
                params,
                iterable,
                body,
            } => self.eval_for(token, params, iterable, body),
            Node::Return { value, .. } => {
                let value = self.eval(value)?;
                Err(ControlAction::Return(value))
            }
            Node::Var { name, values, .. } => {
                let value = match values.as_slice() {
                    [single] => self.eval(single)?,
                    many => Value::array(
                        many.iter()
                            .map(|v| self.eval(v))
                            .collect::<Result<Vec<_>, _>>()?,
                    ),
                };
                self.env.set(name.name, value);
                Ok(Value::Void)
            }
            Node::Func(decl) => {
                self.functions.define(Arc::clone(decl));
                Ok(Value::Void)
            }
            Node::Call(site) => self.eval_call(site),
            Node::Root { children } => self.eval_root(children),
        }
    }

    fn eval_ident(&self, ident: &Ident) -> EvalResult {
        match self.env.get(ident.name) {
            Some(value) => Ok(value.clone()),
            None => Err(undefined_variable(self.interner.lookup(ident.name))
                .with_token(&ident.token)
                .into()),
        }
    }

    fn eval_float(&mut self, node: &Node) -> Result<f64, ControlAction> {
        let value = self.eval(node)?;
        expect_float(&value).map_err(|e| at(node, e))
    }

    fn eval_bool(&mut self, node: &Node) -> Result<bool, ControlAction> {
        let value = self.eval(node)?;
        expect_bool(&value).map_err(|e| at(node, e))
    }

    fn eval_arith(&mut self, op: ArithOp, operands: &[Node]) -> EvalResult {
        // Two operands is by far the common shape.
        if let [lhs, rhs] = operands {
            let a = self.eval_float(lhs)?;
            let b = self.eval_float(rhs)?;
            return Ok(Value::Float(op.apply(a, b)));
        }
        let mut values: SmallVec<[f64; 8]> = SmallVec::with_capacity(operands.len());
        for operand in operands {
            values.push(self.eval_float(operand)?);
        }
        Ok(Value::Float(fold_arith(op, &values)))
    }

    fn eval_logic(&mut self, op: LogicOp, operands: &[Node]) -> EvalResult {
        let short = op.short_circuit_on();
        for operand in operands {
            if self.eval_bool(operand)? == short {
                return Ok(Value::Bool(short));
            }
        }
        Ok(Value::Bool(!short))
    }

    fn eval_for(
        &mut self,
        token: &Token,
        params: &[Ident],
        iterable: &Node,
        body: &[Node],
    ) -> EvalResult {
        let Some(var) = params.first() else {
            return Err(loop_arity(1, 0).with_token(token).into());
        };
        let prior = self.env.get(var.name).cloned();

        let outcome = match self.eval(iterable)? {
            Value::Array(items) => self.run_loop(var.name, items.iter().cloned(), body),
            Value::Float(bound) => {
                let counter = std::iter::successors(Some(0.0), |i| Some(i + 1.0))
                    .take_while(move |i| *i < bound)
                    .map(Value::Float);
                self.run_loop(var.name, counter, body)
            }
            other => return Err(at(iterable, invalid_iterator(other.kind().as_str()))),
        };

        // Without a prior binding the variable keeps its last value.
        if let Some(prior) = prior {
            self.env.set(var.name, prior);
        }
        outcome.map(|()| Value::Void)
    }

    fn run_loop(
        &mut self,
        var: Name,
        items: impl Iterator<Item = Value>,
        body: &[Node],
    ) -> Result<(), ControlAction> {
        for item in items {
            self.env.set(var, item);
            self.eval_block(body)?;
        }
        Ok(())
    }

    /// A top-level `return` ends the program with its value.
    fn eval_root(&mut self, children: &[Node]) -> EvalResult {
        self.eval_block(children).or_else(ControlAction::into_call_result)
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("env", &self.env)
            .field("functions", &self.functions.len())
            .field("jit", &self.jit)
            .finish_non_exhaustive()
    }
}
