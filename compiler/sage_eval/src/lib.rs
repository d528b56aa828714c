//! Sage Eval - tree-walking evaluator with tiered dispatch.
//!
//! # Architecture
//!
//! - `Environment`: global bindings plus one frame per active call
//! - `FunctionTable`: user definitions and host built-ins by name
//! - `Interpreter`: evaluation rules for every node kind; user calls consult
//!   the shared [`sage_jit::Jit`] and run compiled code once it exists
//! - operator helpers working on already-evaluated values
//!
//! Script evaluation is single-threaded; the only concurrency is the compiled
//! tier's background workers.

mod environment;
mod function_table;
pub mod interpreter;
mod operators;
mod print_handler;
mod stack;

pub use environment::Environment;
pub use function_table::{BuiltinFn, FunctionEntry, FunctionTable, UserFunction};
pub use interpreter::{CallFrameGuard, Interpreter, InterpreterBuilder};
pub use operators::{evaluate_compare, evaluate_neg, expect_bool, expect_float, fold_arith};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use stack::ensure_sufficient_stack;

pub use sage_value::{ControlAction, EvalError, EvalResult, Value};
