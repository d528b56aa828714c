//! Runtime values and evaluation errors shared by the interpreter and the
//! compiled tier.

mod errors;
mod value;

pub use errors::{
    arity_mismatch, host_error, invalid_iterator, loop_arity, type_mismatch, undefined_function,
    undefined_variable, ControlAction, EvalError, EvalErrorKind, EvalResult,
};
pub use value::{Value, ValueKind};
