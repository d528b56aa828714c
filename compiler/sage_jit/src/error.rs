//! Compiled-tier errors.
//!
//! None of these reach the user: every failure is logged and the function
//! keeps running in the interpreter.

use sage_value::ValueKind;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum JitError {
    #[error("node kind {kind} is not supported by the compiled tier")]
    UnsupportedNode { kind: &'static str },

    #[error("unsupported type {kind} for argument {position}, skipping compilation")]
    UnsupportedArgument { position: usize, kind: ValueKind },

    #[error("variable {name:?} has {count} initializers, only one is supported")]
    MultipleInitializers { name: String, count: usize },

    #[error("identifier {name:?} is neither a parameter nor a local")]
    UnknownIdentifier { name: String },

    #[error("{node} expects {expected}, found {found}")]
    TypeMismatch {
        node: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("{node} needs at least {min} operands, found {found}")]
    InvalidOperandCount {
        node: &'static str,
        min: usize,
        found: usize,
    },

    #[error("function has more than {limit} {what}")]
    TooLarge { what: &'static str, limit: usize },

    #[error("verification failed at {pc}: {reason}")]
    Verification { pc: usize, reason: String },

    #[error("entry point {found:?} does not match function {expected:?}")]
    EntryPointMismatch { expected: String, found: String },

    #[error("compile queue is full")]
    QueueFull,

    #[error("compile pool is shut down")]
    PoolClosed,

    #[error("compiled code faulted at {pc}: {reason}")]
    Fault { pc: usize, reason: &'static str },
}
