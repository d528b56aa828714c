//! Operator semantics on already-evaluated values.
//!
//! The interpreter evaluates operands in order and feeds them here one at a
//! time, so a type error stops evaluation at the offending operand.

use sage_ir::{ArithOp, CompareOp};
use sage_value::{type_mismatch, EvalError, Value};

/// Coerce an arithmetic operand.
#[inline]
pub fn expect_float(value: &Value) -> Result<f64, EvalError> {
    value
        .as_float()
        .ok_or_else(|| type_mismatch("float", value.kind().as_str()))
}

/// Coerce a boolean operand (conditions, `&&`, `||`).
#[inline]
pub fn expect_bool(value: &Value) -> Result<bool, EvalError> {
    value
        .as_bool()
        .ok_or_else(|| type_mismatch("bool", value.kind().as_str()))
}

/// Left fold over already-coerced operands.
///
/// No operands yields `0`; a single operand is returned unchanged.
pub fn fold_arith(op: ArithOp, operands: &[f64]) -> f64 {
    match operands {
        [] => 0.0,
        [first, rest @ ..] => rest.iter().fold(*first, |acc, x| op.apply(acc, *x)),
    }
}

/// `-x` on floats, `!x` on bools.
pub fn evaluate_neg(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Float(f) => Ok(Value::Float(-f)),
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(type_mismatch("float or bool", other.kind().as_str())),
    }
}

/// `>`/`<` need two floats; `=` compares any two values structurally.
pub fn evaluate_compare(op: CompareOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        CompareOp::Gt => Ok(Value::Bool(expect_float(lhs)? > expect_float(rhs)?)),
        CompareOp::Lt => Ok(Value::Bool(expect_float(lhs)? < expect_float(rhs)?)),
        CompareOp::Equal => Ok(Value::Bool(lhs == rhs)),
    }
}
