//! Executor for compiled functions.
//!
//! Verified code cannot underflow the stack or index out of range, but the
//! executor still checks and reports a [`JitError::Fault`] instead of
//! panicking; the caller falls back to interpretation. Reading a local that
//! was declared on a branch not taken is also a fault.

use sage_value::Value;
use smallvec::{smallvec, SmallVec};

use crate::bytecode::{CompiledFunction, Op};
use crate::JitError;

struct Frame {
    stack: SmallVec<[Value; 16]>,
    slots: SmallVec<[Option<Value>; 8]>,
}

impl Frame {
    #[inline]
    fn pop(&mut self, pc: usize) -> Result<Value, JitError> {
        self.stack.pop().ok_or(JitError::Fault {
            pc,
            reason: "stack underflow",
        })
    }

    #[inline]
    fn pop_float(&mut self, pc: usize) -> Result<f64, JitError> {
        self.pop(pc)?.as_float().ok_or(JitError::Fault {
            pc,
            reason: "expected a float operand",
        })
    }

    #[inline]
    fn pop_bool(&mut self, pc: usize) -> Result<bool, JitError> {
        self.pop(pc)?.as_bool().ok_or(JitError::Fault {
            pc,
            reason: "expected a bool operand",
        })
    }

    #[inline]
    fn float_binary(&mut self, pc: usize, f: impl FnOnce(f64, f64) -> Value) -> Result<(), JitError> {
        let rhs = self.pop_float(pc)?;
        let lhs = self.pop_float(pc)?;
        self.stack.push(f(lhs, rhs));
        Ok(())
    }
}

/// Run `function` on `args`. The caller has already checked the signature.
pub fn execute(function: &CompiledFunction, args: &[Value]) -> Result<Value, JitError> {
    let mut frame = Frame {
        stack: SmallVec::new(),
        slots: smallvec![None; function.slot_count],
    };
    for (slot, arg) in frame.slots.iter_mut().zip(args) {
        *slot = Some(arg.clone());
    }

    let mut pc = 0;
    loop {
        let at = pc;
        let op = *function.code.get(at).ok_or(JitError::Fault {
            pc: at,
            reason: "ran past the end of the code",
        })?;
        pc += 1;

        match op {
            Op::Const(i) => {
                let value = function.constants.get(usize::from(i)).cloned().ok_or(JitError::Fault {
                    pc: at,
                    reason: "constant out of range",
                })?;
                frame.stack.push(value);
            }
            Op::Load(i) => {
                let value = frame
                    .slots
                    .get(usize::from(i))
                    .and_then(Clone::clone)
                    .ok_or(JitError::Fault {
                        pc: at,
                        reason: "read of an unbound local",
                    })?;
                frame.stack.push(value);
            }
            Op::Store(i) => {
                let value = frame.pop(at)?;
                let slot = frame.slots.get_mut(usize::from(i)).ok_or(JitError::Fault {
                    pc: at,
                    reason: "slot out of range",
                })?;
                *slot = Some(value);
            }
            Op::AddF => frame.float_binary(at, |a, b| Value::Float(a + b))?,
            Op::SubF => frame.float_binary(at, |a, b| Value::Float(a - b))?,
            Op::MulF => frame.float_binary(at, |a, b| Value::Float(a * b))?,
            Op::DivF => frame.float_binary(at, |a, b| Value::Float(a / b))?,
            Op::GtF => frame.float_binary(at, |a, b| Value::Bool(a > b))?,
            Op::LtF => frame.float_binary(at, |a, b| Value::Bool(a < b))?,
            Op::NegF => {
                let value = frame.pop_float(at)?;
                frame.stack.push(Value::Float(-value));
            }
            Op::Not => {
                let value = frame.pop_bool(at)?;
                frame.stack.push(Value::Bool(!value));
            }
            Op::Eq => {
                let rhs = frame.pop(at)?;
                let lhs = frame.pop(at)?;
                frame.stack.push(Value::Bool(lhs == rhs));
            }
            Op::MakeArray(n) => {
                let n = usize::from(n);
                let Some(start) = frame.stack.len().checked_sub(n) else {
                    return Err(JitError::Fault {
                        pc: at,
                        reason: "stack underflow",
                    });
                };
                let items: Vec<Value> = frame.stack.drain(start..).collect();
                frame.stack.push(Value::array(items));
            }
            Op::JumpIfFalse(target) => {
                if !frame.pop_bool(at)? {
                    pc = target as usize;
                }
            }
            Op::JumpIfTrue(target) => {
                if frame.pop_bool(at)? {
                    pc = target as usize;
                }
            }
            Op::Jump(target) => pc = target as usize,
            Op::Pop => {
                frame.pop(at)?;
            }
            Op::Return => return frame.pop(at),
        }
    }
}

#[cfg(test)]
mod tests;
