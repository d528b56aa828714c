//! Type-specialized bytecode produced by lowering.
//!
//! The instruction set is a small stack machine. Operand types were checked
//! during lowering, so arithmetic instructions only ever see floats and
//! branch instructions only ever see booleans.

use sage_ir::Name;
use sage_value::{Value, ValueKind};
use std::fmt;

/// Index into a function's constant pool or local slots.
pub type Index = u16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Push `constants[i]`.
    Const(Index),
    /// Push local slot `i`. Parameters occupy the first slots.
    Load(Index),
    /// Pop into local slot `i`.
    Store(Index),
    AddF,
    SubF,
    MulF,
    DivF,
    NegF,
    Not,
    GtF,
    LtF,
    /// Structural equality of any two values.
    Eq,
    /// Pop `n` values and push them as an array, first-pushed first.
    MakeArray(Index),
    /// Pop a boolean and jump if it is false.
    JumpIfFalse(u32),
    /// Pop a boolean and jump if it is true.
    JumpIfTrue(u32),
    Jump(u32),
    Pop,
    /// Pop the result and leave the function.
    Return,
}

impl Op {
    /// Values popped and pushed by this instruction.
    pub fn stack_effect(self) -> (usize, usize) {
        match self {
            Op::Const(_) | Op::Load(_) => (0, 1),
            Op::Store(_) | Op::Pop | Op::JumpIfFalse(_) | Op::JumpIfTrue(_) | Op::Return => (1, 0),
            Op::AddF | Op::SubF | Op::MulF | Op::DivF | Op::GtF | Op::LtF | Op::Eq => (2, 1),
            Op::NegF | Op::Not => (1, 1),
            Op::MakeArray(n) => (usize::from(n), 1),
            Op::Jump(_) => (0, 0),
        }
    }

    /// Jump target, if this is a branch.
    pub fn target(self) -> Option<u32> {
        match self {
            Op::JumpIfFalse(t) | Op::JumpIfTrue(t) | Op::Jump(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Const(i) => write!(f, "const {i}"),
            Op::Load(i) => write!(f, "load {i}"),
            Op::Store(i) => write!(f, "store {i}"),
            Op::AddF => f.write_str("add.f"),
            Op::SubF => f.write_str("sub.f"),
            Op::MulF => f.write_str("mul.f"),
            Op::DivF => f.write_str("div.f"),
            Op::NegF => f.write_str("neg.f"),
            Op::Not => f.write_str("not"),
            Op::GtF => f.write_str("gt.f"),
            Op::LtF => f.write_str("lt.f"),
            Op::Eq => f.write_str("eq"),
            Op::MakeArray(n) => write!(f, "array {n}"),
            Op::JumpIfFalse(t) => write!(f, "jump_if_false {t:04}"),
            Op::JumpIfTrue(t) => write!(f, "jump_if_true {t:04}"),
            Op::Jump(t) => write!(f, "jump {t:04}"),
            Op::Pop => f.write_str("pop"),
            Op::Return => f.write_str("return"),
        }
    }
}

/// A compiled function: the entry point installed on success.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledFunction {
    /// Exported entry name; must match the declaration it was compiled from.
    pub name: Name,
    pub display_name: String,
    /// Argument kinds this code is specialized for.
    pub signature: Vec<ValueKind>,
    pub constants: Vec<Value>,
    pub code: Vec<Op>,
    /// Parameters plus locals.
    pub slot_count: usize,
}

impl CompiledFunction {
    /// Whether `args` match the specialized signature.
    pub fn accepts(&self, args: &[Value]) -> bool {
        args.len() == self.signature.len()
            && args
                .iter()
                .zip(&self.signature)
                .all(|(arg, kind)| arg.kind() == *kind)
    }
}

/// Listing used by the debug log.
impl fmt::Display for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.display_name)?;
        for (i, kind) in self.signature.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}")?;
        }
        writeln!(f, ") slots={}", self.slot_count)?;
        for (i, constant) in self.constants.iter().enumerate() {
            writeln!(f, "  c{i} = {constant:?}")?;
        }
        for (pc, op) in self.code.iter().enumerate() {
            writeln!(f, "  {pc:04} {op}")?;
        }
        Ok(())
    }
}
