//! Verification of lowered code before it is installed.
//!
//! This is the "load and resolve" step: the entry name must match the
//! declaration, every index and jump target must be in bounds, and the
//! stack depth must agree on every path into an instruction.

use sage_ir::{FunctionDecl, StringInterner};

use crate::bytecode::{CompiledFunction, Op};
use crate::JitError;

fn reject(pc: usize, reason: impl Into<String>) -> JitError {
    JitError::Verification {
        pc,
        reason: reason.into(),
    }
}

pub fn verify(
    function: &CompiledFunction,
    decl: &FunctionDecl,
    interner: &StringInterner,
) -> Result<(), JitError> {
    if function.name != decl.name.name {
        return Err(JitError::EntryPointMismatch {
            expected: interner.lookup(decl.name.name).to_string(),
            found: function.display_name.clone(),
        });
    }
    if function.signature.len() > function.slot_count {
        return Err(reject(0, "fewer slots than parameters"));
    }
    if function.code.is_empty() {
        return Err(reject(0, "empty code"));
    }

    for (pc, op) in function.code.iter().enumerate() {
        match *op {
            Op::Const(i) if usize::from(i) >= function.constants.len() => {
                return Err(reject(pc, format!("constant {i} out of range")));
            }
            Op::Load(i) | Op::Store(i) if usize::from(i) >= function.slot_count => {
                return Err(reject(pc, format!("slot {i} out of range")));
            }
            _ => {}
        }
        if let Some(target) = op.target() {
            if target as usize >= function.code.len() {
                return Err(reject(pc, format!("jump target {target} out of range")));
            }
        }
    }

    check_stack_depth(&function.code)
}

/// Walk every reachable path, recording the stack depth on entry to each
/// instruction.
fn check_stack_depth(code: &[Op]) -> Result<(), JitError> {
    let mut depth_at: Vec<Option<usize>> = vec![None; code.len()];
    let mut worklist = vec![(0usize, 0usize)];

    while let Some((pc, depth)) = worklist.pop() {
        let Some(&op) = code.get(pc) else {
            return Err(reject(pc, "control falls off the end of the code"));
        };
        match depth_at[pc] {
            Some(seen) if seen == depth => continue,
            Some(seen) => {
                return Err(reject(
                    pc,
                    format!("stack depth {depth} disagrees with {seen} on another path"),
                ));
            }
            None => depth_at[pc] = Some(depth),
        }

        let (pops, pushes) = op.stack_effect();
        let Some(after) = depth.checked_sub(pops) else {
            return Err(reject(pc, "stack underflow"));
        };
        let after = after + pushes;

        match op {
            Op::Return => {}
            Op::Jump(target) => worklist.push((target as usize, after)),
            Op::JumpIfFalse(target) | Op::JumpIfTrue(target) => {
                worklist.push((target as usize, after));
                worklist.push((pc + 1, after));
            }
            _ => worklist.push((pc + 1, after)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::lower;
    use sage_ir::{AstBuilder, Node, SharedInterner};
    use sage_value::{Value, ValueKind};

    fn decl(node: Node) -> std::sync::Arc<FunctionDecl> {
        match node {
            Node::Func(decl) => decl,
            other => panic!("expected a function, got {}", other.kind_name()),
        }
    }

    fn hand_written(code: Vec<Op>, constants: Vec<Value>, b: &AstBuilder) -> CompiledFunction {
        CompiledFunction {
            name: b.interner().intern("f"),
            display_name: "f".to_string(),
            signature: vec![],
            constants,
            code,
            slot_count: 0,
        }
    }

    #[test]
    fn test_lowered_code_verifies() {
        let b = AstBuilder::new(SharedInterner::new());
        let d = decl(
            b.func(
                "f",
                &["a"],
                vec![
                    b.if_(b.gt(b.ident("a"), b.float(0.0)), vec![b.ret(b.ident("a"))]),
                    b.and(vec![b.boolean(true), b.boolean(false)]),
                ],
            ),
        );
        let f = lower(&d, &[ValueKind::Float], b.interner());
        assert!(f.is_ok_and(|f| verify(&f, &d, b.interner()).is_ok()));
    }

    #[test]
    fn test_entry_name_must_match() {
        let b = AstBuilder::new(SharedInterner::new());
        let d = decl(b.func("g", &[], vec![]));
        let f = hand_written(vec![Op::Const(0), Op::Return], vec![Value::Void], &b);
        assert!(matches!(
            verify(&f, &d, b.interner()),
            Err(JitError::EntryPointMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_range_constant_rejected() {
        let b = AstBuilder::new(SharedInterner::new());
        let d = decl(b.func("f", &[], vec![]));
        let f = hand_written(vec![Op::Const(3), Op::Return], vec![], &b);
        assert!(matches!(
            verify(&f, &d, b.interner()),
            Err(JitError::Verification { pc: 0, .. })
        ));
    }

    #[test]
    fn test_underflow_rejected() {
        let b = AstBuilder::new(SharedInterner::new());
        let d = decl(b.func("f", &[], vec![]));
        let f = hand_written(vec![Op::AddF, Op::Return], vec![], &b);
        assert!(matches!(
            verify(&f, &d, b.interner()),
            Err(JitError::Verification { pc: 0, .. })
        ));
    }

    #[test]
    fn test_falling_off_the_end_rejected() {
        let b = AstBuilder::new(SharedInterner::new());
        let d = decl(b.func("f", &[], vec![]));
        let f = hand_written(vec![Op::Const(0)], vec![Value::Void], &b);
        assert!(verify(&f, &d, b.interner()).is_err());
    }

    #[test]
    fn test_disagreeing_depths_rejected() {
        let b = AstBuilder::new(SharedInterner::new());
        let d = decl(b.func("f", &[], vec![]));
        // One path pushes an extra value before the join at 4.
        let code = vec![
            Op::Const(0),
            Op::JumpIfFalse(4),
            Op::Const(1),
            Op::Const(1),
            Op::Const(1),
            Op::Return,
        ];
        let f = hand_written(code, vec![Value::Bool(true), Value::Float(1.0)], &b);
        assert!(matches!(
            verify(&f, &d, b.interner()),
            Err(JitError::Verification { pc: 4, .. })
        ));
    }
}
