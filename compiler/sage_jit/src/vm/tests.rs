use super::*;
use crate::lower::lower;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sage_ir::{AstBuilder, FunctionDecl, Node, SharedInterner};
use sage_value::ValueKind;
use std::sync::Arc;

fn decl(node: Node) -> Arc<FunctionDecl> {
    match node {
        Node::Func(decl) => decl,
        other => panic!("expected a function, got {}", other.kind_name()),
    }
}

fn compile(b: &AstBuilder, params: &[&str], signature: &[ValueKind], body: Vec<Node>) -> CompiledFunction {
    match lower(&decl(b.func("f", params, body)), signature, b.interner()) {
        Ok(f) => f,
        Err(e) => panic!("lowering failed: {e}"),
    }
}

fn floats(n: usize) -> Vec<ValueKind> {
    vec![ValueKind::Float; n]
}

#[test]
fn test_add_two_floats() {
    let b = AstBuilder::new(SharedInterner::new());
    let f = compile(
        &b,
        &["a", "b"],
        &floats(2),
        vec![b.ret(b.add(vec![b.ident("a"), b.ident("b")]))],
    );
    assert_eq!(
        execute(&f, &[Value::Float(2.0), Value::Float(3.0)]),
        Ok(Value::Float(5.0))
    );
}

#[test]
fn test_early_return_from_if() {
    let b = AstBuilder::new(SharedInterner::new());
    // if n < 2 { return n }; return n * 10
    let f = compile(
        &b,
        &["n"],
        &floats(1),
        vec![
            b.if_(b.lt(b.ident("n"), b.float(2.0)), vec![b.ret(b.ident("n"))]),
            b.ret(b.mul(vec![b.ident("n"), b.float(10.0)])),
        ],
    );
    assert_eq!(execute(&f, &[Value::Float(1.0)]), Ok(Value::Float(1.0)));
    assert_eq!(execute(&f, &[Value::Float(4.0)]), Ok(Value::Float(40.0)));
}

#[test]
fn test_body_value_without_return_is_last_statement() {
    let b = AstBuilder::new(SharedInterner::new());
    let f = compile(&b, &["a"], &floats(1), vec![b.neg(b.ident("a"))]);
    assert_eq!(execute(&f, &[Value::Float(3.0)]), Ok(Value::Float(-3.0)));
}

#[test]
fn test_logic_short_circuits() {
    let b = AstBuilder::new(SharedInterner::new());
    let and = compile(
        &b,
        &["x", "y"],
        &[ValueKind::Bool, ValueKind::Bool],
        vec![b.and(vec![b.ident("x"), b.ident("y")])],
    );
    let or = compile(
        &b,
        &["x", "y"],
        &[ValueKind::Bool, ValueKind::Bool],
        vec![b.or(vec![b.ident("x"), b.ident("y")])],
    );
    for x in [false, true] {
        for y in [false, true] {
            let args = [Value::Bool(x), Value::Bool(y)];
            assert_eq!(execute(&and, &args), Ok(Value::Bool(x && y)));
            assert_eq!(execute(&or, &args), Ok(Value::Bool(x || y)));
        }
    }
}

#[test]
fn test_negating_a_bool_is_not() {
    let b = AstBuilder::new(SharedInterner::new());
    let f = compile(&b, &["x"], &[ValueKind::Bool], vec![b.neg(b.ident("x"))]);
    assert_eq!(execute(&f, &[Value::Bool(true)]), Ok(Value::Bool(false)));
}

#[test]
fn test_array_literal_builds_in_order() {
    let b = AstBuilder::new(SharedInterner::new());
    let f = compile(
        &b,
        &["s"],
        &[ValueKind::Str],
        vec![b.array(vec![b.float(1.0), b.ident("s"), b.boolean(true)])],
    );
    assert_eq!(
        execute(&f, &[Value::string("x")]),
        Ok(Value::array(vec![
            Value::Float(1.0),
            Value::string("x"),
            Value::Bool(true)
        ]))
    );
}

#[test]
fn test_equality_is_structural() {
    let b = AstBuilder::new(SharedInterner::new());
    let f = compile(
        &b,
        &["a", "b"],
        &[ValueKind::Str, ValueKind::Str],
        vec![b.equal(b.ident("a"), b.ident("b"))],
    );
    assert_eq!(
        execute(&f, &[Value::string("hi"), Value::string("hi")]),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        execute(&f, &[Value::string("hi"), Value::string("ho")]),
        Ok(Value::Bool(false))
    );
}

#[test]
fn test_local_bound_on_skipped_branch_faults() {
    let b = AstBuilder::new(SharedInterner::new());
    let f = compile(
        &b,
        &["c"],
        &[ValueKind::Bool],
        vec![
            b.if_(b.ident("c"), vec![b.var("y", vec![b.float(1.0)])]),
            b.ret(b.ident("y")),
        ],
    );
    assert_eq!(execute(&f, &[Value::Bool(true)]), Ok(Value::Float(1.0)));
    assert!(matches!(
        execute(&f, &[Value::Bool(false)]),
        Err(JitError::Fault {
            reason: "read of an unbound local",
            ..
        })
    ));
}

#[test]
fn test_hand_written_underflow_faults() {
    let f = CompiledFunction {
        name: SharedInterner::new().intern("f"),
        display_name: "f".to_string(),
        signature: vec![],
        constants: vec![],
        code: vec![Op::AddF, Op::Return],
        slot_count: 0,
    };
    assert!(matches!(execute(&f, &[]), Err(JitError::Fault { pc: 0, .. })));
}

fn fold(op: fn(f64, f64) -> f64, xs: &[f64]) -> f64 {
    xs[1..].iter().fold(xs[0], |acc, x| op(acc, *x))
}

proptest! {
    #[test]
    fn compiled_arithmetic_matches_left_fold(
        xs in prop::collection::vec(-1.0e6f64..1.0e6, 2..6),
        which in 0usize..4,
    ) {
        let b = AstBuilder::new(SharedInterner::new());
        let names: Vec<String> = (0..xs.len()).map(|i| format!("p{i}")).collect();
        let params: Vec<&str> = names.iter().map(String::as_str).collect();
        let operands = params.iter().map(|p| b.ident(p)).collect();
        let (body, op): (Node, fn(f64, f64) -> f64) = match which {
            0 => (b.add(operands), |x, y| x + y),
            1 => (b.sub(operands), |x, y| x - y),
            2 => (b.mul(operands), |x, y| x * y),
            _ => (b.div(operands), |x, y| x / y),
        };
        let f = compile(&b, &params, &floats(xs.len()), vec![body]);
        let args: Vec<Value> = xs.iter().copied().map(Value::Float).collect();
        let Ok(Value::Float(got)) = execute(&f, &args) else {
            panic!("expected a float result");
        };
        let want = fold(op, &xs);
        prop_assert!(got == want || (got.is_nan() && want.is_nan()));
    }
}
