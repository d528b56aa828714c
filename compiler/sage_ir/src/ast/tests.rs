use super::*;
use crate::{AstBuilder, SharedInterner};
use pretty_assertions::assert_eq;

fn builder() -> AstBuilder {
    AstBuilder::new(SharedInterner::new())
}

#[test]
fn test_leaves_have_no_children() {
    let b = builder();
    for leaf in [b.float(1.0), b.string("s"), b.boolean(true), b.ident("x")] {
        assert!(leaf.children().is_empty(), "{} has children", leaf.kind_name());
    }
}

#[test]
fn test_operator_children_are_operands_in_order() {
    let b = builder();
    let node = b.add(vec![b.float(1.0), b.float(2.0), b.float(3.0)]);
    let values: Vec<f64> = node
        .children()
        .iter()
        .filter_map(|n| match n {
            Node::Float { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_compare_children_are_lhs_then_rhs() {
    let b = builder();
    let node = b.gt(b.ident("a"), b.float(0.0));
    let children = node.children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].kind_name(), "Ident");
    assert_eq!(children[1].kind_name(), "Float");
}

#[test]
fn test_control_nodes_report_their_bodies() {
    let b = builder();
    let node = b.if_(b.boolean(true), vec![b.float(1.0), b.float(2.0)]);
    assert_eq!(node.children().len(), 2);

    let func = b.func("f", &["x"], vec![b.ret(b.ident("x"))]);
    assert_eq!(func.children().len(), 1);
    assert_eq!(func.children()[0].kind_name(), "Return");
}

#[test]
fn test_set_children_replaces_variadic_children() {
    let b = builder();
    let mut node = b.mul(vec![b.float(1.0), b.float(2.0)]);
    node.set_children(vec![b.float(7.0), b.float(8.0), b.float(9.0)]);
    assert_eq!(node.children().len(), 3);
}

#[test]
fn test_set_children_ignores_wrong_length_on_fixed_arity() {
    let b = builder();
    let mut node = b.lt(b.float(1.0), b.float(2.0));
    let before = node.clone();
    node.set_children(vec![b.float(3.0)]);
    assert_eq!(node, before);

    let mut neg = b.neg(b.float(1.0));
    neg.set_children(vec![]);
    assert_eq!(neg.children().len(), 1);

    neg.set_children(vec![b.boolean(false)]);
    assert_eq!(neg.children()[0].kind_name(), "Boolean");
}

#[test]
fn test_set_children_on_function_copies_shared_declaration() {
    let b = builder();
    let mut func = b.func("f", &[], vec![b.float(1.0)]);
    let shared = func.clone();
    func.set_children(vec![b.float(2.0), b.float(3.0)]);
    assert_eq!(func.children().len(), 2);
    assert_eq!(shared.children().len(), 1);
}

#[test]
fn test_origin_is_absent_only_for_root() {
    let b = builder();
    let root = b.root(vec![b.float(1.0)]);
    assert!(root.origin().is_none());
    assert_eq!(root.children()[0].origin().map(Token::raw), Some("1"));
}

#[test]
fn test_call_site_counters_are_independent() {
    let b = builder();
    let (Node::Call(first), Node::Call(second)) = (b.call("f", vec![]), b.call("f", vec![])) else {
        panic!("expected call nodes");
    };
    assert_eq!(first.record_call(), 1);
    assert_eq!(first.record_call(), 2);
    assert_eq!(second.calls(), 0);
}

#[test]
fn test_cloned_call_site_starts_fresh() {
    let b = builder();
    let Node::Call(site) = b.call("f", vec![b.float(1.0)]) else {
        panic!("expected a call node");
    };
    site.record_call();
    let copy = site.clone();
    assert_eq!(copy.calls(), 0);
    assert_eq!(copy, site);
}

#[test]
fn test_fmod_takes_sign_of_dividend() {
    assert_eq!(ArithOp::Mod.apply(-7.0, 3.0), -1.0);
    assert_eq!(ArithOp::Mod.apply(7.0, -3.0), 1.0);
    assert!(ArithOp::Mod.apply(1.0, 0.0).is_nan());
    assert!(ArithOp::Div.apply(1.0, 0.0).is_infinite());
}
