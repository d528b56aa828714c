//! Programmatic construction of syntax trees.
//!
//! There is no parser in this workspace; hosts and tests build trees through
//! `AstBuilder`. Every token it creates carries the current position set by
//! [`AstBuilder::at`], so diagnostics point somewhere meaningful.

use std::cell::Cell;
use std::sync::Arc;

use crate::{
    ArithOp, CallSite, CompareOp, FunctionDecl, Ident, LogicOp, Node, SharedInterner, Span, Token,
};

/// Syntax tree builder bound to an interner.
pub struct AstBuilder {
    interner: SharedInterner,
    line: Cell<u32>,
    column: Cell<u32>,
}

impl AstBuilder {
    pub fn new(interner: SharedInterner) -> Self {
        AstBuilder {
            interner,
            line: Cell::new(1),
            column: Cell::new(1),
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Set the source position stamped on subsequently built tokens.
    pub fn at(&self, line: u32, column: u32) -> &Self {
        self.line.set(line);
        self.column.set(column);
        self
    }

    fn token(&self, raw: &str) -> Token {
        let len = u32::try_from(raw.len()).unwrap_or(u32::MAX);
        Token::new(Span::new(0, len), self.line.get(), self.column.get(), raw)
    }

    pub fn float(&self, value: f64) -> Node {
        Node::Float {
            token: self.token(&value.to_string()),
            value,
        }
    }

    pub fn string(&self, value: &str) -> Node {
        Node::Str {
            token: self.token(value),
            value: Arc::from(value),
        }
    }

    pub fn boolean(&self, value: bool) -> Node {
        Node::Boolean {
            token: self.token(if value { "true" } else { "false" }),
            value,
        }
    }

    pub fn array(&self, elements: Vec<Node>) -> Node {
        Node::Array {
            token: self.token("["),
            elements,
        }
    }

    /// An identifier without the node wrapper, for parameter and variable names.
    pub fn name(&self, name: &str) -> Ident {
        Ident::new(self.token(name), self.interner.intern(name))
    }

    pub fn ident(&self, name: &str) -> Node {
        Node::Ident(self.name(name))
    }

    pub fn arith(&self, op: ArithOp, operands: Vec<Node>) -> Node {
        Node::Arith {
            token: self.token(op.as_symbol()),
            op,
            operands,
        }
    }

    pub fn add(&self, operands: Vec<Node>) -> Node {
        self.arith(ArithOp::Add, operands)
    }

    pub fn sub(&self, operands: Vec<Node>) -> Node {
        self.arith(ArithOp::Sub, operands)
    }

    pub fn mul(&self, operands: Vec<Node>) -> Node {
        self.arith(ArithOp::Mul, operands)
    }

    pub fn div(&self, operands: Vec<Node>) -> Node {
        self.arith(ArithOp::Div, operands)
    }

    pub fn modulo(&self, operands: Vec<Node>) -> Node {
        self.arith(ArithOp::Mod, operands)
    }

    pub fn neg(&self, operand: Node) -> Node {
        Node::Neg {
            token: self.token("-"),
            operand: Box::new(operand),
        }
    }

    pub fn compare(&self, op: CompareOp, lhs: Node, rhs: Node) -> Node {
        Node::Compare {
            token: self.token(op.as_symbol()),
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn gt(&self, lhs: Node, rhs: Node) -> Node {
        self.compare(CompareOp::Gt, lhs, rhs)
    }

    pub fn lt(&self, lhs: Node, rhs: Node) -> Node {
        self.compare(CompareOp::Lt, lhs, rhs)
    }

    pub fn equal(&self, lhs: Node, rhs: Node) -> Node {
        self.compare(CompareOp::Equal, lhs, rhs)
    }

    pub fn logic(&self, op: LogicOp, operands: Vec<Node>) -> Node {
        Node::Logic {
            token: self.token(op.as_symbol()),
            op,
            operands,
        }
    }

    pub fn and(&self, operands: Vec<Node>) -> Node {
        self.logic(LogicOp::And, operands)
    }

    pub fn or(&self, operands: Vec<Node>) -> Node {
        self.logic(LogicOp::Or, operands)
    }

    pub fn if_(&self, condition: Node, body: Vec<Node>) -> Node {
        Node::If {
            token: self.token("if"),
            condition: Box::new(condition),
            body,
        }
    }

    /// A `for` loop binding `param` to each element in turn.
    pub fn for_(&self, param: &str, iterable: Node, body: Vec<Node>) -> Node {
        self.for_params(&[param], iterable, body)
    }

    /// A `for` loop with an explicit parameter list. Only the first parameter
    /// is bound; an empty list is an arity error at run time.
    pub fn for_params(&self, params: &[&str], iterable: Node, body: Vec<Node>) -> Node {
        Node::For {
            token: self.token("for"),
            params: params.iter().map(|p| self.name(p)).collect(),
            iterable: Box::new(iterable),
            body,
        }
    }

    pub fn ret(&self, value: Node) -> Node {
        Node::Return {
            token: self.token("return"),
            value: Box::new(value),
        }
    }

    pub fn var(&self, name: &str, values: Vec<Node>) -> Node {
        Node::Var {
            token: self.token("let"),
            name: self.name(name),
            values,
        }
    }

    pub fn func(&self, name: &str, params: &[&str], body: Vec<Node>) -> Node {
        Node::Func(Arc::new(FunctionDecl {
            token: self.token("fun"),
            name: self.name(name),
            params: params.iter().map(|p| self.name(p)).collect(),
            body,
        }))
    }

    pub fn call(&self, callee: &str, args: Vec<Node>) -> Node {
        Node::Call(CallSite::new(
            self.token(callee),
            self.interner.intern(callee),
            args,
        ))
    }

    pub fn root(&self, children: Vec<Node>) -> Node {
        Node::Root { children }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokens_carry_current_position() {
        let b = AstBuilder::new(SharedInterner::new());
        let node = b.at(4, 9).call("square", vec![b.float(2.0)]);
        let token = node.origin().cloned().unwrap_or_else(|| Token::synthetic(""));
        assert_eq!((token.line, token.column), (4, 9));
        assert_eq!(token.raw(), "square");
    }

    #[test]
    fn test_names_are_interned_once() {
        let interner = SharedInterner::new();
        let b = AstBuilder::new(interner.clone());
        let Node::Func(decl) = b.func("f", &["x"], vec![b.ident("x")]) else {
            panic!("expected a function node");
        };
        let Node::Ident(body_ident) = &decl.body[0] else {
            panic!("expected an identifier");
        };
        assert_eq!(decl.params[0].name, body_ident.name);
        assert_eq!(interner.lookup(decl.name.name), "f");
    }

    #[test]
    fn test_for_keeps_every_declared_parameter() {
        let b = AstBuilder::new(SharedInterner::new());
        let Node::For { params, .. } = b.for_params(&["i", "j"], b.float(3.0), vec![]) else {
            panic!("expected a for node");
        };
        assert_eq!(params.len(), 2);
    }
}
