//! Syntax tree node kinds.
//!
//! `Node` is a closed sum type: every kind the evaluator or the compiled tier
//! understands is a variant, and both consumers match on it exhaustively.
//!
//! Each node satisfies the same capability set:
//! - [`Node::children`] yields the child nodes
//! - [`Node::set_children`] replaces them
//! - [`Node::origin`] reports the source token (`None` only for `Root`)
//! - evaluation to a runtime value, provided by the interpreter

use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{Name, Token};

/// Child list returned by [`Node::children`].
pub type NodeChildren<'a> = SmallVec<[&'a Node; 4]>;

/// Arithmetic operators. All fold over two or more operands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }

    /// Apply the operator to two floats.
    ///
    /// `Mod` is IEEE `fmod`: the result takes the sign of the dividend.
    /// Division and modulo by zero produce infinity or NaN.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ArithOp::Add => lhs + rhs,
            ArithOp::Sub => lhs - rhs,
            ArithOp::Mul => lhs * rhs,
            ArithOp::Div => lhs / rhs,
            ArithOp::Mod => lhs % rhs,
        }
    }

    fn kind_name(self) -> &'static str {
        match self {
            ArithOp::Add => "Add",
            ArithOp::Sub => "Sub",
            ArithOp::Mul => "Mul",
            ArithOp::Div => "Div",
            ArithOp::Mod => "Mod",
        }
    }
}

/// Binary comparison operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Gt,
    Lt,
    Equal,
}

impl CompareOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Equal => "=",
        }
    }

    fn kind_name(self) -> &'static str {
        match self {
            CompareOp::Gt => "Gt",
            CompareOp::Lt => "Lt",
            CompareOp::Equal => "Equal",
        }
    }
}

/// Short-circuiting boolean combinators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        }
    }

    /// The operand value that ends evaluation early, which is also the result
    /// in that case: `false` for `And`, `true` for `Or`.
    #[inline]
    pub fn short_circuit_on(self) -> bool {
        matches!(self, LogicOp::Or)
    }

    fn kind_name(self) -> &'static str {
        match self {
            LogicOp::And => "And",
            LogicOp::Or => "Or",
        }
    }
}

/// An identifier occurrence: its interned key plus its token.
#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub token: Token,
    pub name: Name,
}

impl Ident {
    pub fn new(token: Token, name: Name) -> Self {
        Ident { token, name }
    }
}

/// A user function definition.
///
/// Shared by `Arc` between the syntax tree, the function table and the
/// background compiler; redefinition replaces the table entry with a new
/// declaration rather than mutating this one.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub token: Token,
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Vec<Node>,
}

impl FunctionDecl {
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A function invocation expression.
///
/// Each call site counts its own invocations; the counter only drives the
/// compile trigger and carries no language semantics. Cloning a call site
/// creates a new site with a fresh counter.
pub struct CallSite {
    pub token: Token,
    pub callee: Name,
    pub args: Vec<Node>,
    calls: AtomicU64,
}

impl CallSite {
    pub fn new(token: Token, callee: Name, args: Vec<Node>) -> Self {
        CallSite {
            token,
            callee,
            args,
            calls: AtomicU64::new(0),
        }
    }

    /// Invocations counted at this site so far.
    #[inline]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Count one more invocation, returning the new total.
    #[inline]
    pub fn record_call(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }
}

impl Clone for CallSite {
    fn clone(&self) -> Self {
        CallSite::new(self.token.clone(), self.callee, self.args.clone())
    }
}

impl PartialEq for CallSite {
    fn eq(&self, other: &Self) -> bool {
        self.callee == other.callee && self.args == other.args && self.token == other.token
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("callee", &self.callee)
            .field("args", &self.args)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

/// Syntax tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Float {
        token: Token,
        value: f64,
    },
    Str {
        token: Token,
        value: Arc<str>,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    Array {
        token: Token,
        elements: Vec<Node>,
    },
    Ident(Ident),
    /// `Add`, `Sub`, `Mul`, `Div` or `Mod` folded over two or more operands.
    Arith {
        token: Token,
        op: ArithOp,
        operands: Vec<Node>,
    },
    /// Numeric sign flip or boolean negation.
    Neg {
        token: Token,
        operand: Box<Node>,
    },
    Compare {
        token: Token,
        op: CompareOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Logic {
        token: Token,
        op: LogicOp,
        operands: Vec<Node>,
    },
    If {
        token: Token,
        condition: Box<Node>,
        body: Vec<Node>,
    },
    /// `for` over an array or a numeric upper bound. Only the first parameter
    /// is bound; at least one is required.
    For {
        token: Token,
        params: Vec<Ident>,
        iterable: Box<Node>,
        body: Vec<Node>,
    },
    Return {
        token: Token,
        value: Box<Node>,
    },
    Var {
        token: Token,
        name: Ident,
        values: Vec<Node>,
    },
    Func(Arc<FunctionDecl>),
    Call(CallSite),
    Root {
        children: Vec<Node>,
    },
}

impl Node {
    /// Yield the child nodes.
    ///
    /// Declarations and control nodes report their bodies; operators report
    /// their operands; calls report their arguments.
    pub fn children(&self) -> NodeChildren<'_> {
        match self {
            Node::Float { .. } | Node::Str { .. } | Node::Boolean { .. } | Node::Ident(_) => {
                SmallVec::new()
            }
            Node::Array { elements: nodes, .. }
            | Node::Arith { operands: nodes, .. }
            | Node::Logic { operands: nodes, .. }
            | Node::If { body: nodes, .. }
            | Node::For { body: nodes, .. }
            | Node::Var { values: nodes, .. }
            | Node::Root { children: nodes } => nodes.iter().collect(),
            Node::Neg { operand, .. } => smallvec::smallvec![&**operand],
            Node::Compare { lhs, rhs, .. } => smallvec::smallvec![&**lhs, &**rhs],
            Node::Return { value, .. } => smallvec::smallvec![&**value],
            Node::Func(decl) => decl.body.iter().collect(),
            Node::Call(site) => site.args.iter().collect(),
        }
    }

    /// Replace the child nodes reported by [`Node::children`].
    ///
    /// Fixed-arity nodes (`Neg`, `Return`, `Compare`) ignore a sequence of the
    /// wrong length; leaves ignore the call entirely.
    pub fn set_children(&mut self, children: Vec<Node>) {
        match self {
            Node::Float { .. } | Node::Str { .. } | Node::Boolean { .. } | Node::Ident(_) => {}
            Node::Array { elements: nodes, .. }
            | Node::Arith { operands: nodes, .. }
            | Node::Logic { operands: nodes, .. }
            | Node::If { body: nodes, .. }
            | Node::For { body: nodes, .. }
            | Node::Var { values: nodes, .. }
            | Node::Root { children: nodes } => *nodes = children,
            Node::Neg { operand: child, .. } | Node::Return { value: child, .. } => {
                if let Ok([only]) = <[Node; 1]>::try_from(children) {
                    **child = only;
                }
            }
            Node::Compare { lhs, rhs, .. } => {
                if let Ok([first, second]) = <[Node; 2]>::try_from(children) {
                    **lhs = first;
                    **rhs = second;
                }
            }
            Node::Func(decl) => Arc::make_mut(decl).body = children,
            Node::Call(site) => site.args = children,
        }
    }

    /// Source token of this node, `None` for the tree root.
    pub fn origin(&self) -> Option<&Token> {
        match self {
            Node::Float { token, .. }
            | Node::Str { token, .. }
            | Node::Boolean { token, .. }
            | Node::Array { token, .. }
            | Node::Arith { token, .. }
            | Node::Neg { token, .. }
            | Node::Compare { token, .. }
            | Node::Logic { token, .. }
            | Node::If { token, .. }
            | Node::For { token, .. }
            | Node::Return { token, .. }
            | Node::Var { token, .. } => Some(token),
            Node::Ident(ident) => Some(&ident.token),
            Node::Func(decl) => Some(&decl.token),
            Node::Call(site) => Some(&site.token),
            Node::Root { .. } => None,
        }
    }

    /// Human-readable kind name, used in diagnostics and compiler logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Float { .. } => "Float",
            Node::Str { .. } => "String",
            Node::Boolean { .. } => "Boolean",
            Node::Array { .. } => "Array",
            Node::Ident(_) => "Ident",
            Node::Arith { op, .. } => op.kind_name(),
            Node::Neg { .. } => "Neg",
            Node::Compare { op, .. } => op.kind_name(),
            Node::Logic { op, .. } => op.kind_name(),
            Node::If { .. } => "If",
            Node::For { .. } => "For",
            Node::Return { .. } => "Return",
            Node::Var { .. } => "Var",
            Node::Func(_) => "Func",
            Node::Call(_) => "Call",
            Node::Root { .. } => "Root",
        }
    }
}

#[cfg(test)]
mod tests;
