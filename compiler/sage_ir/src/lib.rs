//! Sage IR - syntax tree and identifier types.
//!
//! This crate contains the data structures shared by the evaluator and the
//! compiled tier:
//! - `Span` and `Token` for source positions (diagnostics only)
//! - `Name` for interned identifiers, produced by `StringInterner`
//! - `Node`, the closed sum type of every syntax tree element
//! - `AstBuilder` for constructing trees without a parser
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers become `Name(u32)` keys
//! - **Closed Kinds**: every node kind is an enum variant, so evaluation and
//!   lowering are exhaustive `match`es checked by the compiler
//! - **Owned Trees**: every node owns its children; nothing is shared or cyclic,
//!   except function declarations, which are `Arc`-shared read-only with the
//!   background compiler

pub mod ast;
mod builder;
mod interner;
mod name;
mod span;
mod token;

pub use ast::{
    ArithOp, CallSite, CompareOp, FunctionDecl, Ident, LogicOp, Node, NodeChildren,
};
pub use builder::AstBuilder;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use token::Token;
