//! cbind macro engine
//!
//! Turns the body of an object-like `#define` into something a binding
//! generator can reason about:
//! - `lexer`: C tokens with maximal-munch operators and the C literal grammar
//! - `parser`: precedence climbing, with speculative `(identifier)` casts
//! - `infer`: bottom-up type inference and compile-time-constant classification
//! - `rewrite`: precedence-aware re-serialization in target infix syntax
//!
//! Macros may reference other macros by name. Those lookups go through
//! [`MacroEnv`], so this crate has no knowledge of where macros are stored.
//!
//! # Failure Model
//!
//! A body that does not parse yields a [`ParseError`]. Callers keep the macro
//! around without an expression; nothing here aborts a generator run.

mod ast;
mod error;
mod infer;
mod lexer;
mod parser;
mod rewrite;
mod stack;
mod ty;

pub use ast::{BinaryOp, Expr, IntLiteral, Literal, Radix, SizeofOperand, UnaryOp};
pub use error::ParseError;
pub use infer::{infer_type, is_constant, MacroEnv, MacroInfo, NoMacros};
pub use lexer::fold_line_continuations;
pub use parser::parse;
pub use rewrite::rewrite;
pub use ty::MacroType;
