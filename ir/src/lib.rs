//! Intermediate Representation (IR) for the kiln compiler.
//!
//! This crate defines the statement/expression tree that lowering passes
//! consume and produce.
//!
//! # Module Organization
//!
//! - [`types`] - Operation kinds and variables
//! - [`expr`] - Expression nodes and constructors
//! - [`stmt`] - Statement nodes and constructors
//! - [`func`] - Function records passed between passes
//! - [`rewrite`] - Bottom-up rewrite machinery
//! - [`tree`] - ASCII tree rendering for debugging
//! - [`error`] - Error types and result handling

pub mod error;
pub mod expr;
pub mod func;
pub mod prelude;
pub mod rewrite;
pub mod stmt;
pub mod tree;
pub mod types;


pub use error::{Error, Result};
pub use expr::{Expr, ExprOp, IntoExpr};
pub use func::PrimFunc;
pub use rewrite::{TreeRewriter, rewrite_expr_bottom_up, rewrite_func_bottom_up, rewrite_stmt_bottom_up};
pub use stmt::Stmt;
pub use types::{BinaryOp, Var};

// Re-export external types for convenience
pub use kiln_dtype::{DataType, TypeCode};
