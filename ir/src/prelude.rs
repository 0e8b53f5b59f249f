//! Common imports for working with IR trees.
//!
//! ```rust,ignore
//! use kiln_ir::prelude::*;
//! ```

// Core nodes
pub use crate::expr::{Expr, ExprOp, IntoExpr};
pub use crate::func::PrimFunc;
pub use crate::stmt::Stmt;

// Operation types
pub use crate::types::{BinaryOp, Var};

// Traversal
pub use crate::rewrite::{TreeRewriter, rewrite_expr_bottom_up, rewrite_stmt_bottom_up};

// Re-exports from dependencies
pub use kiln_dtype::{DataType, TypeCode};

pub use strum::IntoEnumIterator;
