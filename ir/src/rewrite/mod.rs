//! Bottom-up tree rewriting.
//!
//! This module implements the post-order traversal shared by IR passes:
//! children are rewritten first, the parent is rebuilt over the results, and
//! a [`TreeRewriter`] hook decides the final replacement.

pub mod engine;

pub use engine::{TreeRewriter, rewrite_expr_bottom_up, rewrite_func_bottom_up, rewrite_stmt_bottom_up};
