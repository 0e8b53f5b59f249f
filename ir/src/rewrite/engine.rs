//! Rewrite engine implementation.
//!
//! # Algorithm
//!
//! Every node goes through two steps:
//! - Rebuild: rewrite all children (expressions first, then nested
//!   statements) and reconstruct the node over the results with
//!   [`Expr::with_sources`] / [`Stmt::with_children`]. Unchanged children keep
//!   the original allocation.
//! - Finalize: hand the *original* node and the rebuilt node to the rewriter
//!   hook, which returns the replacement.
//!
//! Passing the original lets a hook inspect the node as it was before any
//! child changed (e.g. the dtype of a cast's source before the source was
//! lowered), while the rebuilt node carries the final operands.
//!
//! ## Example
//!
//! ```ignore
//! struct CountCasts(usize);
//!
//! impl TreeRewriter for CountCasts {
//!     type Error = std::convert::Infallible;
//!
//!     fn rewrite_expr(&mut self, original: &Arc<Expr>, rebuilt: Arc<Expr>) -> Result<Arc<Expr>, Self::Error> {
//!         if matches!(original.op(), ExprOp::Cast { .. }) {
//!             self.0 += 1;
//!         }
//!         Ok(rebuilt)
//!     }
//! }
//!
//! let mut counter = CountCasts(0);
//! let same = rewrite_stmt_bottom_up(&mut counter, &body)?;
//! ```

use std::sync::Arc;

use crate::expr::Expr;
use crate::func::PrimFunc;
use crate::stmt::Stmt;

/// Per-node hooks invoked after a node's children have been rewritten.
///
/// Both hooks default to returning the rebuilt node unchanged.
pub trait TreeRewriter {
    type Error;

    fn rewrite_expr(&mut self, original: &Arc<Expr>, rebuilt: Arc<Expr>) -> Result<Arc<Expr>, Self::Error> {
        let _ = original;
        Ok(rebuilt)
    }

    fn rewrite_stmt(&mut self, original: &Arc<Stmt>, rebuilt: Arc<Stmt>) -> Result<Arc<Stmt>, Self::Error> {
        let _ = original;
        Ok(rebuilt)
    }
}

/// Rewrite an expression tree in post-order.
pub fn rewrite_expr_bottom_up<R>(rewriter: &mut R, expr: &Arc<Expr>) -> Result<Arc<Expr>, R::Error>
where
    R: TreeRewriter + ?Sized,
{
    let sources =
        expr.children().into_iter().map(|src| rewrite_expr_bottom_up(rewriter, src)).collect::<Result<Vec<_>, _>>()?;
    let rebuilt = expr.with_sources(sources);
    rewriter.rewrite_expr(expr, rebuilt)
}

/// Rewrite a statement tree, including every expression it owns, in post-order.
pub fn rewrite_stmt_bottom_up<R>(rewriter: &mut R, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>, R::Error>
where
    R: TreeRewriter + ?Sized,
{
    let exprs =
        stmt.exprs().into_iter().map(|e| rewrite_expr_bottom_up(rewriter, e)).collect::<Result<Vec<_>, _>>()?;
    let stmts =
        stmt.stmts().into_iter().map(|s| rewrite_stmt_bottom_up(rewriter, s)).collect::<Result<Vec<_>, _>>()?;
    let rebuilt = stmt.with_children(exprs, stmts);
    rewriter.rewrite_stmt(stmt, rebuilt)
}

/// Rewrite a function body, returning a new function record.
///
/// The input record is left untouched.
pub fn rewrite_func_bottom_up<R>(rewriter: &mut R, func: &PrimFunc) -> Result<PrimFunc, R::Error>
where
    R: TreeRewriter + ?Sized,
{
    let body = rewrite_stmt_bottom_up(rewriter, &func.body)?;
    Ok(func.with_body(body))
}
