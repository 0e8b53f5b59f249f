//! Statement nodes.
//!
//! Statements own their expression operands and nested statement bodies.
//! Like expressions, they are immutable and shared through `Arc`.

use std::sync::Arc;

use bon::bon;
use kiln_dtype::DataType;
use smallvec::SmallVec;

use crate::expr::Expr;
use crate::types::Var;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Bind `var` to `value` within `body`.
    LetStmt { var: Var, value: Arc<Expr>, body: Arc<Stmt> },

    /// Reserve storage for `buffer` with element type `dtype` within `body`.
    Allocate {
        buffer: Var,
        dtype: DataType,
        extents: SmallVec<[Arc<Expr>; 4]>,
        condition: Arc<Expr>,
        body: Arc<Stmt>,
        /// Custom allocation expression, if the target provides one.
        new_expr: Option<Arc<Expr>>,
        /// Name of the function releasing a custom allocation.
        free_function: Option<String>,
    },

    Store { buffer: Var, value: Arc<Expr>, index: Arc<Expr>, predicate: Arc<Expr> },

    For { var: Var, min: Arc<Expr>, extent: Arc<Expr>, body: Arc<Stmt> },

    IfThenElse { cond: Arc<Expr>, then_case: Arc<Stmt>, else_case: Option<Arc<Stmt>> },

    Seq(SmallVec<[Arc<Stmt>; 4]>),

    /// Evaluate an expression for its side effects.
    Evaluate(Arc<Expr>),
}

#[bon]
impl Stmt {
    /// Build an `Allocate` statement.
    ///
    /// ```ignore
    /// let alloc = Stmt::allocate().buffer(buf).dtype(DataType::Float32).extents(vec![n]).body(body).call();
    /// ```
    #[builder]
    pub fn allocate(
        buffer: Var,
        dtype: DataType,
        #[builder(default)] extents: Vec<Arc<Expr>>,
        #[builder(default = Expr::const_true(1))] condition: Arc<Expr>,
        body: Arc<Stmt>,
        new_expr: Option<Arc<Expr>>,
        #[builder(into)] free_function: Option<String>,
    ) -> Arc<Self> {
        Arc::new(Self::Allocate {
            buffer,
            dtype,
            extents: extents.into_iter().collect(),
            condition,
            body,
            new_expr,
            free_function,
        })
    }

    pub fn let_stmt(var: Var, value: Arc<Expr>, body: Arc<Stmt>) -> Arc<Self> {
        Arc::new(Self::LetStmt { var, value, body })
    }

    /// Unpredicated store.
    pub fn store(buffer: &Var, value: Arc<Expr>, index: Arc<Expr>) -> Arc<Self> {
        let predicate = Expr::const_true(value.dtype().lanes());
        Arc::new(Self::Store { buffer: buffer.clone(), value, index, predicate })
    }

    pub fn for_(var: Var, min: Arc<Expr>, extent: Arc<Expr>, body: Arc<Stmt>) -> Arc<Self> {
        Arc::new(Self::For { var, min, extent, body })
    }

    pub fn if_then_else(cond: Arc<Expr>, then_case: Arc<Stmt>, else_case: Option<Arc<Stmt>>) -> Arc<Self> {
        Arc::new(Self::IfThenElse { cond, then_case, else_case })
    }

    pub fn seq(stmts: impl IntoIterator<Item = Arc<Stmt>>) -> Arc<Self> {
        Arc::new(Self::Seq(stmts.into_iter().collect()))
    }

    pub fn evaluate(expr: Arc<Expr>) -> Arc<Self> {
        Arc::new(Self::Evaluate(expr))
    }

    // =========================================================================
    // Graph access
    // =========================================================================

    /// Expression operands, in a fixed per-variant order.
    ///
    /// `Allocate` lists its extents, then the condition, then `new_expr` if present.
    pub fn exprs(&self) -> SmallVec<[&Arc<Expr>; 4]> {
        match self {
            Self::LetStmt { value, .. } => SmallVec::from_slice(&[value]),
            Self::Allocate { extents, condition, new_expr, .. } => {
                let mut exprs: SmallVec<[&Arc<Expr>; 4]> = extents.iter().collect();
                exprs.push(condition);
                exprs.extend(new_expr);
                exprs
            }
            Self::Store { value, index, predicate, .. } => SmallVec::from_slice(&[value, index, predicate]),
            Self::For { min, extent, .. } => SmallVec::from_slice(&[min, extent]),
            Self::IfThenElse { cond, .. } => SmallVec::from_slice(&[cond]),
            Self::Seq(_) => SmallVec::new(),
            Self::Evaluate(expr) => SmallVec::from_slice(&[expr]),
        }
    }

    /// Nested statements.
    pub fn stmts(&self) -> SmallVec<[&Arc<Stmt>; 4]> {
        match self {
            Self::LetStmt { body, .. } | Self::Allocate { body, .. } | Self::For { body, .. } => {
                SmallVec::from_slice(&[body])
            }
            Self::IfThenElse { then_case, else_case, .. } => {
                let mut stmts = SmallVec::from_slice(&[then_case]);
                stmts.extend(else_case);
                stmts
            }
            Self::Seq(stmts) => stmts.iter().collect(),
            Self::Store { .. } | Self::Evaluate(_) => SmallVec::new(),
        }
    }

    /// Rebuild this statement over new operands, in [`Stmt::exprs`] and [`Stmt::stmts`] order.
    ///
    /// Returns `self` when every child is pointer-identical to the old one.
    ///
    /// # Panics
    ///
    /// Panics if the child counts don't match the statement's shape.
    pub fn with_children(self: &Arc<Self>, exprs: Vec<Arc<Expr>>, stmts: Vec<Arc<Stmt>>) -> Arc<Self> {
        let (old_exprs, old_stmts) = (self.exprs(), self.stmts());
        assert_eq!(old_exprs.len(), exprs.len(), "expression count mismatch when rebuilding statement");
        assert_eq!(old_stmts.len(), stmts.len(), "statement count mismatch when rebuilding statement");
        if old_exprs.iter().zip(&exprs).all(|(a, b)| Arc::ptr_eq(a, b))
            && old_stmts.iter().zip(&stmts).all(|(a, b)| Arc::ptr_eq(a, b))
        {
            return self.clone();
        }

        let e = |n: usize| exprs[n].clone();
        let s = |n: usize| stmts[n].clone();
        let rebuilt = match &**self {
            Self::LetStmt { var, .. } => Self::LetStmt { var: var.clone(), value: e(0), body: s(0) },
            Self::Allocate { buffer, dtype, extents, new_expr, free_function, .. } => {
                let n = extents.len();
                Self::Allocate {
                    buffer: buffer.clone(),
                    dtype: *dtype,
                    extents: exprs[..n].iter().cloned().collect(),
                    condition: e(n),
                    body: s(0),
                    new_expr: new_expr.as_ref().map(|_| e(n + 1)),
                    free_function: free_function.clone(),
                }
            }
            Self::Store { buffer, .. } => {
                Self::Store { buffer: buffer.clone(), value: e(0), index: e(1), predicate: e(2) }
            }
            Self::For { var, .. } => Self::For { var: var.clone(), min: e(0), extent: e(1), body: s(0) },
            Self::IfThenElse { else_case, .. } => {
                Self::IfThenElse { cond: e(0), then_case: s(0), else_case: else_case.as_ref().map(|_| s(1)) }
            }
            Self::Seq(_) => Self::Seq(stmts.iter().cloned().collect()),
            Self::Evaluate(_) => Self::Evaluate(e(0)),
        };
        Arc::new(rebuilt)
    }

    /// Same `Allocate` with a different element type. Other statements are returned unchanged.
    pub fn with_allocate_dtype(self: &Arc<Self>, new_dtype: DataType) -> Arc<Self> {
        match &**self {
            Self::Allocate { buffer, dtype, extents, condition, body, new_expr, free_function }
                if *dtype != new_dtype =>
            {
                Arc::new(Self::Allocate {
                    buffer: buffer.clone(),
                    dtype: new_dtype,
                    extents: extents.clone(),
                    condition: condition.clone(),
                    body: body.clone(),
                    new_expr: new_expr.clone(),
                    free_function: free_function.clone(),
                })
            }
            _ => self.clone(),
        }
    }
}
