//! Expression nodes.
//!
//! An [`Expr`] pairs an [`ExprOp`] with the [`DataType`] of the value it
//! produces. Expressions are immutable and always handled through `Arc`;
//! rewriting builds new nodes and reuses unchanged subtrees.

use std::sync::Arc;

use kiln_dtype::DataType;
use kiln_dtype::ext::HasDataType;
use smallvec::SmallVec;
use snafu::ensure;

use crate::error::*;
use crate::types::{BinaryOp, Var};

/// Expression operation with typed operands.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprOp {
    // Leaves
    Var(Var),
    IntImm(i64),
    UIntImm(u64),
    FloatImm(f64),

    Cast {
        src: Arc<Expr>,
    },
    Binary(BinaryOp, Arc<Expr>, Arc<Expr>),
    Select {
        cond: Arc<Expr>,
        on_true: Arc<Expr>,
        on_false: Arc<Expr>,
    },

    // Memory
    Load {
        buffer: Var,
        index: Arc<Expr>,
        predicate: Arc<Expr>,
    },

    /// Replicate a scalar across `dtype.lanes()` lanes.
    Broadcast {
        value: Arc<Expr>,
    },

    /// Call to an externally provided function.
    Call {
        name: String,
        args: SmallVec<[Arc<Expr>; 4]>,
    },
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub(crate) op: ExprOp,
    pub(crate) dtype: DataType,
}

impl Expr {
    pub fn new(op: ExprOp, dtype: DataType) -> Arc<Self> {
        Arc::new(Self { op, dtype })
    }

    pub fn op(&self) -> &ExprOp {
        &self.op
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn var(var: &Var) -> Arc<Self> {
        Self::new(ExprOp::Var(var.clone()), var.dtype)
    }

    pub fn int_imm(dtype: DataType, value: i64) -> Arc<Self> {
        Self::new(ExprOp::IntImm(value), dtype)
    }

    pub fn uint_imm(dtype: DataType, value: u64) -> Arc<Self> {
        Self::new(ExprOp::UIntImm(value), dtype)
    }

    /// Floating-point literal. The dtype may be a custom type.
    pub fn float_imm(dtype: DataType, value: f64) -> Arc<Self> {
        Self::new(ExprOp::FloatImm(value), dtype)
    }

    /// All-true predicate with the given lane count.
    pub fn const_true(lanes: u16) -> Arc<Self> {
        Self::uint_imm(DataType::bool_().with_lanes(lanes), 1)
    }

    pub fn cast(dtype: DataType, src: Arc<Self>) -> Arc<Self> {
        Self::new(ExprOp::Cast { src }, dtype)
    }

    /// Binary operation with an explicit result dtype.
    pub fn binary(op: BinaryOp, dtype: DataType, lhs: Arc<Self>, rhs: Arc<Self>) -> Arc<Self> {
        Self::new(ExprOp::Binary(op, lhs, rhs), dtype)
    }

    /// Binary operation with the result dtype inferred from the operands.
    ///
    /// Both operands must have the same dtype.
    pub fn try_binary(op: BinaryOp, lhs: Arc<Self>, rhs: Arc<Self>) -> Result<Arc<Self>> {
        ensure!(lhs.dtype == rhs.dtype, DTypeMismatchSnafu { op, lhs: lhs.dtype, rhs: rhs.dtype });
        let dtype = if op.is_comparison() { DataType::bool_().with_lanes(lhs.dtype.lanes()) } else { lhs.dtype };
        Ok(Self::binary(op, dtype, lhs, rhs))
    }

    pub fn try_select(cond: Arc<Self>, on_true: Arc<Self>, on_false: Arc<Self>) -> Result<Arc<Self>> {
        ensure!(cond.dtype.is_bool(), SelectConditionNotBoolSnafu { actual: cond.dtype });
        ensure!(
            on_true.dtype == on_false.dtype,
            SelectBranchMismatchSnafu { on_true: on_true.dtype, on_false: on_false.dtype }
        );
        let dtype = on_true.dtype;
        Ok(Self::new(ExprOp::Select { cond, on_true, on_false }, dtype))
    }

    pub fn load(dtype: DataType, buffer: &Var, index: Arc<Self>, predicate: Arc<Self>) -> Arc<Self> {
        Self::new(ExprOp::Load { buffer: buffer.clone(), index, predicate }, dtype)
    }

    /// Load with index and predicate lane counts checked against `dtype`.
    pub fn try_load(dtype: DataType, buffer: &Var, index: Arc<Self>, predicate: Arc<Self>) -> Result<Arc<Self>> {
        let expected = dtype.lanes();
        ensure!(
            index.dtype.lanes() == expected,
            LaneMismatchSnafu { what: "load index", expected, actual: index.dtype.lanes() }
        );
        ensure!(
            predicate.dtype.lanes() == expected,
            LaneMismatchSnafu { what: "load predicate", expected, actual: predicate.dtype.lanes() }
        );
        Ok(Self::load(dtype, buffer, index, predicate))
    }

    pub fn try_broadcast(value: Arc<Self>, lanes: u16) -> Result<Arc<Self>> {
        ensure!(value.dtype.is_scalar(), BroadcastRequiresScalarSnafu { dtype: value.dtype });
        let dtype = value.dtype.with_lanes(lanes);
        Ok(Self::new(ExprOp::Broadcast { value }, dtype))
    }

    pub fn call(dtype: DataType, name: impl Into<String>, args: impl IntoIterator<Item = Arc<Self>>) -> Arc<Self> {
        Self::new(ExprOp::Call { name: name.into(), args: args.into_iter().collect() }, dtype)
    }

    // =========================================================================
    // Graph access
    // =========================================================================

    /// Child expressions in operand order.
    pub fn children(&self) -> SmallVec<[&Arc<Self>; 4]> {
        match &self.op {
            ExprOp::Var(_) | ExprOp::IntImm(_) | ExprOp::UIntImm(_) | ExprOp::FloatImm(_) => SmallVec::new(),
            ExprOp::Cast { src } => SmallVec::from_slice(&[src]),
            ExprOp::Binary(_, lhs, rhs) => SmallVec::from_slice(&[lhs, rhs]),
            ExprOp::Select { cond, on_true, on_false } => SmallVec::from_slice(&[cond, on_true, on_false]),
            ExprOp::Load { index, predicate, .. } => SmallVec::from_slice(&[index, predicate]),
            ExprOp::Broadcast { value } => SmallVec::from_slice(&[value]),
            ExprOp::Call { args, .. } => args.iter().collect(),
        }
    }

    /// Owned copy of [`Expr::children`].
    pub fn sources(&self) -> SmallVec<[Arc<Self>; 4]> {
        self.children().into_iter().cloned().collect()
    }

    /// Rebuild this node over new sources, keeping the op payload and dtype.
    ///
    /// Returns `self` when every new source is pointer-identical to the old one.
    ///
    /// # Panics
    ///
    /// Panics if the number of sources doesn't match the operation's arity.
    pub fn with_sources(self: &Arc<Self>, new_srcs: Vec<Arc<Self>>) -> Arc<Self> {
        let old = self.children();
        assert_eq!(old.len(), new_srcs.len(), "source count mismatch when rebuilding {:?}", self.op);
        if old.iter().zip(&new_srcs).all(|(a, b)| Arc::ptr_eq(a, b)) {
            return self.clone();
        }

        let src = |n: usize| new_srcs[n].clone();
        let op = match &self.op {
            ExprOp::Var(_) | ExprOp::IntImm(_) | ExprOp::UIntImm(_) | ExprOp::FloatImm(_) => return self.clone(),
            ExprOp::Cast { .. } => ExprOp::Cast { src: src(0) },
            ExprOp::Binary(op, ..) => ExprOp::Binary(*op, src(0), src(1)),
            ExprOp::Select { .. } => ExprOp::Select { cond: src(0), on_true: src(1), on_false: src(2) },
            ExprOp::Load { buffer, .. } => ExprOp::Load { buffer: buffer.clone(), index: src(0), predicate: src(1) },
            ExprOp::Broadcast { .. } => ExprOp::Broadcast { value: src(0) },
            ExprOp::Call { name, .. } => ExprOp::Call { name: name.clone(), args: new_srcs.iter().cloned().collect() },
        };
        Self::new(op, self.dtype)
    }

    /// Same node with a different dtype.
    pub fn with_dtype(self: &Arc<Self>, dtype: DataType) -> Arc<Self> {
        if self.dtype == dtype {
            return self.clone();
        }
        Self::new(self.op.clone(), dtype)
    }

    /// Number of nodes in this expression tree.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }
}

/// Conversion of Rust literals into immediate expressions.
pub trait IntoExpr {
    fn into_expr(self) -> Arc<Expr>;
}

impl IntoExpr for Arc<Expr> {
    fn into_expr(self) -> Arc<Expr> {
        self
    }
}

macro_rules! impl_into_expr {
    ($ctor:ident => $($ty:ty),*) => {
        $(impl IntoExpr for $ty {
            fn into_expr(self) -> Arc<Expr> {
                Expr::$ctor(<$ty as HasDataType>::DATA_TYPE, self as _)
            }
        })*
    };
}

impl_into_expr!(int_imm => i8, i16, i32, i64);
impl_into_expr!(uint_imm => u8, u16, u32, u64);
impl_into_expr!(float_imm => f32, f64);

impl IntoExpr for bool {
    fn into_expr(self) -> Arc<Expr> {
        Expr::uint_imm(DataType::bool_(), self as u64)
    }
}
