//! Custom datatype lowering.
//!
//! Rewrites every node that carries or produces a registered custom datatype
//! into native types, bottom-up, so a lowering function always receives
//! operands that are already native.
//!
//! # Trigger rules
//!
//! Whether a node is lowered is decided on the node *before* its children are
//! rewritten:
//!
//! | Node | Lowered when | Lowering |
//! |---|---|---|
//! | `Cast` | result **or** source code is custom | registered cast function, keyed by both codes |
//! | `FloatImm` | literal code is custom | registered immediate function |
//! | `Binary` | the node's own result code is custom | registered op function |
//! | `Load` | loaded code is custom | retyped to `uint<bits>`, scalar lanes |
//! | `Allocate` | element code is custom | retyped to `uint<bits>` with the same lanes |
//!
//! Binary operands are not checked separately, and `Load` drops the lane count
//! while `Allocate` keeps it. Downstream codegen relies on both conventions.

use std::sync::Arc;

use kiln_dtype::DataType;
use kiln_ir::{Expr, ExprOp, PrimFunc, Stmt, TreeRewriter};
use kiln_ir::{rewrite_expr_bottom_up, rewrite_func_bottom_up, rewrite_stmt_bottom_up};

use crate::config::LowerConfig;
use crate::error::*;
use crate::registry::{DatatypeRegistry, LoweringKey};
use crate::verify::verify_lowered;

/// How a node is lowered, decided on the original node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Replace with the output of a registered lowering function.
    Function(LoweringKey),
    /// Reinterpret the loaded value as unsigned storage bits.
    StorageLoad,
}

/// Tree rewriter lowering custom datatypes for a single target.
///
/// One instance lowers one function body; it holds no state besides the
/// target, the registry handle and a count of lowered nodes.
pub struct CustomDatatypeLowerer<'r, R: ?Sized> {
    target: String,
    registry: &'r R,
    lowered: usize,
}

impl<'r, R: DatatypeRegistry + ?Sized> CustomDatatypeLowerer<'r, R> {
    pub fn new(target: impl Into<String>, registry: &'r R) -> Self {
        Self { target: target.into(), registry, lowered: 0 }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of nodes lowered so far.
    pub fn lowered_count(&self) -> usize {
        self.lowered
    }

    fn is_custom(&self, dtype: DataType) -> bool {
        self.registry.is_registered(dtype.code())
    }

    fn expr_trigger(&self, original: &Expr) -> Option<Trigger> {
        let dtype = original.dtype();
        match original.op() {
            ExprOp::Cast { src } => {
                let (dst, src) = (dtype.code(), src.dtype().code());
                (self.registry.is_registered(dst) || self.registry.is_registered(src))
                    .then_some(Trigger::Function(LoweringKey::Cast { dst, src }))
            }
            ExprOp::FloatImm(_) => {
                self.is_custom(dtype).then_some(Trigger::Function(LoweringKey::FloatImm(dtype.code())))
            }
            ExprOp::Binary(op, ..) => {
                self.is_custom(dtype).then_some(Trigger::Function(LoweringKey::Binary(*op, dtype.code())))
            }
            ExprOp::Load { .. } => self.is_custom(dtype).then_some(Trigger::StorageLoad),
            _ => None,
        }
    }

    fn apply(&mut self, key: LoweringKey, rebuilt: &Arc<Expr>) -> Result<Arc<Expr>> {
        let Some(lower) = self.registry.lookup(&self.target, key) else {
            let error = MissingLoweringFunctionSnafu { target: self.target.as_str(), key }.build();
            tracing::error!(lowering.target = %self.target, %error, "cannot lower custom datatype");
            return Err(error);
        };

        let replacement = lower(rebuilt);
        self.lowered += 1;
        tracing::debug!(
            lowering.kind = key.kind(),
            from = %rebuilt.dtype(),
            to = %replacement.dtype(),
            "lowered custom datatype node"
        );
        Ok(replacement)
    }
}

impl<R: DatatypeRegistry + ?Sized> TreeRewriter for CustomDatatypeLowerer<'_, R> {
    type Error = Error;

    fn rewrite_expr(&mut self, original: &Arc<Expr>, rebuilt: Arc<Expr>) -> Result<Arc<Expr>> {
        match self.expr_trigger(original) {
            None => Ok(rebuilt),
            Some(Trigger::Function(key)) => self.apply(key, &rebuilt),
            Some(Trigger::StorageLoad) => {
                let storage = DataType::uint(rebuilt.dtype().bits());
                self.lowered += 1;
                tracing::debug!(from = %rebuilt.dtype(), to = %storage, "lowered custom datatype load");
                Ok(rebuilt.with_dtype(storage))
            }
        }
    }

    fn rewrite_stmt(&mut self, original: &Arc<Stmt>, rebuilt: Arc<Stmt>) -> Result<Arc<Stmt>> {
        match original.as_ref() {
            Stmt::Allocate { dtype, .. } if self.is_custom(*dtype) => {
                let storage = DataType::uint(dtype.bits()).with_lanes(dtype.lanes());
                self.lowered += 1;
                tracing::debug!(from = %dtype, to = %storage, "lowered custom datatype allocation");
                Ok(rebuilt.with_allocate_dtype(storage))
            }
            _ => Ok(rebuilt),
        }
    }
}

/// Lower custom datatypes in a single expression tree.
pub fn lower_expr<R>(expr: &Arc<Expr>, target: &str, registry: &R) -> Result<Arc<Expr>>
where
    R: DatatypeRegistry + ?Sized,
{
    rewrite_expr_bottom_up(&mut CustomDatatypeLowerer::new(target, registry), expr)
}

/// Lower custom datatypes in a statement tree.
#[tracing::instrument(skip_all, fields(lowering.target = target))]
pub fn lower_stmt<R>(body: &Arc<Stmt>, target: &str, registry: &R) -> Result<Arc<Stmt>>
where
    R: DatatypeRegistry + ?Sized,
{
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(body.initial = %body.tree(), "before custom datatype lowering");
    }

    let mut lowerer = CustomDatatypeLowerer::new(target, registry);
    let lowered = rewrite_stmt_bottom_up(&mut lowerer, body)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(
            body.lowered = %lowered.tree(),
            lowered_nodes = lowerer.lowered_count(),
            "after custom datatype lowering"
        );
    }
    Ok(lowered)
}

/// Lower all custom datatypes in `func` for `target`.
///
/// Returns a new function record; `func` itself is left untouched. Fails with
/// [`Error::MissingLoweringFunction`] when a node needs a lowering function
/// the registry does not provide for `target`. No partial output is produced.
///
/// Configuration comes from the environment, see [`LowerConfig::from_env`].
pub fn lower_custom_datatypes<R>(func: &PrimFunc, target: &str, registry: &R) -> Result<PrimFunc>
where
    R: DatatypeRegistry + ?Sized,
{
    lower_custom_datatypes_with_config(func, target, registry, &LowerConfig::from_env())
}

/// [`lower_custom_datatypes`] with explicit configuration.
#[tracing::instrument(skip_all, fields(func.name = %func.name, lowering.target = target))]
pub fn lower_custom_datatypes_with_config<R>(
    func: &PrimFunc,
    target: &str,
    registry: &R,
    config: &LowerConfig,
) -> Result<PrimFunc>
where
    R: DatatypeRegistry + ?Sized,
{
    let mut lowerer = CustomDatatypeLowerer::new(target, registry);
    let lowered = rewrite_func_bottom_up(&mut lowerer, func)?;
    tracing::debug!(lowered_nodes = lowerer.lowered_count(), "lowered custom datatypes");

    if config.verify {
        verify_lowered(&lowered.body, target, registry)?;
    }
    Ok(lowered)
}
