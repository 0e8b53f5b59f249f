//! Residual custom type detection.
//!
//! After lowering, no node may carry a registered custom code in its own
//! descriptor. A lowering function that returns a custom-typed replacement
//! breaks that invariant silently; [`verify_lowered`] turns it into an error.

use std::convert::Infallible;
use std::sync::Arc;

use kiln_dtype::DataType;
use kiln_ir::{Expr, Stmt, TreeRewriter, rewrite_stmt_bottom_up};

use crate::error::*;
use crate::registry::DatatypeRegistry;

/// A node still carrying a custom datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTypeUse {
    pub dtype: DataType,
    /// Label of the offending node, e.g. `LOAD('buf') : custom[200]16`.
    pub node: String,
}

struct CustomTypeCollector<'r, R: ?Sized> {
    registry: &'r R,
    found: Vec<CustomTypeUse>,
}

impl<R: DatatypeRegistry + ?Sized> TreeRewriter for CustomTypeCollector<'_, R> {
    type Error = Infallible;

    fn rewrite_expr(&mut self, original: &Arc<Expr>, rebuilt: Arc<Expr>) -> Result<Arc<Expr>, Infallible> {
        if self.registry.is_registered(original.dtype().code()) {
            self.found.push(CustomTypeUse { dtype: original.dtype(), node: original.label() });
        }
        Ok(rebuilt)
    }

    fn rewrite_stmt(&mut self, original: &Arc<Stmt>, rebuilt: Arc<Stmt>) -> Result<Arc<Stmt>, Infallible> {
        if let Stmt::Allocate { dtype, .. } = original.as_ref()
            && self.registry.is_registered(dtype.code())
        {
            self.found.push(CustomTypeUse { dtype: *dtype, node: original.label() });
        }
        Ok(rebuilt)
    }
}

/// Every node in `stmt` whose own dtype (or `Allocate` element type) is a registered custom type.
///
/// Results are in post-order.
pub fn find_custom_types<R>(stmt: &Arc<Stmt>, registry: &R) -> Vec<CustomTypeUse>
where
    R: DatatypeRegistry + ?Sized,
{
    let mut collector = CustomTypeCollector { registry, found: Vec::new() };
    let Ok(_) = rewrite_stmt_bottom_up(&mut collector, stmt);
    collector.found
}

/// Fail with [`Error::UnloweredCustomType`] on the first custom type left in `stmt`.
pub fn verify_lowered<R>(stmt: &Arc<Stmt>, target: &str, registry: &R) -> Result<()>
where
    R: DatatypeRegistry + ?Sized,
{
    match find_custom_types(stmt, registry).into_iter().next() {
        Some(CustomTypeUse { dtype, node }) => {
            let error = UnloweredCustomTypeSnafu { target, dtype, node }.build();
            tracing::error!(%error, "lowering left a custom datatype behind");
            Err(error)
        }
        None => Ok(()),
    }
}
