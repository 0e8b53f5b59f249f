//! Generators for property-based testing.
//!
//! Trees are generated per dtype so every node in an expression agrees on
//! its operand types. The same generators serve native and custom dtypes:
//! custom literals are float immediates, as they are in real programs.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::sample::select;
use strum::VariantArray;

use kiln_dtype::DataType;

use crate::{BinaryOp, Expr, Stmt, Var};

// ============================================================================
// Operation Generators
// ============================================================================

pub fn arb_binary_op() -> impl Strategy<Value = BinaryOp> {
    select(BinaryOp::VARIANTS)
}

pub fn arb_arithmetic_op() -> impl Strategy<Value = BinaryOp> {
    select(BinaryOp::VARIANTS.iter().copied().filter(BinaryOp::is_arithmetic).collect::<Vec<_>>())
}

// ============================================================================
// Expression Generators
// ============================================================================

/// Literal or variable of the given dtype.
pub fn arb_leaf(dtype: DataType) -> BoxedStrategy<Arc<Expr>> {
    let literal = if dtype.is_int() {
        (-100i64..=100).prop_map(move |v| Expr::int_imm(dtype, v)).boxed()
    } else if dtype.is_bool() {
        (0u64..=1).prop_map(move |v| Expr::uint_imm(dtype, v)).boxed()
    } else if dtype.is_uint() {
        (0u64..=100).prop_map(move |v| Expr::uint_imm(dtype, v)).boxed()
    } else {
        (-100.0f64..=100.0).prop_map(move |v| Expr::float_imm(dtype, v)).boxed()
    };
    // Custom-typed variables have no lowering, so custom trees use literals only.
    if !dtype.is_native() {
        return literal;
    }
    let var = "[a-z]{1,3}".prop_map(move |name| Expr::var(&Var::new(name, dtype)));
    prop_oneof![3 => literal, 1 => var].boxed()
}

/// Expression tree whose every arithmetic node has `dtype`.
///
/// Casts take their source from a `float32` literal, and loads read from buffer `buf`
/// at an `int32` index with matching lanes.
pub fn arb_expr_of(dtype: DataType) -> BoxedStrategy<Arc<Expr>> {
    let lanes = dtype.lanes();
    arb_leaf(dtype)
        .prop_recursive(4, 24, 2, move |inner| {
            prop_oneof![
                (arb_arithmetic_op(), inner.clone(), inner.clone())
                    .prop_map(move |(op, lhs, rhs)| Expr::binary(op, dtype, lhs, rhs)),
                arb_leaf(DataType::Float32.with_lanes(lanes)).prop_map(move |src| Expr::cast(dtype, src)),
                (0i64..64).prop_map(move |i| {
                    let index = Expr::int_imm(DataType::Int32.with_lanes(lanes), i);
                    Expr::load(dtype, &Var::buffer("buf"), index, Expr::const_true(lanes))
                }),
            ]
        })
        .boxed()
}

/// Expression tree over an arbitrary native dtype.
pub fn arb_native_expr() -> impl Strategy<Value = Arc<Expr>> {
    DataType::native_generator().prop_flat_map(arb_expr_of)
}

// ============================================================================
// Statement Generators
// ============================================================================

/// `Allocate` of `dtype` whose body stores generated expressions into the buffer.
pub fn arb_stmt_of(dtype: DataType) -> BoxedStrategy<Arc<Stmt>> {
    let lanes = dtype.lanes();
    prop::collection::vec(arb_expr_of(dtype), 1..4)
        .prop_map(move |values| {
            let buf = Var::buffer("buf");
            let stores = values.into_iter().enumerate().map(|(i, value)| {
                let index = Expr::int_imm(DataType::Int32.with_lanes(lanes), i as i64);
                Stmt::store(&buf, value, index)
            });
            let body = Stmt::seq(stores);
            Stmt::allocate()
                .buffer(buf)
                .dtype(dtype)
                .extents(vec![Expr::int_imm(DataType::Int32, 64)])
                .body(body)
                .call()
        })
        .boxed()
}

/// Statement tree over an arbitrary native dtype.
pub fn arb_native_stmt() -> impl Strategy<Value = Arc<Stmt>> {
    DataType::native_generator().prop_flat_map(arb_stmt_of)
}
