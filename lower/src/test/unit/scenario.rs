//! End-to-end lowering of whole functions.

use std::sync::Arc;

use kiln_dtype::DataType;
use kiln_ir::{BinaryOp, Expr, ExprOp, IntoExpr, PrimFunc, Stmt, Var};

use crate::test::fixtures::*;
use crate::{Error, LowerConfig, lower_custom_datatypes, lower_custom_datatypes_with_config, lower_stmt};

fn custom_operand(v: f32) -> Arc<Expr> {
    Expr::cast(custom32(), v.into_expr())
}

fn store_func(value: Arc<Expr>) -> PrimFunc {
    let out = Var::buffer("out");
    let body = Stmt::store(&out, Expr::cast(DataType::Float32, value), 0i32.into_expr());
    PrimFunc::new("main", vec![out], body)
}

#[test]
fn test_add_of_casts_fully_lowered() {
    let add = Expr::binary(BinaryOp::Add, custom32(), custom_operand(1.0), custom_operand(2.0));
    let func = store_func(add);
    let before = func.clone();

    let lowered = lower_custom_datatypes(&func, TARGET, &scenario_table()).unwrap();

    assert_eq!(func, before);
    assert_eq!(lowered.name, "main");
    assert_eq!(lowered.params, func.params);

    let Stmt::Store { value, .. } = lowered.body.as_ref() else {
        panic!("expected STORE, got {:?}", lowered.body);
    };
    assert!(!has_custom(value));

    // Custom32ToFloat(Custom32Add(FloatToCustom32(1.0), FloatToCustom32(2.0)))
    let ExprOp::Call { name, args } = value.op() else { panic!("expected CALL, got {value:?}") };
    assert_eq!(name, "Custom32ToFloat");
    let ExprOp::Call { name, args } = args[0].op() else { panic!("expected CALL, got {:?}", args[0]) };
    assert_eq!(name, "Custom32Add");
    for arg in args {
        assert!(matches!(arg.op(), ExprOp::Call { name, .. } if name == "FloatToCustom32"));
    }
}

#[test]
fn test_mul_without_lowering_aborts() {
    let mul = Expr::binary(BinaryOp::Mul, custom32(), custom_operand(1.0), custom_operand(2.0));

    let err = lower_custom_datatypes(&store_func(mul), TARGET, &scenario_table()).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("llvm"), "{msg}");
    assert!(msg.contains("Mul"), "{msg}");
    assert!(msg.contains("200"), "{msg}");
}

#[test]
fn test_native_function_returned_shared() {
    let out = Var::buffer("out");
    let add = Expr::try_binary(BinaryOp::Add, 1.0f32.into_expr(), 2.0f32.into_expr()).unwrap();
    let func = PrimFunc::new("native", vec![out.clone()], Stmt::store(&out, add, 0i32.into_expr()));

    let lowered = lower_custom_datatypes(&func, TARGET, &scenario_table()).unwrap();

    assert!(Arc::ptr_eq(&lowered.body, &func.body));
}

#[test]
fn test_shared_subtree_lowered_consistently() {
    let shared = custom_operand(3.0);
    let add = Expr::binary(BinaryOp::Add, custom32(), shared.clone(), shared);

    let lowered = lower_custom_datatypes(&store_func(add), TARGET, &scenario_table()).unwrap();

    let Stmt::Store { value, .. } = lowered.body.as_ref() else { unreachable!() };
    let ExprOp::Call { args, .. } = value.op() else { unreachable!() };
    let ExprOp::Call { args, .. } = args[0].op() else { unreachable!() };
    assert_eq!(args[0], args[1]);
}

#[test]
fn test_nested_statements_lowered() {
    let buf = Var::buffer("buf");
    let i = Var::new("i", DataType::Int32);
    let load = Expr::load(custom32(), &buf, Expr::var(&i), Expr::const_true(1));
    let sum = Expr::binary(BinaryOp::Add, custom32(), load, Expr::float_imm(custom32(), 1.0));
    let store = Stmt::store(&buf, sum, Expr::var(&i));
    let body = Stmt::for_(i, 0i32.into_expr(), 16i32.into_expr(), store);
    let alloc = Stmt::allocate()
        .buffer(buf)
        .dtype(custom32())
        .extents(vec![16i32.into_expr()])
        .body(body)
        .call();
    let table = scenario_table();

    let lowered = lower_stmt(&alloc, TARGET, &table).unwrap();

    assert!(crate::find_custom_types(&lowered, &table).is_empty());
    assert!(matches!(lowered.as_ref(), Stmt::Allocate { dtype, .. } if *dtype == DataType::UInt32));
}

#[test]
fn test_verify_accepts_complete_lowering() {
    let add = Expr::binary(BinaryOp::Add, custom32(), custom_operand(1.0), custom_operand(2.0));
    let config = LowerConfig::builder().verify(true).build();

    assert!(lower_custom_datatypes_with_config(&store_func(add), TARGET, &scenario_table(), &config).is_ok());
}

#[test]
fn test_verify_rejects_custom_typed_replacement() {
    let mut table = scenario_table();
    // Broken lowering: keeps the custom result type.
    table.register_op(TARGET, BinaryOp::Add, kiln_dtype::TypeCode(CUSTOM), |node| {
        Expr::call(node.dtype(), "StillCustom", node.sources())
    });
    let add = Expr::binary(BinaryOp::Add, custom32(), custom_operand(1.0), custom_operand(2.0));
    let func = store_func(add);

    let unchecked = LowerConfig::builder().verify(false).build();
    assert!(lower_custom_datatypes_with_config(&func, TARGET, &table, &unchecked).is_ok());

    let config = LowerConfig::builder().verify(true).build();
    let err = lower_custom_datatypes_with_config(&func, TARGET, &table, &config).unwrap_err();
    match err {
        Error::UnloweredCustomType { target, dtype, node } => {
            assert_eq!(target, TARGET);
            assert_eq!(dtype, custom32());
            assert_eq!(node, "CALL('StillCustom') : custom[200]32");
        }
        other => panic!("expected UnloweredCustomType, got {other:?}"),
    }
}

#[test]
fn test_parallel_lowering_with_shared_registry() {
    let registry = Arc::new(scenario_table());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let add = Expr::binary(BinaryOp::Add, custom32(), custom_operand(i as f32), custom_operand(1.0));
                let lowered = lower_custom_datatypes(&store_func(add), TARGET, &registry)?;
                Ok::<_, Error>(crate::find_custom_types(&lowered.body, &registry).is_empty())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
}
