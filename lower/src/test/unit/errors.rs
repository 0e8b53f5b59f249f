//! Diagnostics for missing lowering functions and registry misuse.

use kiln_dtype::{DataType, TypeCode};
use kiln_ir::{BinaryOp, Expr, IntoExpr, PrimFunc, Stmt, Var};

use crate::registry::LoweringTable;
use crate::test::fixtures::*;
use crate::{Error, LoweringKey, lower_custom_datatypes, lower_expr};

#[test]
fn test_missing_op_diagnostic() {
    let mul = Expr::binary(
        BinaryOp::Mul,
        custom32(),
        Expr::float_imm(custom32(), 1.0),
        Expr::float_imm(custom32(), 2.0),
    );

    let err = lower_expr(&mul, TARGET, &scenario_table()).unwrap_err();

    assert!(matches!(err, Error::MissingLoweringFunction { key: LoweringKey::Binary(BinaryOp::Mul, _), .. }));
    let msg = err.to_string();
    assert_eq!(msg, "Mul lowering function for target llvm type 200 not found");
}

#[test]
fn test_missing_cast_diagnostic_names_both_codes() {
    let cast = Expr::cast(custom32(), 1i32.into_expr());

    let err = lower_expr(&cast, TARGET, &scenario_table()).unwrap_err();

    assert_eq!(err.to_string(), "Cast lowering function for target llvm destination type 200 source type 0 not found");
}

#[test]
fn test_missing_float_imm_diagnostic() {
    let mut table = LoweringTable::new();
    table.register_type("custom32", CUSTOM).unwrap();

    let err = lower_expr(&Expr::float_imm(custom32(), 0.5), "cuda", &table).unwrap_err();

    assert_eq!(err.to_string(), "FloatImm lowering function for target cuda type 200 not found");
}

#[test]
fn test_unknown_target_fails() {
    let cast = Expr::cast(custom32(), 1.0f32.into_expr());

    let err = lower_expr(&cast, "vulkan", &scenario_table()).unwrap_err();

    assert_eq!(
        err,
        Error::MissingLoweringFunction {
            target: "vulkan".to_string(),
            key: LoweringKey::Cast { dst: TypeCode(CUSTOM), src: TypeCode::FLOAT },
        }
    );
}

#[test]
fn test_failure_leaves_input_unchanged() {
    let buf = Var::buffer("out");
    let mul = Expr::binary(
        BinaryOp::Mul,
        custom32(),
        Expr::float_imm(custom32(), 1.0),
        Expr::float_imm(custom32(), 2.0),
    );
    let func = PrimFunc::new("f", vec![buf.clone()], Stmt::store(&buf, mul, 0i32.into_expr()));
    let before = func.clone();

    assert!(lower_custom_datatypes(&func, TARGET, &scenario_table()).is_err());
    assert_eq!(func, before);
}

#[test]
fn test_register_native_code_rejected() {
    let mut table = LoweringTable::new();

    let err = table.register_type("int_again", 0).unwrap_err();

    assert_eq!(err, Error::ReservedTypeCode { code: TypeCode::INT });
    assert_eq!(err.to_string(), "type code 0 is reserved for native types");
}

#[test]
fn test_register_duplicates_rejected() {
    let mut table = LoweringTable::new();
    table.register_type("custom32", CUSTOM).unwrap();

    assert_eq!(
        table.register_type("custom32", 201).unwrap_err(),
        Error::DuplicateTypeName { name: "custom32".to_string(), code: TypeCode(CUSTOM) }
    );
    assert_eq!(
        table.register_type("other", CUSTOM).unwrap_err(),
        Error::DuplicateTypeCode { code: TypeCode(CUSTOM), name: "custom32".to_string() }
    );
    assert_eq!(table.type_code("other"), None);
}

#[test]
fn test_unlowered_custom_type_display() {
    let err = Error::UnloweredCustomType {
        target: TARGET.to_string(),
        dtype: DataType::custom(CUSTOM, 16),
        node: "LOAD('buf') : custom[200]16".to_string(),
    };

    assert_eq!(
        err.to_string(),
        "custom type custom[200]16 survived lowering for target llvm at LOAD('buf') : custom[200]16"
    );
}
