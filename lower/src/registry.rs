//! Datatype registry interface consumed by the lowering pass.
//!
//! The pass only needs to answer two questions: is a type code a registered
//! custom type, and which function lowers a given node for a given target.
//! [`DatatypeRegistry`] captures exactly that; [`LoweringTable`] is an
//! in-memory implementation that is filled once and then shared read-only.
//!
//! # Example
//!
//! ```ignore
//! let mut table = LoweringTable::new();
//! let posit = table.register_type("posit", 131)?;
//!
//! table.register_op("llvm", BinaryOp::Add, posit, |add| {
//!     Expr::call(DataType::UInt32, "PositAdd", add.sources())
//! });
//!
//! let lowered = lower_custom_datatypes(&func, "llvm", &table)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use kiln_dtype::TypeCode;
use kiln_ir::{BinaryOp, Expr};
use snafu::ensure;

use crate::error::*;

/// Function producing a native replacement for a node whose children are already lowered.
///
/// The argument is the rebuilt node: it still carries its original (custom)
/// dtype, but every operand is in final native form.
pub type LoweringFn = Arc<dyn Fn(&Arc<Expr>) -> Arc<Expr> + Send + Sync>;

/// Identity of a lowering function within one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoweringKey {
    /// Cast keyed by destination and source codes.
    Cast { dst: TypeCode, src: TypeCode },
    /// Float literal of a custom type.
    FloatImm(TypeCode),
    /// Arithmetic or comparison keyed by the node's own result code.
    Binary(BinaryOp, TypeCode),
}

impl LoweringKey {
    /// Operation kind as shown in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cast { .. } => "Cast",
            Self::FloatImm(_) => "FloatImm",
            Self::Binary(op, _) => (*op).into(),
        }
    }

    /// Type codes involved, as shown in diagnostics.
    pub fn describe_types(&self) -> String {
        match self {
            Self::Cast { dst, src } => format!("destination type {dst} source type {src}"),
            Self::FloatImm(code) | Self::Binary(_, code) => format!("type {code}"),
        }
    }
}

/// Read-only view of the datatype registry.
///
/// Implementations must be safe to query concurrently when the pass runs on
/// several functions in parallel; the pass itself never mutates the registry.
pub trait DatatypeRegistry {
    /// Whether `code` names a registered custom datatype.
    fn is_registered(&self, code: TypeCode) -> bool;

    fn lookup_cast_lowering(&self, target: &str, dst: TypeCode, src: TypeCode) -> Option<LoweringFn>;

    fn lookup_immediate_lowering(&self, target: &str, code: TypeCode) -> Option<LoweringFn>;

    fn lookup_op_lowering(&self, target: &str, op: BinaryOp, code: TypeCode) -> Option<LoweringFn>;

    /// Dispatch a [`LoweringKey`] to the matching lookup.
    fn lookup(&self, target: &str, key: LoweringKey) -> Option<LoweringFn> {
        match key {
            LoweringKey::Cast { dst, src } => self.lookup_cast_lowering(target, dst, src),
            LoweringKey::FloatImm(code) => self.lookup_immediate_lowering(target, code),
            LoweringKey::Binary(op, code) => self.lookup_op_lowering(target, op, code),
        }
    }
}

impl<R: DatatypeRegistry + ?Sized> DatatypeRegistry for Arc<R> {
    fn is_registered(&self, code: TypeCode) -> bool {
        (**self).is_registered(code)
    }

    fn lookup_cast_lowering(&self, target: &str, dst: TypeCode, src: TypeCode) -> Option<LoweringFn> {
        (**self).lookup_cast_lowering(target, dst, src)
    }

    fn lookup_immediate_lowering(&self, target: &str, code: TypeCode) -> Option<LoweringFn> {
        (**self).lookup_immediate_lowering(target, code)
    }

    fn lookup_op_lowering(&self, target: &str, op: BinaryOp, code: TypeCode) -> Option<LoweringFn> {
        (**self).lookup_op_lowering(target, op, code)
    }
}

/// In-memory datatype registry.
///
/// Populated through `&mut self` during setup, then shared (e.g. behind an
/// `Arc`) for concurrent read-only use. Targets are matched exactly.
#[derive(Default, Clone, derive_more::Debug)]
pub struct LoweringTable {
    /// Custom type name -> code
    names: HashMap<String, TypeCode>,
    /// Custom type code -> name
    codes: HashMap<TypeCode, String>,
    /// target -> key -> lowering function
    #[debug(skip)]
    lowerings: HashMap<String, HashMap<LoweringKey, LoweringFn>>,
}

impl LoweringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom datatype under `name`.
    ///
    /// Native codes are rejected, as are names or codes already in use.
    pub fn register_type(&mut self, name: &str, code: u8) -> Result<TypeCode> {
        let code = TypeCode(code);
        ensure!(!code.is_native(), ReservedTypeCodeSnafu { code });
        if let Some(&existing) = self.names.get(name) {
            return DuplicateTypeNameSnafu { name, code: existing }.fail();
        }
        if let Some(existing) = self.codes.get(&code) {
            return DuplicateTypeCodeSnafu { code, name: existing.clone() }.fail();
        }

        self.names.insert(name.to_string(), code);
        self.codes.insert(code, name.to_string());
        Ok(code)
    }

    pub fn type_code(&self, name: &str) -> Option<TypeCode> {
        self.names.get(name).copied()
    }

    pub fn type_name(&self, code: TypeCode) -> Option<&str> {
        self.codes.get(&code).map(String::as_str)
    }

    /// Register (or replace) the lowering function for `key` on `target`.
    pub fn register_lowering<F>(&mut self, target: &str, key: LoweringKey, lower: F) -> &mut Self
    where
        F: Fn(&Arc<Expr>) -> Arc<Expr> + Send + Sync + 'static,
    {
        self.lowerings.entry(target.to_string()).or_default().insert(key, Arc::new(lower));
        self
    }

    pub fn register_cast<F>(&mut self, target: &str, dst: TypeCode, src: TypeCode, lower: F) -> &mut Self
    where
        F: Fn(&Arc<Expr>) -> Arc<Expr> + Send + Sync + 'static,
    {
        self.register_lowering(target, LoweringKey::Cast { dst, src }, lower)
    }

    pub fn register_float_imm<F>(&mut self, target: &str, code: TypeCode, lower: F) -> &mut Self
    where
        F: Fn(&Arc<Expr>) -> Arc<Expr> + Send + Sync + 'static,
    {
        self.register_lowering(target, LoweringKey::FloatImm(code), lower)
    }

    pub fn register_op<F>(&mut self, target: &str, op: BinaryOp, code: TypeCode, lower: F) -> &mut Self
    where
        F: Fn(&Arc<Expr>) -> Arc<Expr> + Send + Sync + 'static,
    {
        self.register_lowering(target, LoweringKey::Binary(op, code), lower)
    }

    /// Number of registered lowering functions across all targets.
    pub fn len(&self) -> usize {
        self.lowerings.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, target: &str, key: LoweringKey) -> Option<LoweringFn> {
        self.lowerings.get(target)?.get(&key).cloned()
    }
}

impl DatatypeRegistry for LoweringTable {
    fn is_registered(&self, code: TypeCode) -> bool {
        self.codes.contains_key(&code)
    }

    fn lookup_cast_lowering(&self, target: &str, dst: TypeCode, src: TypeCode) -> Option<LoweringFn> {
        self.get(target, LoweringKey::Cast { dst, src })
    }

    fn lookup_immediate_lowering(&self, target: &str, code: TypeCode) -> Option<LoweringFn> {
        self.get(target, LoweringKey::FloatImm(code))
    }

    fn lookup_op_lowering(&self, target: &str, op: BinaryOp, code: TypeCode) -> Option<LoweringFn> {
        self.get(target, LoweringKey::Binary(op, code))
    }
}
