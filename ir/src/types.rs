//! Type definitions shared by expressions and statements.

use derive_more::Display;
use kiln_dtype::DataType;

/// Binary arithmetic and comparison operation kinds.
///
/// Arithmetic operations produce a value of the operand dtype.
/// Comparison operations produce `bool` with the operand lane count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::AsRefStr, strum::IntoStaticStr, strum::EnumIter, strum::EnumCount, strum::VariantArray)]
pub enum BinaryOp {
    // Arithmetic operations
    Add,
    Sub,
    Mul,
    /// Division; truncating for integers, IEEE 754 for floats.
    Div,
    /// Remainder with the sign of the dividend.
    Mod,
    Min,
    Max,

    // Comparison operations
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub const fn is_comparison(&self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    pub const fn is_arithmetic(&self) -> bool {
        !self.is_comparison()
    }
}

/// Named variable. Buffer variables carry a handle dtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{name}")]
pub struct Var {
    pub name: String,
    pub dtype: DataType,
}

impl Var {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self { name: name.into(), dtype }
    }

    /// Variable holding a buffer address.
    pub fn buffer(name: impl Into<String>) -> Self {
        Self::new(name, DataType::handle())
    }
}
