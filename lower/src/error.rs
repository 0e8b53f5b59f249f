//! Error types for custom datatype lowering.

use kiln_dtype::{DataType, TypeCode};
use snafu::Snafu;

use crate::registry::LoweringKey;

/// Result type for lowering operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while lowering custom datatypes.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A node needs lowering but the registry has no function for it.
    #[snafu(display("{} lowering function for target {target} {} not found", key.kind(), key.describe_types()))]
    MissingLoweringFunction { target: String, key: LoweringKey },

    /// A lowered tree still carries a registered custom type.
    #[snafu(display("custom type {dtype} survived lowering for target {target} at {node}"))]
    UnloweredCustomType { target: String, dtype: DataType, node: String },

    /// Native type codes cannot be registered as custom types.
    #[snafu(display("type code {code} is reserved for native types"))]
    ReservedTypeCode { code: TypeCode },

    /// Type name is already registered.
    #[snafu(display("custom type '{name}' is already registered with code {code}"))]
    DuplicateTypeName { name: String, code: TypeCode },

    /// Type code is already registered.
    #[snafu(display("type code {code} is already registered as '{name}'"))]
    DuplicateTypeCode { code: TypeCode, name: String },
}
