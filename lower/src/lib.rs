//! Lowering of custom datatypes to native machine types.
//!
//! Custom datatypes are identified by a numeric [`TypeCode`] registered with a
//! [`DatatypeRegistry`], together with per-target, per-operation lowering
//! functions. This crate provides the pass that walks a function body once,
//! bottom-up, and replaces every custom-typed operation and storage with
//! native equivalents.
//!
//! # Usage
//!
//! ```ignore
//! use kiln_lower::{LoweringTable, lower_custom_datatypes};
//!
//! let lowered = lower_custom_datatypes(&func, "llvm", &table)?;
//! ```

pub mod config;
pub mod error;
pub mod lowerer;
pub mod registry;
pub mod verify;


pub use config::LowerConfig;
pub use error::{Error, Result};
pub use lowerer::{
    CustomDatatypeLowerer, lower_custom_datatypes, lower_custom_datatypes_with_config, lower_expr, lower_stmt,
};
pub use registry::{DatatypeRegistry, LoweringFn, LoweringKey, LoweringTable};
pub use verify::{CustomTypeUse, find_custom_types, verify_lowered};

pub use kiln_dtype::TypeCode;
