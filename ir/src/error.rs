use kiln_dtype::DataType;
use snafu::Snafu;

use crate::BinaryOp;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// DType mismatch in binary operation.
    #[snafu(display("dtype mismatch in {op}: cannot combine {lhs} and {rhs}"))]
    DTypeMismatch { op: BinaryOp, lhs: DataType, rhs: DataType },

    /// SELECT condition must be bool.
    #[snafu(display("SELECT condition must be bool, got {actual}"))]
    SelectConditionNotBool { actual: DataType },

    /// SELECT branches have different dtypes.
    #[snafu(display("SELECT branches have mismatched dtypes: {on_true} vs {on_false}"))]
    SelectBranchMismatch { on_true: DataType, on_false: DataType },

    /// Lane count does not match between an access and its index or predicate.
    #[snafu(display("lane mismatch: {what} has {actual} lanes, expected {expected}"))]
    LaneMismatch { what: &'static str, expected: u16, actual: u16 },

    /// BROADCAST requires scalar source.
    #[snafu(display("BROADCAST requires scalar source, got {dtype}"))]
    BroadcastRequiresScalar { dtype: DataType },
}
