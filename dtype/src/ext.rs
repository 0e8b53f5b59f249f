//! Descriptors for Rust primitive types, used when literals are lifted into IR.

use super::*;

/// Rust primitives with a fixed native [`DataType`].
pub trait HasDataType {
    const DATA_TYPE: DataType;

    /// Vector of `lanes` elements of this primitive.
    fn vector_of(lanes: u16) -> DataType {
        Self::DATA_TYPE.with_lanes(lanes)
    }
}

impl HasDataType for bool {
    const DATA_TYPE: DataType = DataType::bool_();
}

macro_rules! has_data_type {
    ($ctor:ident: $($ty:ty),+) => {
        $(impl HasDataType for $ty {
            const DATA_TYPE: DataType = DataType::$ctor(<$ty>::BITS as u16);
        })+
    };
}

has_data_type!(int: i8, i16, i32, i64);
has_data_type!(uint: u8, u16, u32, u64);

impl HasDataType for f32 {
    const DATA_TYPE: DataType = DataType::float(32);
}

impl HasDataType for f64 {
    const DATA_TYPE: DataType = DataType::float(64);
}
