use crate::*;
use proptest::prelude::*;

pub fn native_scalar() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Bool),
        Just(DataType::Int8),
        Just(DataType::Int16),
        Just(DataType::Int32),
        Just(DataType::Int64),
        Just(DataType::UInt8),
        Just(DataType::UInt16),
        Just(DataType::UInt32),
        Just(DataType::UInt64),
        Just(DataType::Float16),
        Just(DataType::Float32),
        Just(DataType::Float64)
    ]
}

pub fn lane_count() -> impl Strategy<Value = u16> {
    prop_oneof![Just(1u16), Just(2), Just(4), Just(8), Just(16)]
}

#[rustfmt::skip]
impl DataType {
    /// Native scalar or vector types.
    pub fn native_generator() -> impl Strategy<Value = Self> {
        (native_scalar(), lane_count()).prop_map(|(dtype, lanes)| dtype.with_lanes(lanes))
    }

    /// Custom types with the given code, any common width and lane count.
    pub fn custom_generator(code: u8) -> impl Strategy<Value = Self> {
        (prop_oneof![Just(8u16), Just(16), Just(32), Just(64)], lane_count())
            .prop_map(move |(bits, lanes)| DataType::custom(code, bits).with_lanes(lanes))
    }
}
