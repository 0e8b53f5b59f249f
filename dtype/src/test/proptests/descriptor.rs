use proptest::prelude::*;

use crate::{DataType, TypeCode};

proptest! {
    #[test]
    fn native_types_never_use_custom_codes(dtype in DataType::native_generator()) {
        prop_assert!(dtype.is_native());
        prop_assert!(!dtype.code().is_custom_range());
    }

    #[test]
    fn element_of_keeps_code_and_width(dtype in DataType::custom_generator(200)) {
        let element = dtype.element_of();
        prop_assert_eq!(element.code(), TypeCode(200));
        prop_assert_eq!(element.bits(), dtype.bits());
        prop_assert!(element.is_scalar());
    }

    #[test]
    fn bytes_scale_with_lanes(dtype in DataType::native_generator()) {
        prop_assume!(!dtype.is_bool());
        prop_assert_eq!(dtype.bytes(), dtype.element_of().bytes() * dtype.lanes() as usize);
    }
}
