pub mod ext;


use std::fmt;

use derive_more::Display;

/// Native type kinds with well-known, reserved type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::FromRepr, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum NativeKind {
    Int = 0,
    UInt = 1,
    Float = 2,
    /// Opaque pointer/handle.
    Handle = 3,
}

/// Numeric tag distinguishing native kinds from registered custom kinds.
///
/// Codes below [`TypeCode::CUSTOM_BEGIN`] are reserved for the native kinds;
/// anything else is meaningful only through an external datatype registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct TypeCode(pub u8);

impl TypeCode {
    pub const INT: Self = Self(NativeKind::Int as u8);
    pub const UINT: Self = Self(NativeKind::UInt as u8);
    pub const FLOAT: Self = Self(NativeKind::Float as u8);
    pub const HANDLE: Self = Self(NativeKind::Handle as u8);

    /// First code available to custom datatypes.
    pub const CUSTOM_BEGIN: u8 = 129;

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn native_kind(self) -> Option<NativeKind> {
        NativeKind::from_repr(self.0)
    }

    pub const fn is_native(self) -> bool {
        self.0 <= Self::HANDLE.0
    }

    /// Whether the code lies in the range handed out to custom datatypes.
    pub const fn is_custom_range(self) -> bool {
        self.0 >= Self::CUSTOM_BEGIN
    }
}

impl From<NativeKind> for TypeCode {
    fn from(kind: NativeKind) -> Self {
        Self(kind as u8)
    }
}

/// Type descriptor carried by every IR value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    code: TypeCode,
    bits: u16,
    lanes: u16,
}

impl DataType {
    // =========================================================================
    // Type Constructors
    // =========================================================================

    pub const fn new(code: TypeCode, bits: u16, lanes: u16) -> Self {
        Self { code, bits, lanes }
    }

    pub const fn int(bits: u16) -> Self {
        Self::new(TypeCode::INT, bits, 1)
    }

    pub const fn uint(bits: u16) -> Self {
        Self::new(TypeCode::UINT, bits, 1)
    }

    pub const fn float(bits: u16) -> Self {
        Self::new(TypeCode::FLOAT, bits, 1)
    }

    /// Booleans are one-bit unsigned integers.
    pub const fn bool_() -> Self {
        Self::uint(1)
    }

    pub const fn handle() -> Self {
        Self::new(TypeCode::HANDLE, 64, 1)
    }

    /// Scalar type for a custom (registry-defined) code.
    pub const fn custom(code: u8, bits: u16) -> Self {
        Self::new(TypeCode(code), bits, 1)
    }

    /// Same code and width with a different lane count.
    pub const fn with_lanes(self, lanes: u16) -> Self {
        Self { lanes, ..self }
    }

    pub const fn with_bits(self, bits: u16) -> Self {
        Self { bits, ..self }
    }

    pub const fn with_code(self, code: TypeCode) -> Self {
        Self { code, ..self }
    }

    /// Scalar element type of a vector type.
    pub const fn element_of(self) -> Self {
        self.with_lanes(1)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub const fn code(&self) -> TypeCode {
        self.code
    }

    pub const fn bits(&self) -> u16 {
        self.bits
    }

    pub const fn lanes(&self) -> u16 {
        self.lanes
    }

    /// Storage size in bytes, rounding sub-byte widths up.
    pub const fn bytes(&self) -> usize {
        (self.bits as usize * self.lanes as usize).div_ceil(8)
    }

    // =========================================================================
    // Type Properties
    // =========================================================================

    pub const fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    pub const fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    pub const fn is_int(&self) -> bool {
        self.code.0 == TypeCode::INT.0
    }

    pub const fn is_uint(&self) -> bool {
        self.code.0 == TypeCode::UINT.0
    }

    pub const fn is_float(&self) -> bool {
        self.code.0 == TypeCode::FLOAT.0
    }

    pub const fn is_handle(&self) -> bool {
        self.code.0 == TypeCode::HANDLE.0
    }

    pub const fn is_bool(&self) -> bool {
        self.is_uint() && self.bits == 1
    }

    pub const fn is_native(&self) -> bool {
        self.code.is_native()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.native_kind() {
            _ if self.is_bool() => f.write_str("bool")?,
            Some(NativeKind::Handle) => f.write_str("handle")?,
            Some(kind) => write!(f, "{}{}", kind.as_ref(), self.bits)?,
            None => write!(f, "custom[{}]{}", self.code, self.bits)?,
        }
        if self.is_vector() {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}

// Legacy aliases for the common native scalars
#[allow(non_upper_case_globals)]
impl DataType {
    pub const Bool: Self = Self::bool_();
    pub const Int8: Self = Self::int(8);
    pub const Int16: Self = Self::int(16);
    pub const Int32: Self = Self::int(32);
    pub const Int64: Self = Self::int(64);
    pub const UInt8: Self = Self::uint(8);
    pub const UInt16: Self = Self::uint(16);
    pub const UInt32: Self = Self::uint(32);
    pub const UInt64: Self = Self::uint(64);
    pub const Float16: Self = Self::float(16);
    pub const Float32: Self = Self::float(32);
    pub const Float64: Self = Self::float(64);
    pub const Handle: Self = Self::handle();
}
