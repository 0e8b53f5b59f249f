//! Lowering pass configuration.
//!
//! Provides typed configuration with a bon builder and an environment
//! variable fallback.

/// Configuration for [`crate::lower_custom_datatypes_with_config`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bon::Builder)]
pub struct LowerConfig {
    /// Re-walk the lowered tree and fail if any registered custom type survived.
    ///
    /// Catches lowering functions that return custom-typed replacements.
    #[builder(default = false)]
    pub verify: bool,
}

impl LowerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KILN_VERIFY_LOWERING` - Enable output verification unless set to `0`
    pub fn from_env() -> Self {
        Self::from_verify_var(std::env::var("KILN_VERIFY_LOWERING").ok().as_deref())
    }

    /// Interpret the value of `KILN_VERIFY_LOWERING`; `None` means unset.
    pub(crate) fn from_verify_var(value: Option<&str>) -> Self {
        Self { verify: value.is_some_and(|v| v != "0") }
    }
}
