//! Conversion options.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How 64-bit integer storage is represented when no shape is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Int64Policy {
    /// Keep full precision in an [`Integer64`](crate::Vector::Integer64) vector.
    #[default]
    Integer64,
    /// Convert to [`Double`](crate::Vector::Double), losing precision above 2^53.
    Double,
}

/// What happens when no native conversion exists for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnsupportedPolicy {
    /// Retry once through the installed fallback converter.
    #[default]
    Fallback,
    /// Report the native error without consulting the fallback.
    ///
    /// Extension types are still routed to the fallback.
    Error,
}

/// Options shared by every node of a converter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MaterializeOptions {
    /// Representation used for inferred `Int64` columns.
    pub int64: Int64Policy,
    /// Behaviour for types without a native conversion path.
    pub unsupported: UnsupportedPolicy,
}

impl MaterializeOptions {
    /// Set the 64-bit integer policy.
    #[must_use]
    pub fn with_int64(mut self, int64: Int64Policy) -> Self {
        self.int64 = int64;
        self
    }

    /// Set the unsupported-type policy.
    #[must_use]
    pub fn with_unsupported(mut self, unsupported: UnsupportedPolicy) -> Self {
        self.unsupported = unsupported;
        self
    }
}
