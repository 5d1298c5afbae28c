//! Error types for conversion and allocation.

use arrow_schema::DataType;
use thiserror::Error;

use crate::vector::VectorKind;

/// Boxed error returned by host-supplied fallback converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building a converter or materializing values.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Shape or type mismatch, unsupported dictionary encoding on a nested
    /// array, or a length mismatch between expected and produced values.
    #[error("invalid conversion: {message}")]
    Invalid {
        /// Human-readable description of the mismatch.
        message: String,
        /// Raised while handling a fallback result; never retried.
        fatal: bool,
    },

    /// The storage type is recognized but has no conversion path to the
    /// requested shape, and no fallback was available.
    #[error("cannot convert {data_type:?} to {target:?}")]
    NotSupported {
        /// Arrow storage type of the source.
        data_type: DataType,
        /// Kind of the requested destination.
        target: VectorKind,
    },

    /// A destination container could not be allocated or reserved.
    #[error("allocation failed: {message}")]
    Allocation {
        /// Human-readable description of the failed allocation.
        message: String,
    },

    /// The fallback converter reported an error; propagated verbatim.
    #[error("fallback conversion failed: {source}")]
    Fallback {
        /// Error produced by the fallback converter.
        #[source]
        source: BoxError,
    },
}

impl MaterializeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MaterializeError::Invalid {
            message: message.into(),
            fatal: false,
        }
    }

    pub(crate) fn not_supported(data_type: &DataType, target: VectorKind) -> Self {
        MaterializeError::NotSupported {
            data_type: data_type.clone(),
            target,
        }
    }

    pub(crate) fn allocation(message: impl Into<String>) -> Self {
        MaterializeError::Allocation {
            message: message.into(),
        }
    }

    /// Mark a failure of the fallback path as final so no ancestor retries it.
    pub(crate) fn into_fatal(self) -> Self {
        match self {
            MaterializeError::Invalid { message, .. } => MaterializeError::Invalid {
                message,
                fatal: true,
            },
            other => other,
        }
    }

    /// Whether the dispatcher may retry this failure through the fallback.
    ///
    /// Allocation failures, errors raised by the fallback itself and invalid
    /// fallback results are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MaterializeError::Invalid { fatal: false, .. } | MaterializeError::NotSupported { .. }
        )
    }
}
