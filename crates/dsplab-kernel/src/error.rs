//! Error types for kernel operations.

use thiserror::Error;

/// Errors returned by the numerical kernel.
///
/// Every fallible kernel call validates its inputs before touching any
/// caller-visible buffer, so an `Err` never leaves output half-written.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    /// A buffer handed to the transform engine is not a power of two.
    #[error("transform length {len} is not a power of two")]
    NotPowerOfTwo {
        /// Offending buffer length.
        len: usize,
    },

    /// Two sequences that must share a length do not.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A linear system is not square or its right-hand side has the wrong size.
    #[error("dimension mismatch: {rows}x{cols} matrix with right-hand side of length {rhs}")]
    DimensionMismatch {
        /// Matrix row count.
        rows: usize,
        /// Matrix column count.
        cols: usize,
        /// Right-hand side length.
        rhs: usize,
    },

    /// Elimination met a pivot column that is numerically zero.
    #[error("singular system: no usable pivot in column {column}")]
    SingularSystem {
        /// Column where elimination stopped.
        column: usize,
    },

    /// A design or analysis parameter is outside its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Input contained NaN or infinity.
    #[error("non-finite input value at index {index}")]
    NonFinite {
        /// Index of the first non-finite sample.
        index: usize,
    },
}

impl KernelError {
    /// Create an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        KernelError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Reject the first NaN or infinite sample in `values`.
pub(crate) fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(KernelError::NonFinite { index }),
        None => Ok(()),
    }
}
