//! Error types for lesson drivers.

use dsplab_kernel::KernelError;
use thiserror::Error;

/// Errors that can occur while running a lesson.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LessonError {
    /// The kernel rejected an input.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// Lesson parameters are out of range or inconsistent.
    #[error("invalid parameters for lesson '{lesson}': {reason}")]
    InvalidParams {
        /// Lesson name.
        lesson: &'static str,
        /// Why the parameters were rejected.
        reason: String,
    },
}

impl LessonError {
    /// Create an invalid-parameters error.
    pub fn invalid(lesson: &'static str, reason: impl Into<String>) -> Self {
        LessonError::InvalidParams {
            lesson,
            reason: reason.into(),
        }
    }
}

/// Result alias for lesson operations.
pub type Result<T> = std::result::Result<T, LessonError>;

/// Reject a size parameter outside `min..=max`.
pub(crate) fn check_len(
    lesson: &'static str,
    name: &str,
    len: usize,
    min: usize,
    max: usize,
) -> Result<()> {
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(LessonError::invalid(
            lesson,
            format!("{name} must lie in {min}..={max}, got {len}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn kernel_errors_convert_transparently() {
        let err: LessonError = KernelError::NotPowerOfTwo { len: 12 }.into();
        assert_eq!(err.to_string(), "transform length 12 is not a power of two");
        assert!(matches!(err, LessonError::Kernel(_)));
    }

    #[test]
    fn invalid_params_display() {
        let err = LessonError::invalid("wiener", "taps must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameters for lesson 'wiener': taps must be positive"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn check_len_bounds() {
        assert!(check_len("lpc", "order", 1, 1, 4).is_ok());
        assert!(check_len("lpc", "order", 4, 1, 4).is_ok());
        let err = check_len("lpc", "order", 5, 1, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameters for lesson 'lpc': order must lie in 1..=4, got 5"
        );
        assert!(check_len("lpc", "order", 0, 1, 4).is_err());
    }
}
