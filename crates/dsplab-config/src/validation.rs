//! Preset validation.
//!
//! Lesson tags are checked when the TOML is parsed; this module checks what
//! parsing cannot: a usable name, at least one lesson, and every lesson's
//! parameter ranges.
//!
//! # Example
//!
//! ```rust
//! use dsplab_config::{Preset, validate_preset};
//! use dsplab_lessons::Lesson;
//!
//! let preset = Preset::new("Tour").with_lessons(Lesson::all_defaults());
//! validate_preset(&preset).expect("defaults are valid");
//! ```

use dsplab_lessons::{Lesson, LessonError};
use thiserror::Error;

use crate::Preset;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Preset name is empty or whitespace.
    #[error("preset name is empty")]
    EmptyName,

    /// Preset holds no lessons.
    #[error("preset '{0}' has no lessons")]
    NoLessons(String),

    /// A lesson's parameters are out of range.
    #[error("lesson #{index} ({lesson}): {source}")]
    InvalidLesson {
        /// Position in the preset, starting at 1.
        index: usize,
        /// Lesson tag.
        lesson: &'static str,
        /// Why the lesson was rejected.
        #[source]
        source: LessonError,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate one lesson at 1-based position `index`.
pub fn validate_lesson(index: usize, lesson: &Lesson) -> ValidationResult<()> {
    lesson
        .validate()
        .map_err(|source| ValidationError::InvalidLesson {
            index,
            lesson: lesson.name(),
            source,
        })
}

/// Validate a whole preset, collecting every problem found.
pub fn validate_preset(preset: &Preset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if preset.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if preset.lessons.is_empty() {
        errors.push(ValidationError::NoLessons(preset.name.clone()));
    }
    for (i, lesson) in preset.lessons.iter().enumerate() {
        if let Err(e) = validate_lesson(i + 1, lesson) {
            tracing::warn!(preset = %preset.name, error = %e, "invalid lesson");
            errors.push(e);
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
