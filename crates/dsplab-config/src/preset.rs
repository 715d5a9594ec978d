//! Preset file format and operations.

use std::path::Path;

use dsplab_lessons::{Lesson, LessonReport};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named list of lessons with their parameters.
///
/// Each entry carries a `lesson` tag; any parameter left out takes the
/// lesson's default.
///
/// # TOML Format
///
/// ```toml
/// name = "Noisy Channels"
/// description = "Wiener restoration at two noise levels"
///
/// [[lessons]]
/// lesson = "wiener"
/// noise = "low"
///
/// [[lessons]]
/// lesson = "wiener"
/// noise = "critical"
/// taps = 31
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lessons in run order.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Preset {
    /// Create a new empty preset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            lessons: Vec::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a lesson to the preset.
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Add multiple lessons to the preset.
    pub fn with_lessons(mut self, lessons: impl IntoIterator<Item = Lesson>) -> Self {
        self.lessons.extend(lessons);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset: Preset = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), lessons = preset.len(), "loaded preset");
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "saved preset");
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of lessons.
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    /// True when the preset holds no lessons.
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Iterate over lessons.
    pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter()
    }

    /// Lesson tags in run order.
    pub fn lesson_names(&self) -> Vec<&'static str> {
        self.lessons.iter().map(Lesson::name).collect()
    }

    /// Validate, then run every lesson in order.
    ///
    /// Stops at the first lesson that fails.
    pub fn run(&self) -> Result<Vec<LessonReport>, ConfigError> {
        crate::validation::validate_preset(self)?;
        let mut reports = Vec::with_capacity(self.lessons.len());
        for lesson in &self.lessons {
            reports.push(lesson.run()?);
        }
        Ok(reports)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
