//! Lesson presets for dsplab.
//!
//! A preset is a named list of lessons with parameter overrides, stored as
//! TOML. This crate loads and saves presets, validates them against each
//! lesson's parameter ranges, and ships a handful of factory presets.
//!
//! # Example
//!
//! ```rust,no_run
//! use dsplab_config::{Preset, user_presets_dir};
//! use dsplab_lessons::Lesson;
//! use dsplab_lessons::wiener::{NoiseLevel, WienerParams};
//!
//! let preset = Preset::new("Noisy")
//!     .with_description("Wiener at critical noise")
//!     .with_lesson(Lesson::Wiener(WienerParams {
//!         noise: NoiseLevel::Critical,
//!         ..WienerParams::default()
//!     }));
//!
//! preset.save(user_presets_dir().join("noisy.toml")).unwrap();
//! let reports = preset.run().unwrap();
//! ```

mod error;
mod preset;

/// Platform-specific paths for presets and configuration.
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{
    ensure_user_presets_dir, find_preset, list_user_presets, preset_name_from_path,
    user_config_dir, user_presets_dir,
};
pub use preset::Preset;
pub use validation::{ValidationError, ValidationResult, validate_lesson, validate_preset};

/// Resolve a preset by factory name, file path, or user preset name, in that order.
pub fn resolve_preset(name: &str) -> Result<Preset, ConfigError> {
    if let Some(preset) = get_factory_preset(name) {
        tracing::debug!(name, "using factory preset");
        return Ok(preset);
    }
    match find_preset(name) {
        Some(path) => Preset::load(path),
        None => Err(ConfigError::PresetNotFound(name.to_string())),
    }
}
