//! Factory presets bundled with dsplab.
//!
//! Built-in lesson sequences that are always available without external
//! files. Each one is a TOML document embedded at compile time.

use crate::Preset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "tour",
    "estimation",
    "filters",
    "multirate",
    "quantizers",
];

/// TOML content for factory presets.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("tour", TOUR_PRESET),
    ("estimation", ESTIMATION_PRESET),
    ("filters", FILTERS_PRESET),
    ("multirate", MULTIRATE_PRESET),
    ("quantizers", QUANTIZERS_PRESET),
];

/// Every lesson once, with defaults.
const TOUR_PRESET: &str = r#"
name = "Tour"
description = "Every lesson once with default parameters"

[[lessons]]
lesson = "noise"

[[lessons]]
lesson = "matched"

[[lessons]]
lesson = "wiener"

[[lessons]]
lesson = "lpc"

[[lessons]]
lesson = "equalizer"

[[lessons]]
lesson = "multirate"

[[lessons]]
lesson = "phase"

[[lessons]]
lesson = "analytic"

[[lessons]]
lesson = "fractional"

[[lessons]]
lesson = "polezero"

[[lessons]]
lesson = "quantization"

[[lessons]]
lesson = "clustering"
"#;

const ESTIMATION_PRESET: &str = r#"
name = "Estimation"
description = "Matched filtering, Wiener restoration and linear prediction under noise"

[[lessons]]
lesson = "matched"
shape = "chirp"
noise_power = 2.0

[[lessons]]
lesson = "wiener"
noise = "low"

[[lessons]]
lesson = "wiener"
noise = "critical"
taps = 31

[[lessons]]
lesson = "lpc"
order = 2

[[lessons]]
lesson = "lpc"
order = 10
"#;

const FILTERS_PRESET: &str = r#"
name = "Filters"
description = "Phase, fractional delay, pole-zero placement and channel inversion"

[[lessons]]
lesson = "phase"
taps = 51
cutoff = 0.25
window = "blackman"

[[lessons]]
lesson = "fractional"
delay = 3.3

[[lessons]]
lesson = "polezero"
pole_radius = 0.95
pole_angle = 30.0

[[lessons]]
lesson = "equalizer"
channel = "min_phase"

[[lessons]]
lesson = "equalizer"
channel = "max_phase"
"#;

const MULTIRATE_PRESET: &str = r#"
name = "Multirate"
description = "Aliasing with and without the anti-alias filter, plus single-sideband modulation"

[[lessons]]
lesson = "multirate"
factor = 4
filter = false

[[lessons]]
lesson = "multirate"
factor = 4
filter = true
noble_signal = "ramp"

[[lessons]]
lesson = "analytic"
signal = "chirp"
sideband = "lower"
"#;

const QUANTIZERS_PRESET: &str = r#"
name = "Quantizers"
description = "Uniform quantization at two resolutions, Lloyd-Max and LBG"

[[lessons]]
lesson = "quantization"
bits = 3
waveform = "triangular"

[[lessons]]
lesson = "quantization"
bits = 8
lloyd_levels = 8

[[lessons]]
lesson = "clustering"
target_size = 16
blobs = 5
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use dsplab_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("  - {}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by key or display name, case-insensitively.
///
/// ```rust
/// use dsplab_config::get_factory_preset;
///
/// let preset = get_factory_preset("Filters").unwrap();
/// assert_eq!(preset.name, "Filters");
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.to_lowercase() == name_lower {
            return Preset::from_toml(toml).ok();
        }
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Internal identifiers of the factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// True if `name` matches a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_preset;
    use dsplab_lessons::LESSON_NAMES;

    #[test]
    fn test_factory_presets_load() {
        let presets = factory_presets();
        assert_eq!(presets.len(), FACTORY_PRESET_NAMES.len());
    }

    #[test]
    fn test_all_factory_presets_valid() {
        for (name, toml) in FACTORY_PRESETS_TOML {
            let result = Preset::from_toml(toml);
            assert!(result.is_ok(), "factory preset '{name}' should parse: {result:?}");

            let preset = result.unwrap();
            assert!(preset.description.is_some(), "preset '{name}' should have a description");
            assert!(validate_preset(&preset).is_ok(), "preset '{name}' should validate");
        }
    }

    #[test]
    fn test_names_match_table() {
        assert_eq!(factory_preset_names(), FACTORY_PRESET_NAMES.to_vec());
    }

    #[test]
    fn test_get_factory_preset() {
        let preset = get_factory_preset("estimation").expect("estimation should exist");
        assert_eq!(preset.name, "Estimation");
        assert_eq!(preset.len(), 5);

        assert!(get_factory_preset("QUANTIZERS").is_some());
        assert!(get_factory_preset("nonexistent").is_none());
        assert!(is_factory_preset("Tour"));
        assert!(!is_factory_preset("my_custom_preset"));
    }

    #[test]
    fn test_tour_covers_every_lesson() {
        let tour = get_factory_preset("tour").unwrap();
        assert_eq!(tour.lesson_names(), LESSON_NAMES.to_vec());
    }
}
