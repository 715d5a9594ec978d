//! Preset round trips and end-to-end runs.

use dsplab_config::{
    ConfigError, FACTORY_PRESET_NAMES, Preset, get_factory_preset, resolve_preset,
};
use dsplab_lessons::Lesson;
use tempfile::TempDir;

#[test]
fn every_factory_preset_runs() {
    for name in FACTORY_PRESET_NAMES {
        let preset = get_factory_preset(name).unwrap();
        let reports = preset
            .run()
            .unwrap_or_else(|e| panic!("factory preset '{name}' failed: {e}"));
        assert_eq!(reports.len(), preset.len());
    }
}

#[test]
fn factory_presets_survive_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    for name in FACTORY_PRESET_NAMES {
        let preset = get_factory_preset(name).unwrap();
        let path = temp_dir.path().join(format!("{name}.toml"));
        preset.save(&path).unwrap();
        assert_eq!(Preset::load(&path).unwrap(), preset, "{name}");
    }
}

#[test]
fn resolve_prefers_factory_then_path() {
    assert_eq!(resolve_preset("tour").unwrap().name, "Tour");

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    Preset::new("Custom")
        .with_lesson(Lesson::default_for("fractional").unwrap())
        .save(&path)
        .unwrap();
    let preset = resolve_preset(path.to_str().unwrap()).unwrap();
    assert_eq!(preset.name, "Custom");
    assert_eq!(preset.lesson_names(), vec!["fractional"]);

    assert!(matches!(
        resolve_preset("no_such_preset_98765"),
        Err(ConfigError::PresetNotFound(_))
    ));
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "name = \"Broken\"\n[[lessons]]\nlesson = \"wiener\"\ntaps = \"many\"\n")
        .unwrap();
    assert!(matches!(Preset::load(&path), Err(ConfigError::TomlParse(_))));
}
