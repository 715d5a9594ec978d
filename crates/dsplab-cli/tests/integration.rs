//! Integration tests for the `dsplab` binary.

use std::process::Command;

use dsplab_config::{FACTORY_PRESET_NAMES, Preset};
use dsplab_lessons::{LESSON_NAMES, Lesson};
use tempfile::TempDir;

/// Helper to get the path to the `dsplab` binary built by cargo.
fn dsplab_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dsplab"))
}

fn stdout_of(args: &[&str]) -> String {
    let output = dsplab_bin().args(args).output().expect("failed to run dsplab");
    assert!(
        output.status.success(),
        "dsplab {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_lessons_lists_every_lesson() {
    let stdout = stdout_of(&["lessons"]);
    assert!(stdout.contains("Available Lessons"));
    for name in LESSON_NAMES {
        assert!(stdout.contains(name), "lesson listing should contain '{name}'");
    }
}

#[test]
fn cli_lesson_json_is_tagged() {
    let stdout = stdout_of(&["lesson", "fractional", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let reports = value.as_array().expect("JSON array");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["lesson"], "fractional");
    assert_eq!(reports[0]["thiran_order"], 5);
}

#[test]
fn cli_lesson_overrides_apply() {
    let stdout = stdout_of(&[
        "lesson",
        "wiener",
        "--set",
        "taps=21",
        "--set",
        "noise=high",
        "--show-params",
    ]);
    assert!(stdout.contains("taps = 21"), "{stdout}");
    assert!(stdout.contains("noise = \"high\""), "{stdout}");
}

#[test]
fn cli_lesson_text_report() {
    let stdout = stdout_of(&["lesson", "equalizer", "--set", "channel=max_phase"]);
    assert!(stdout.contains("UNSTABLE"), "{stdout}");
}

#[test]
fn cli_unknown_lesson_fails() {
    let output = dsplab_bin().args(["lesson", "reverb"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown lesson"), "{stderr}");
}

#[test]
fn cli_invalid_parameter_value_fails() {
    let output = dsplab_bin()
        .args(["lesson", "phase", "--set", "analysis_len=1000"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_huge_delay_is_an_error_not_a_panic() {
    let output = dsplab_bin()
        .args(["lesson", "fractional", "--set", "delay=1e20"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("delay"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}

#[test]
fn cli_run_factory_preset_json() {
    let stdout = stdout_of(&["run", "estimation", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let names: Vec<_> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["lesson"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["matched", "wiener", "wiener", "lpc", "lpc"]);
}

#[test]
fn cli_run_preset_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mine.toml");
    Preset::new("Mine")
        .with_lesson(Lesson::default_for("polezero").unwrap())
        .save(&path)
        .unwrap();

    let stdout = stdout_of(&["run", path.to_str().unwrap()]);
    assert!(stdout.contains("Preset: Mine"));
    assert!(stdout.contains("Pole-zero section"));
}

#[test]
fn cli_run_missing_preset_fails() {
    let output = dsplab_bin()
        .args(["run", "no_such_preset_98765"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("preset not found"), "{stderr}");
}

#[test]
fn cli_presets_list_and_show() {
    let stdout = stdout_of(&["presets", "list", "--factory"]);
    assert!(stdout.contains("Factory Presets"));
    for name in FACTORY_PRESET_NAMES {
        assert!(stdout.contains(name), "preset listing should contain '{name}'");
    }

    let stdout = stdout_of(&["presets", "show", "filters"]);
    assert!(stdout.contains("Preset: Filters"));
    assert!(stdout.contains("Lessons (5)"));

    let toml = stdout_of(&["presets", "show", "quantizers", "--toml"]);
    let preset = Preset::from_toml(&toml).unwrap();
    assert_eq!(preset.name, "Quantizers");
}

#[cfg(target_os = "linux")]
#[test]
fn cli_presets_copy_into_user_dir() {
    let config = TempDir::new().unwrap();
    let output = dsplab_bin()
        .env("XDG_CONFIG_HOME", config.path())
        .args(["presets", "copy", "tour", "--name", "my_tour"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let copied = config.path().join("dsplab/presets/my_tour.toml");
    let preset = Preset::load(&copied).unwrap();
    assert_eq!(preset.name, "my_tour");
    assert_eq!(preset.len(), LESSON_NAMES.len());

    let again = dsplab_bin()
        .env("XDG_CONFIG_HOME", config.path())
        .args(["presets", "copy", "tour", "--name", "my_tour"])
        .output()
        .unwrap();
    assert!(!again.status.success());
}
