//! Shared CLI helpers used across multiple commands.

use dsplab_lessons::{Lesson, LessonReport};

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        )),
    }
}

/// Render a value as a TOML literal; anything that is not already one is quoted.
fn toml_literal(value: &str) -> String {
    if toml::from_str::<toml::Table>(&format!("v = {value}")).is_ok() {
        value.to_string()
    } else {
        toml::Value::String(value.to_string()).to_string()
    }
}

/// Build a lesson from its name and `key=value` overrides.
///
/// Unset parameters keep the lesson defaults.
pub fn lesson_from_overrides(name: &str, overrides: &[(String, String)]) -> anyhow::Result<Lesson> {
    let name = name.to_lowercase();
    let Some(defaults) = Lesson::default_for(&name) else {
        anyhow::bail!(
            "Unknown lesson '{}'. Use 'dsplab lessons' to see available lessons.",
            name
        );
    };
    let known: toml::Table = toml::from_str(&toml::to_string(&defaults)?)?;

    let mut doc = format!("lesson = \"{name}\"\n");
    for (key, value) in overrides {
        if key == "lesson" || !known.contains_key(key) {
            let params: Vec<&str> = known
                .keys()
                .map(String::as_str)
                .filter(|k| *k != "lesson")
                .collect();
            anyhow::bail!(
                "Unknown parameter '{}' for lesson '{}' (expected one of: {})",
                key,
                name,
                params.join(", ")
            );
        }
        doc.push_str(&format!("{key} = {}\n", toml_literal(value)));
    }
    let lesson: Lesson = toml::from_str(&doc)
        .map_err(|e| anyhow::anyhow!("invalid parameters for '{}': {}", name, e))?;
    Ok(lesson)
}

/// Print reports as text blocks or as a pretty JSON array.
pub fn print_reports(reports: &[LessonReport], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{report}");
    }
    Ok(())
}
