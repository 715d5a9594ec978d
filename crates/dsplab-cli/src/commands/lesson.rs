//! Run a single lesson, optionally overriding parameters.

use clap::Args;

use super::common::{lesson_from_overrides, parse_key_val, print_reports};

#[derive(Args)]
pub struct LessonArgs {
    /// Lesson name (see `dsplab lessons`)
    name: String,

    /// Override a parameter, e.g. `--set taps=21 --set noise=high`
    #[arg(short = 's', long = "set", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Print the lesson parameters as TOML instead of running it
    #[arg(long)]
    show_params: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: LessonArgs) -> anyhow::Result<()> {
    let lesson = lesson_from_overrides(&args.name, &args.params)?;

    if args.show_params {
        print!("{}", toml::to_string_pretty(&lesson)?);
        return Ok(());
    }

    let report = lesson.run()?;
    print_reports(std::slice::from_ref(&report), args.json)
}
