//! Run every lesson in a preset.

use clap::Args;
use dsplab_config::resolve_preset;

use super::common::print_reports;

#[derive(Args)]
pub struct RunArgs {
    /// Factory preset name, user preset name, or path to a preset file
    preset: String,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let preset = resolve_preset(&args.preset).map_err(|e| {
        anyhow::anyhow!(
            "{}. Use 'dsplab presets list' to see available presets.",
            e
        )
    })?;
    tracing::info!(preset = %preset.name, lessons = preset.len(), "running preset");

    let reports = preset.run()?;

    if !args.json {
        println!("Preset: {}", preset.name);
        println!("{}", "=".repeat(8 + preset.name.len()));
        println!();
    }
    print_reports(&reports, args.json)
}
