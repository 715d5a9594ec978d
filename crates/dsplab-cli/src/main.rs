//! dsplab CLI - run the DSP lessons from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dsplab")]
#[command(author, version, about = "dsplab DSP lessons CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every lesson in a preset
    Run(commands::run::RunArgs),

    /// Run a single lesson
    Lesson(commands::lesson::LessonArgs),

    /// List available lessons
    Lessons,

    /// List and inspect presets
    Presets(commands::presets::PresetsArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `--json` output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Lesson(args) => commands::lesson::run(args),
        Commands::Lessons => commands::lessons::run(),
        Commands::Presets(args) => commands::presets::run(args),
    }
}
