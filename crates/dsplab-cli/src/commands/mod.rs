//! CLI command implementations.

pub mod common;
pub mod lesson;
pub mod lessons;
pub mod presets;
pub mod run;
