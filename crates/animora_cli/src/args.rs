// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments for the headless runner.

use clap::Parser;
use std::path::PathBuf;

/// Default simulated frame rate
pub const DEFAULT_FPS: f32 = 60.0;

/// Default cap on simulated time
pub const DEFAULT_MAX_SECONDS: f32 = 60.0;

/// Run an Animora timeline document headlessly and log clip lifecycle events
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "animora",
    version,
    long_about = None,
    after_help = "Set RUST_LOG=animora_timeline=trace to see per-frame evaluation."
)]
pub struct CliArgs {
    /// Timeline document to run (.ron or .json)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Simulated frames per second
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = positive)]
    pub fps: f32,

    /// Stop after this much simulated time, even when looping forever
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_MAX_SECONDS, value_parser = positive)]
    pub max_seconds: f32,

    /// Scrub the timeline in preview mode instead of playing it
    #[arg(long)]
    pub preview: bool,
}

fn positive(value: &str) -> Result<f32, String> {
    match value.parse::<f32>() {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(v),
        _ => Err(format!("expected a positive number, got '{value}'")),
    }
}
