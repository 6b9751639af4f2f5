//! Command-line argument parsing for the Astralis viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Astralis command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "astralis", about = "Astralis NEO trajectory viewer")]
pub struct CliArgs {
    /// Trajectory JSON file as returned by the orbital service.
    #[arg(long)]
    pub trajectory: Option<PathBuf>,

    /// Duration of one animation loop in milliseconds.
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Seconds between trajectory samples when the payload has no `dt`.
    #[arg(long)]
    pub step_interval: Option<f64>,

    /// Frames to run before exiting (0 = until quit).
    #[arg(long)]
    pub frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ms) = args.duration_ms {
            self.animation.duration_ms = ms;
        }
        if let Some(dt) = args.step_interval {
            self.metrics.step_interval_s = dt;
        }
        if let Some(frames) = args.frames {
            self.host.frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
