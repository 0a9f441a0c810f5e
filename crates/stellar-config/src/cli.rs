//! Command-line argument parsing for the Stellar demo.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Stellar command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "stellar", about = "Headless multi-body gravity and ship flight simulation")]
pub struct CliArgs {
    /// Simulated seconds to run.
    #[arg(long)]
    pub seconds: Option<f64>,

    /// Fixed physics step rate in Hz.
    #[arg(long)]
    pub fixed_hz: Option<u32>,

    /// Simulated frame rate in Hz.
    #[arg(long)]
    pub frame_hz: Option<u32>,

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
        if let Some(seconds) = args.seconds {
            self.simulation.duration_seconds = seconds;
        }
        if let Some(hz) = args.fixed_hz {
            self.simulation.fixed_hz = hz;
        }
        if let Some(hz) = args.frame_hz {
            self.simulation.frame_hz = hz;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
