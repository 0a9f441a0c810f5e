//! Headless Stellar demo.
//!
//! Builds a small star system from `config.ron` (two planets and a uniform
//! gravity zone), puts a ship under a scripted pilot, and runs the fixed-step
//! and frame loops for the configured simulated duration while logging
//! telemetry.
//!
//! Run with: `cargo run -p stellar-demo -- --seconds 20`

mod autopilot;
mod contact;
mod scenario;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use stellar_config::{CliArgs, Config, ConfigError};
use tracing::{error, info};

use crate::scenario::Scenario;

fn config_dir(args: &CliArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn load_config(args: &CliArgs) -> Result<Config, ConfigError> {
    let mut config = Config::load_or_create(&config_dir(args))?;
    config.apply_cli_overrides(args);
    Ok(config)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let loaded = load_config(&args);

    let log_dir = config_dir(&args).join("logs");
    if let Err(err) = stellar_log::init_logging(
        Some(&log_dir),
        cfg!(debug_assertions),
        loaded.as_ref().ok(),
    ) {
        eprintln!("logging unavailable: {err}");
    }

    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        seconds = config.simulation.duration_seconds,
        fixed_hz = config.simulation.fixed_hz,
        frame_hz = config.simulation.frame_hz,
        "Stellar demo starting"
    );

    let mut scenario = match Scenario::build(&config) {
        Ok(scenario) => scenario,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let summary = scenario.run();
    info!(
        frames = summary.frames,
        fixed_steps = summary.fixed_steps,
        simulated_seconds = summary.simulated_seconds,
        "run complete"
    );
    ExitCode::SUCCESS
}
