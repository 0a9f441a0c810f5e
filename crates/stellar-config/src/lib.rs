//! Configuration for the Stellar simulation.
//!
//! Settings persist to disk as RON files. Missing fields fall back to their
//! defaults and unknown fields are ignored, so old and new config files both
//! load. CLI flags override loaded values via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{BodyConfig, Config, DebugConfig, GravityConfig, ShipConfig, SimulationConfig};
pub use error::ConfigError;
