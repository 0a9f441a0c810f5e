//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use stellar_flight::ShipFlightConfig;
use stellar_gravity::{
    DOMINANT_EPSILON, GravityMode, GravitySource, PlanetGravity, SolveMode, UniformGravity,
};

use crate::error::ConfigError;

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Loop rates and run length.
    pub simulation: SimulationConfig,
    /// Registry tuning and the gravity bodies to spawn.
    pub gravity: GravityConfig,
    /// The piloted ship.
    pub ship: ShipConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Loop rates and run length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed physics step rate in Hz.
    pub fixed_hz: u32,
    /// Simulated frame rate in Hz.
    pub frame_hz: u32,
    /// Fixed steps allowed per frame before the backlog is dropped.
    pub max_steps_per_frame: u32,
    /// Simulated seconds to run.
    pub duration_seconds: f64,
}

/// Registry tuning and gravity bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GravityConfig {
    /// Magnitudes within this of each other tie for dominance.
    pub dominant_epsilon: f32,
    /// What ship solvers report as their current gravity.
    pub solve_mode: SolveMode,
    /// Up-vector smoothing rate per second (0 snaps).
    pub up_alignment_rate: f32,
    /// Sources spawned at startup.
    pub bodies: Vec<BodyConfig>,
}

/// One gravity source to spawn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BodyConfig {
    /// Inverse-square field around a planet.
    Planet {
        name: String,
        center: Vec3,
        surface_gravity: f32,
        surface_radius: f32,
        max_range: f32,
        #[serde(default)]
        priority: i32,
        #[serde(default)]
        mode: GravityMode,
    },
    /// Constant-direction zone.
    Uniform {
        name: String,
        center: Vec3,
        direction: Vec3,
        strength: f32,
        max_range: f32,
        #[serde(default)]
        priority: i32,
        #[serde(default)]
        mode: GravityMode,
    },
}

/// Ship spawn and tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShipConfig {
    /// World-space spawn position.
    pub spawn_position: Vec3,
    /// Body mass in kilograms.
    pub mass: f32,
    /// Linear damping coefficient.
    pub linear_damping: f32,
    /// Flight controller tuning.
    pub flight: ShipFlightConfig,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Seconds of simulated time between telemetry lines.
    pub telemetry_interval_seconds: f64,
    /// Log the full contributor breakdown with each telemetry line.
    pub log_contributors: bool,
}

// --- Default implementations ---

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_hz: stellar_sim::DEFAULT_FIXED_HZ,
            frame_hz: 60,
            max_steps_per_frame: stellar_sim::MAX_FIXED_STEPS_PER_FRAME,
            duration_seconds: 30.0,
        }
    }
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            dominant_epsilon: DOMINANT_EPSILON,
            solve_mode: SolveMode::Accumulated,
            up_alignment_rate: 4.0,
            bodies: vec![
                BodyConfig::Planet {
                    name: "Terra".to_string(),
                    center: Vec3::ZERO,
                    surface_gravity: 9.8,
                    surface_radius: 100.0,
                    max_range: 2000.0,
                    priority: 1,
                    mode: GravityMode::Both,
                },
                BodyConfig::Planet {
                    name: "Luna".to_string(),
                    center: Vec3::new(0.0, 0.0, -900.0),
                    surface_gravity: 1.6,
                    surface_radius: 40.0,
                    max_range: 600.0,
                    priority: 0,
                    mode: GravityMode::Both,
                },
                BodyConfig::Uniform {
                    name: "Station ring".to_string(),
                    center: Vec3::new(400.0, 0.0, -450.0),
                    direction: Vec3::NEG_X,
                    strength: 3.0,
                    max_range: 80.0,
                    priority: 2,
                    mode: GravityMode::Accumulate,
                },
            ],
        }
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            spawn_position: Vec3::new(0.0, 140.0, 0.0),
            mass: 1000.0,
            linear_damping: 0.0,
            flight: ShipFlightConfig::default(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            telemetry_interval_seconds: 1.0,
            log_contributors: false,
        }
    }
}

impl BodyConfig {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Planet { name, .. } | Self::Uniform { name, .. } => name,
        }
    }

    /// World-space center.
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Planet { center, .. } | Self::Uniform { center, .. } => *center,
        }
    }

    /// Build the gravity source this entry describes.
    pub fn build(&self) -> Result<Box<dyn GravitySource>, ConfigError> {
        let invalid = |source| ConfigError::InvalidBody {
            name: self.name().to_string(),
            source,
        };
        let source: Box<dyn GravitySource> = match *self {
            Self::Planet {
                center,
                surface_gravity,
                surface_radius,
                max_range,
                priority,
                mode,
                ..
            } => Box::new(
                PlanetGravity::new(center, surface_gravity, surface_radius, max_range)
                    .map_err(invalid)?
                    .with_priority(priority)
                    .with_mode(mode),
            ),
            Self::Uniform {
                center,
                direction,
                strength,
                max_range,
                priority,
                mode,
                ..
            } => Box::new(
                UniformGravity::new(center, direction, strength, max_range)
                    .map_err(invalid)?
                    .with_priority(priority)
                    .with_mode(mode),
            ),
        };
        Ok(source)
    }
}

// --- Validation ---

impl Config {
    /// Check values that would stall or break the simulation loop, every
    /// gravity body's parameters, and the ship tuning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.fixed_hz == 0 {
            return Err(ConfigError::Invalid("simulation.fixed_hz must be > 0".into()));
        }
        if sim.frame_hz == 0 {
            return Err(ConfigError::Invalid("simulation.frame_hz must be > 0".into()));
        }
        if sim.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "simulation.max_steps_per_frame must be > 0".into(),
            ));
        }
        if !sim.duration_seconds.is_finite() || sim.duration_seconds < 0.0 {
            return Err(ConfigError::Invalid(
                "simulation.duration_seconds must be finite and >= 0".into(),
            ));
        }
        if !self.gravity.dominant_epsilon.is_finite() || self.gravity.dominant_epsilon < 0.0 {
            return Err(ConfigError::Invalid(
                "gravity.dominant_epsilon must be finite and >= 0".into(),
            ));
        }
        for body in &self.gravity.bodies {
            body.build()?;
        }
        self.ship.validate()
    }
}

impl ShipConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let flight = &self.flight;
        let fields = [
            ("ship.mass", self.mass),
            ("ship.linear_damping", self.linear_damping),
            ("ship.flight.thrust_force", flight.thrust_force),
            ("ship.flight.boost_multiplier", flight.boost_multiplier),
            ("ship.flight.max_pitch_speed", flight.max_pitch_speed),
            ("ship.flight.max_yaw_speed", flight.max_yaw_speed),
            ("ship.flight.max_roll_speed", flight.max_roll_speed),
            ("ship.flight.rotation_smoothing", flight.rotation_smoothing),
            ("ship.flight.brake_force", flight.brake_force),
            ("ship.flight.gravity_multiplier", flight.gravity_multiplier),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be finite and >= 0")));
            }
        }
        if flight.gravity_multiplier > 1.0 {
            return Err(ConfigError::Invalid(
                "ship.flight.gravity_multiplier must be <= 1".into(),
            ));
        }
        if !self.spawn_position.is_finite() {
            return Err(ConfigError::Invalid("ship.spawn_position must be finite".into()));
        }
        Ok(())
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Default config directory (`<platform config dir>/stellar`).
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stellar"))
    }
}
