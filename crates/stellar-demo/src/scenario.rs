//! Builds the demo world from config and runs it headless.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::IntoSystemConfigs;
use glam::Quat;
use stellar_config::{BodyConfig, Config, ConfigError};
use stellar_flight::{FlightInput, ShipBody, ShipFlightController, flight_input_system};
use stellar_gravity::{GravityBody, GravityRegistry, GravitySolver};
use stellar_sim::{
    Active, FixedStepSet, FrameSet, Name, Position, Rotation, SimSchedule, SimSchedules, SimTime,
};
use tracing::info;

use crate::autopilot::{Autopilot, autopilot_system};
use crate::contact::{Hull, Surface, surface_contact_system};
use crate::telemetry::{TelemetrySettings, telemetry_system};

/// Radius of the ship's collision sphere in meters.
const SHIP_HULL_RADIUS: f32 = 2.0;

/// A populated world plus the schedules that drive it.
pub struct Scenario {
    /// World holding the bodies, the ship and the registry.
    pub world: World,
    /// Frame and fixed-step schedules.
    pub schedules: SimSchedules,
    /// The piloted ship entity.
    pub ship: Entity,
    frame_hz: u32,
    duration: f64,
}

/// Totals reported after a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Frames run.
    pub frames: u64,
    /// Fixed physics steps run.
    pub fixed_steps: u64,
    /// Simulated time in seconds.
    pub simulated_seconds: f64,
}

impl Scenario {
    /// Spawn every configured body and the ship, and register all systems.
    pub fn build(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = stellar_sim::create_world();
        world.insert_resource(GravityRegistry::with_epsilon(config.gravity.dominant_epsilon));
        world.insert_resource(TelemetrySettings::new(
            config.debug.telemetry_interval_seconds,
            config.debug.log_contributors,
        ));

        for body in &config.gravity.bodies {
            spawn_body(&mut world, body)?;
        }
        let ship = spawn_ship(&mut world, config);

        let mut schedules = SimSchedules::new(config.simulation.fixed_hz)
            .with_max_steps(config.simulation.max_steps_per_frame);
        stellar_gravity::add_gravity_systems(&mut schedules);
        stellar_flight::add_flight_systems(&mut schedules);
        schedules.add_systems(
            SimSchedule::FixedStep,
            surface_contact_system
                .in_set(FixedStepSet::Integrate)
                .after(stellar_flight::integrate_bodies_system),
        );
        schedules.add_systems(
            SimSchedule::Frame,
            (
                autopilot_system
                    .in_set(FrameSet::Input)
                    .before(flight_input_system),
                telemetry_system.in_set(FrameSet::Telemetry),
            ),
        );
        schedules.initialize(&mut world);

        info!(
            bodies = config.gravity.bodies.len(),
            fixed_hz = config.simulation.fixed_hz,
            frame_hz = config.simulation.frame_hz,
            "scenario ready"
        );

        Ok(Self {
            world,
            schedules,
            ship,
            frame_hz: config.simulation.frame_hz,
            duration: config.simulation.duration_seconds,
        })
    }

    /// Advance one frame.
    pub fn step(&mut self) -> u32 {
        self.schedules.run(&mut self.world, 1.0 / f64::from(self.frame_hz))
    }

    /// Run frames until the configured duration has been simulated.
    pub fn run(&mut self) -> RunSummary {
        let frames = (self.duration * f64::from(self.frame_hz)).ceil() as u64;
        for _ in 0..frames {
            self.step();
        }
        self.summary()
    }

    /// Totals so far.
    pub fn summary(&self) -> RunSummary {
        let time = self.world.resource::<SimTime>();
        RunSummary {
            frames: time.frame,
            fixed_steps: time.tick,
            simulated_seconds: time.elapsed,
        }
    }
}

fn spawn_body(world: &mut World, body: &BodyConfig) -> Result<Entity, ConfigError> {
    let source = body.build()?;
    let mut entity = world.spawn((
        Name::new(body.name()),
        Position(body.center()),
        Active(true),
        GravityBody::from_boxed(source),
    ));
    if let BodyConfig::Planet { surface_radius, .. } = body {
        entity.insert(Surface {
            radius: *surface_radius,
        });
    }
    let entity = entity.id();
    stellar_gravity::activate_gravity_body(world, entity);
    info!(name = body.name(), center = ?body.center(), "gravity body spawned");
    Ok(entity)
}

fn spawn_ship(world: &mut World, config: &Config) -> Entity {
    let ship = &config.ship;
    let mut body = ShipBody::new(ship.mass);
    body.linear_damping = ship.linear_damping;
    let solver = GravitySolver::new(config.gravity.solve_mode)
        .with_up_alignment_rate(config.gravity.up_alignment_rate);

    world
        .spawn((
            Name::new("Ship"),
            Position(ship.spawn_position),
            Rotation::default(),
            body,
            solver,
            Hull::new(SHIP_HULL_RADIUS),
            FlightInput::default(),
            ShipFlightController::new(ship.flight.clone(), Quat::IDENTITY),
            Autopilot::demo_flight(),
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn short_config(seconds: f64) -> Config {
        let mut config = Config::default();
        config.simulation.duration_seconds = seconds;
        config
    }

    #[test]
    fn test_build_registers_all_bodies() {
        let scenario = Scenario::build(&Config::default()).unwrap();
        let registry = scenario.world.resource::<GravityRegistry>();
        assert_eq!(registry.len(), Config::default().gravity.bodies.len());
    }

    #[test]
    fn test_invalid_body_fails_build() {
        let mut config = Config::default();
        config.gravity.bodies.push(BodyConfig::Planet {
            name: "Bad".to_string(),
            center: Vec3::ZERO,
            surface_gravity: -1.0,
            surface_radius: 1.0,
            max_range: 1.0,
            priority: 0,
            mode: Default::default(),
        });
        assert!(matches!(
            Scenario::build(&config),
            Err(ConfigError::InvalidBody { .. })
        ));
    }

    #[test]
    fn test_run_counts_frames_and_steps() {
        let mut scenario = Scenario::build(&short_config(2.0)).unwrap();
        let summary = scenario.run();
        assert_eq!(summary.frames, 120);
        // 50 Hz over two seconds, allowing for accumulator rounding.
        assert!((99..=100).contains(&summary.fixed_steps), "{summary:?}");
    }

    #[test]
    fn test_ship_climbs_under_autopilot() {
        let mut scenario = Scenario::build(&short_config(4.0)).unwrap();
        let start = scenario.world.get::<Position>(scenario.ship).unwrap().0;
        scenario.run();
        let end = scenario.world.get::<Position>(scenario.ship).unwrap().0;
        assert!(end.length() > start.length(), "start={start:?} end={end:?}");

        let solver = scenario.world.get::<GravitySolver>(scenario.ship).unwrap();
        assert!(solver.current_gravity().length() > 0.0);
    }

    #[test]
    fn test_unpiloted_ship_falls_and_lands() {
        let mut config = short_config(30.0);
        config.ship.spawn_position = Vec3::new(0.0, 110.0, 0.0);
        let mut scenario = Scenario::build(&config).unwrap();
        scenario
            .world
            .entity_mut(scenario.ship)
            .remove::<Autopilot>();
        scenario.run();

        let ship = scenario.world.get::<ShipFlightController>(scenario.ship).unwrap();
        assert!(ship.is_grounded());
        let position = scenario.world.get::<Position>(scenario.ship).unwrap().0;
        assert!((position.length() - (100.0 + SHIP_HULL_RADIUS)).abs() < 0.5, "{position:?}");
    }
}
