//! Six-degrees-of-freedom ship flight on top of the gravity solver.
//!
//! A ship is an entity with a [`ShipFlightController`], a [`ShipBody`] and,
//! usually, a [`stellar_gravity::GravitySolver`]. The input layer writes
//! [`FlightInput`]; the frame loop turns rotation input into a target
//! orientation, and the fixed-step loop applies thrust, rotation, brake and
//! gravity before integrating the body.

mod body;
mod controller;
mod input;
mod systems;

pub use body::{FlightBody, ShipBody};
pub use controller::{BRAKE_SNAP_SPEED, FlightTelemetry, ShipFlightConfig, ShipFlightController};
pub use input::FlightInput;
pub use systems::{
    flight_input_system, flight_orientation_system, flight_physics_system,
    integrate_bodies_system,
};

use bevy_ecs::schedule::IntoSystemConfigs;
use stellar_sim::{FixedStepSet, FrameSet, SimSchedule, SimSchedules};

/// Register flight systems in both schedules.
pub fn add_flight_systems(schedules: &mut SimSchedules) {
    schedules.add_systems(
        SimSchedule::Frame,
        (
            flight_input_system.in_set(FrameSet::Input),
            flight_orientation_system.in_set(FrameSet::Orientation),
        ),
    );
    schedules.add_systems(
        SimSchedule::FixedStep,
        (
            flight_physics_system.in_set(FixedStepSet::Flight),
            integrate_bodies_system.in_set(FixedStepSet::Integrate),
        ),
    );
}
