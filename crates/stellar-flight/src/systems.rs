//! ECS systems driving [`ShipFlightController`] from the two loops.

use bevy_ecs::prelude::*;
use stellar_gravity::GravitySolver;
use stellar_sim::{Position, Rotation, SimTime};

use crate::body::{FlightBody, ShipBody};
use crate::controller::ShipFlightController;
use crate::input::FlightInput;

/// Forwards each ship's [`FlightInput`] into its controller.
///
/// The controller clamps the values and drops them while nobody is piloting.
pub fn flight_input_system(mut ships: Query<(&FlightInput, &mut ShipFlightController)>) {
    for (input, mut ship) in ships.iter_mut() {
        ship.set_thrust_input(input.thrust);
        ship.set_rotation_input(input.rotation);
        ship.set_boost(input.boost);
        ship.set_brake(input.brake);
    }
}

/// Accumulates pilot rotation into every ship's target orientation, once per frame.
pub fn flight_orientation_system(
    time: Res<SimTime>,
    mut ships: Query<(&mut ShipFlightController, Option<&ShipBody>)>,
) {
    for (mut ship, body) in ships.iter_mut() {
        let rotation = body.map_or_else(|| ship.target_orientation(), |b| b.rotation);
        ship.update_orientation(rotation, time.frame_dt);
    }
}

/// Applies thrust, rotation, brake and gravity, once per fixed step.
pub fn flight_physics_system(
    time: Res<SimTime>,
    mut ships: Query<(
        &mut ShipFlightController,
        Option<&mut ShipBody>,
        Option<&GravitySolver>,
    )>,
) {
    for (mut ship, mut body, solver) in ships.iter_mut() {
        let body = body.as_deref_mut().map(|b| b as &mut dyn FlightBody);
        ship.fixed_step(body, solver, time.fixed_dt);
    }
}

/// Integrates queued accelerations and writes the result back to the
/// entity's [`Position`] and [`Rotation`].
pub fn integrate_bodies_system(
    time: Res<SimTime>,
    mut bodies: Query<(&mut ShipBody, &mut Position, Option<&mut Rotation>)>,
) {
    for (mut body, mut position, rotation) in bodies.iter_mut() {
        let displacement = body.integrate(time.fixed_dt);
        if displacement != glam::Vec3::ZERO {
            position.0 += displacement;
        }
        if let Some(mut rotation) = rotation {
            if rotation.0 != body.rotation {
                rotation.0 = body.rotation;
            }
        }
    }
}
