//! Pilot input as written by the input layer.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Normalized flight commands for one ship.
///
/// The input layer owns this component; [`crate::flight_input_system`]
/// forwards it into the controller each frame, which clamps it.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct FlightInput {
    /// `(strafe, vertical, forward)`; positive is right, up, forward.
    pub thrust: Vec3,
    /// `(pitch, yaw, roll)`; positive is nose up, nose right, right wing down.
    pub rotation: Vec3,
    /// Multiply thrust by the boost multiplier.
    pub boost: bool,
    /// Bleed off velocity.
    pub brake: bool,
}

impl FlightInput {
    /// Input with only forward thrust set.
    pub fn forward(amount: f32) -> Self {
        Self {
            thrust: Vec3::new(0.0, 0.0, amount),
            ..Self::default()
        }
    }

    /// Whether any command is non-neutral.
    pub fn is_idle(&self) -> bool {
        self.thrust == Vec3::ZERO && self.rotation == Vec3::ZERO && !self.boost && !self.brake
    }
}
