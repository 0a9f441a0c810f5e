//! Six-degrees-of-freedom ship flight controller.
//!
//! Rotation is split across the two loops. Every frame, pilot rotation input
//! is accumulated into a target orientation ([`ShipFlightController::update_orientation`]).
//! Every fixed step, the body is slerped toward that target and thrust, brake
//! and gravity are applied ([`ShipFlightController::fixed_step`]). The target
//! is never reset, so rotation accumulates at the same rate regardless of
//! frame rate even though the body lags behind it.
//!
//! Axes follow the body: forward is local −Z, right is +X, up is +Y.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use stellar_gravity::GravitySolver;

use crate::body::FlightBody;

/// Speed (m/s) below which braking snaps velocity to exactly zero.
pub const BRAKE_SNAP_SPEED: f32 = 0.1;

/// Ship tuning parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipFlightConfig {
    /// Thrust acceleration at full input, in m/s².
    pub thrust_force: f32,
    /// Thrust multiplier while boosting.
    pub boost_multiplier: f32,
    /// Pitch rate at full input, in rad/s.
    pub max_pitch_speed: f32,
    /// Yaw rate at full input, in rad/s.
    pub max_yaw_speed: f32,
    /// Roll rate at full input, in rad/s.
    pub max_roll_speed: f32,
    /// Rate at which the body slerps toward the target orientation, per second.
    pub rotation_smoothing: f32,
    /// Braking deceleration in m/s².
    pub brake_force: f32,
    /// Share of solver gravity the ship feels: 0 is immune, 1 is full strength.
    pub gravity_multiplier: f32,
    /// Whether gravity is applied at all.
    pub apply_gravity: bool,
}

impl Default for ShipFlightConfig {
    fn default() -> Self {
        Self {
            thrust_force: 20.0,
            boost_multiplier: 3.0,
            max_pitch_speed: 1.5,
            max_yaw_speed: 1.2,
            max_roll_speed: 2.0,
            rotation_smoothing: 6.0,
            brake_force: 15.0,
            gravity_multiplier: 1.0,
            apply_gravity: true,
        }
    }
}

/// Read-only snapshot for presentation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightTelemetry {
    /// Linear velocity in m/s.
    pub velocity: Vec3,
    /// Speed in m/s.
    pub speed: f32,
    /// Gravity felt by the ship this step (after the multiplier).
    pub gravity: Vec3,
    /// Local up from the gravity solver, or world +Y without one.
    pub local_up: Vec3,
    /// Someone is flying the ship.
    pub is_piloting: bool,
    /// At least one collision contact is active.
    pub is_grounded: bool,
    /// Brake is engaged.
    pub is_braking: bool,
    /// Boost is engaged.
    pub is_boosting: bool,
}

/// Flight state for one ship.
#[derive(Component, Clone, Debug)]
pub struct ShipFlightController {
    /// Tuning parameters.
    pub config: ShipFlightConfig,
    thrust_input: Vec3,
    rotation_input: Vec3,
    boost: bool,
    brake: bool,
    target_orientation: Quat,
    contacts: u32,
    piloting: bool,
    warned_missing_body: bool,
    warned_missing_solver: bool,
}

impl ShipFlightController {
    /// Create an unpiloted controller whose target starts at `orientation`.
    ///
    /// Rates and forces are clamped to finite non-negative values and the
    /// gravity multiplier to [0, 1].
    pub fn new(mut config: ShipFlightConfig, orientation: Quat) -> Self {
        config.thrust_force = non_negative(config.thrust_force);
        config.boost_multiplier = non_negative(config.boost_multiplier);
        config.max_pitch_speed = non_negative(config.max_pitch_speed);
        config.max_yaw_speed = non_negative(config.max_yaw_speed);
        config.max_roll_speed = non_negative(config.max_roll_speed);
        config.rotation_smoothing = non_negative(config.rotation_smoothing);
        config.brake_force = non_negative(config.brake_force);
        config.gravity_multiplier = non_negative(config.gravity_multiplier).min(1.0);
        Self {
            config,
            thrust_input: Vec3::ZERO,
            rotation_input: Vec3::ZERO,
            boost: false,
            brake: false,
            target_orientation: orientation.normalize(),
            contacts: 0,
            piloting: false,
            warned_missing_body: false,
            warned_missing_solver: false,
        }
    }

    /// Board or leave the ship. Leaving clears every input.
    pub fn set_piloting(&mut self, piloting: bool) {
        if self.piloting != piloting {
            tracing::info!(piloting, "pilot state changed");
        }
        self.piloting = piloting;
        if !piloting {
            self.thrust_input = Vec3::ZERO;
            self.rotation_input = Vec3::ZERO;
            self.boost = false;
            self.brake = false;
        }
    }

    /// Set `(strafe, vertical, forward)` thrust. Clamped jointly to unit
    /// length. Ignored while nobody is piloting.
    pub fn set_thrust_input(&mut self, thrust: Vec3) {
        if !self.piloting {
            return;
        }
        self.thrust_input = if thrust.is_finite() {
            thrust.clamp_length_max(1.0)
        } else {
            Vec3::ZERO
        };
    }

    /// Set `(pitch, yaw, roll)` input. Each axis clamped to [-1, 1].
    /// Ignored while nobody is piloting.
    pub fn set_rotation_input(&mut self, rotation: Vec3) {
        if !self.piloting {
            return;
        }
        self.rotation_input = if rotation.is_finite() {
            rotation.clamp(Vec3::NEG_ONE, Vec3::ONE)
        } else {
            Vec3::ZERO
        };
    }

    /// Engage or release boost. Ignored while nobody is piloting.
    pub fn set_boost(&mut self, boost: bool) {
        self.boost = boost && self.piloting;
    }

    /// Engage or release the brake. Ignored while nobody is piloting.
    pub fn set_brake(&mut self, brake: bool) {
        self.brake = brake && self.piloting;
    }

    /// Current clamped thrust input.
    pub fn thrust_input(&self) -> Vec3 {
        self.thrust_input
    }

    /// Current clamped rotation input.
    pub fn rotation_input(&self) -> Vec3 {
        self.rotation_input
    }

    /// The accumulated orientation the body is steering toward.
    pub fn target_orientation(&self) -> Quat {
        self.target_orientation
    }

    /// Snap the target, e.g. when teleporting the ship.
    pub fn reset_target_orientation(&mut self, orientation: Quat) {
        self.target_orientation = orientation.normalize();
    }

    /// Someone is flying the ship.
    pub fn is_piloting(&self) -> bool {
        self.piloting
    }

    /// At least one collision contact is active.
    pub fn is_grounded(&self) -> bool {
        self.contacts > 0
    }

    /// Brake is engaged.
    pub fn is_braking(&self) -> bool {
        self.brake
    }

    /// Boost is engaged.
    pub fn is_boosting(&self) -> bool {
        self.boost
    }

    /// Number of active collision contacts.
    pub fn contact_count(&self) -> u32 {
        self.contacts
    }

    /// A collision contact began.
    pub fn on_collision_enter(&mut self) {
        self.contacts = self.contacts.saturating_add(1);
    }

    /// A collision contact ended. Unmatched exits are ignored.
    pub fn on_collision_exit(&mut self) {
        self.contacts = self.contacts.saturating_sub(1);
    }

    /// Accumulate this frame's pilot rotation into the target orientation.
    ///
    /// Each axis rotates about the body's current local axis by
    /// `input × max speed × dt`, composed as `yaw ∘ pitch ∘ roll ∘ target`.
    pub fn update_orientation(&mut self, body_rotation: Quat, dt: f32) {
        if self.rotation_input == Vec3::ZERO || dt <= 0.0 {
            return;
        }

        let right = body_rotation * Vec3::X;
        let up = body_rotation * Vec3::Y;
        let forward = body_rotation * Vec3::NEG_Z;
        let input = self.rotation_input;

        let pitch = Quat::from_axis_angle(right, input.x * self.config.max_pitch_speed * dt);
        // Positive yaw turns the nose right, a negative turn about +Y.
        let yaw = Quat::from_axis_angle(up, -input.y * self.config.max_yaw_speed * dt);
        let roll = Quat::from_axis_angle(forward, input.z * self.config.max_roll_speed * dt);

        self.target_orientation = (yaw * pitch * roll * self.target_orientation).normalize();
    }

    /// Apply thrust, rotation, brake and gravity for one physics step.
    ///
    /// A missing body skips the whole step; a missing solver skips gravity.
    /// Each is reported once.
    pub fn fixed_step(
        &mut self,
        body: Option<&mut dyn FlightBody>,
        solver: Option<&GravitySolver>,
        dt: f32,
    ) {
        let Some(body) = body else {
            if !self.warned_missing_body {
                tracing::warn!("ship has no rigid body, flight disabled");
                self.warned_missing_body = true;
            }
            return;
        };

        self.apply_thrust(body);

        let t = (self.config.rotation_smoothing * dt).clamp(0.0, 1.0);
        let rotation = body.rotation().slerp(self.target_orientation, t).normalize();
        body.set_rotation(rotation);

        if self.brake {
            self.apply_brake(body, dt);
        }

        let gravity = self.felt_gravity(solver);
        if gravity != Vec3::ZERO {
            body.add_acceleration(gravity);
        }
    }

    /// Snapshot of the flags and motion state for presentation.
    pub fn telemetry(&self, body: &dyn FlightBody, solver: Option<&GravitySolver>) -> FlightTelemetry {
        let velocity = body.linear_velocity();
        FlightTelemetry {
            velocity,
            speed: velocity.length(),
            gravity: self.gravity_contribution(solver),
            local_up: solver.map_or(Vec3::Y, |s| s.local_up()),
            is_piloting: self.piloting,
            is_grounded: self.is_grounded(),
            is_braking: self.brake,
            is_boosting: self.boost,
        }
    }

    fn apply_thrust(&self, body: &mut dyn FlightBody) {
        if self.thrust_input == Vec3::ZERO {
            return;
        }

        let local = Vec3::new(self.thrust_input.x, self.thrust_input.y, -self.thrust_input.z);
        let mut magnitude = self.config.thrust_force;
        if self.boost {
            magnitude *= self.config.boost_multiplier;
        }
        body.add_acceleration(body.rotation() * local * magnitude);
    }

    fn apply_brake(&self, body: &mut dyn FlightBody, dt: f32) {
        let velocity = body.linear_velocity();
        let speed = velocity.length();

        if speed < BRAKE_SNAP_SPEED {
            if speed > 0.0 {
                body.apply_velocity_change(-velocity);
            }
            return;
        }

        let reduction = (self.config.brake_force * dt).min(speed).max(0.0);
        body.apply_velocity_change(-velocity / speed * reduction);

        let remaining = body.linear_velocity();
        if remaining.length() < BRAKE_SNAP_SPEED {
            body.apply_velocity_change(-remaining);
        }
    }

    fn felt_gravity(&mut self, solver: Option<&GravitySolver>) -> Vec3 {
        if !self.config.apply_gravity {
            return Vec3::ZERO;
        }
        if solver.is_none() && !self.warned_missing_solver {
            tracing::warn!("ship has no gravity solver, gravity disabled");
            self.warned_missing_solver = true;
        }
        self.gravity_contribution(solver)
    }

    fn gravity_contribution(&self, solver: Option<&GravitySolver>) -> Vec3 {
        match solver {
            Some(solver) if self.config.apply_gravity && solver.gravity_enabled => {
                solver.current_gravity() * self.config.gravity_multiplier
            }
            _ => Vec3::ZERO,
        }
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
