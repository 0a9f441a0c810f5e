//! Rigid-body seam used by the flight controller, and a simple integrator.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

/// Read-modify-write primitives the flight controller needs from a physics host.
///
/// Accelerations are mass-independent: every body responds to the same
/// acceleration identically regardless of its mass.
pub trait FlightBody {
    /// Current orientation.
    fn rotation(&self) -> Quat;

    /// Overwrite the orientation.
    fn set_rotation(&mut self, rotation: Quat);

    /// Current linear velocity in m/s.
    fn linear_velocity(&self) -> Vec3;

    /// Queue an acceleration (m/s²) applied over the next integration step.
    fn add_acceleration(&mut self, acceleration: Vec3);

    /// Change velocity immediately, independent of mass and step length.
    fn apply_velocity_change(&mut self, delta: Vec3);
}

/// Semi-implicit Euler rigid body for ships.
///
/// Position lives in the entity's `Position` component; [`ShipBody::integrate`]
/// returns the displacement for the step.
#[derive(Component, Clone, Debug)]
pub struct ShipBody {
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
    /// Linear velocity in m/s.
    pub linear_velocity: Vec3,
    /// Mass in kilograms. Reported only: flight forces are accelerations.
    pub mass: f32,
    /// Linear damping coefficient, applied as `v *= 1 - damping × dt`.
    pub linear_damping: f32,
    pending_acceleration: Vec3,
}

impl Default for ShipBody {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl ShipBody {
    /// Create a stationary body with identity orientation.
    pub fn new(mass: f32) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            mass,
            linear_damping: 0.0,
            pending_acceleration: Vec3::ZERO,
        }
    }

    /// Set the initial orientation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self
    }

    /// Set the initial velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Current speed in m/s.
    pub fn speed(&self) -> f32 {
        self.linear_velocity.length()
    }

    /// Acceleration queued for the next step.
    pub fn pending_acceleration(&self) -> Vec3 {
        self.pending_acceleration
    }

    /// Advance velocity by the queued acceleration and return the step's
    /// displacement. Clears the queue.
    pub fn integrate(&mut self, dt: f32) -> Vec3 {
        self.linear_velocity += self.pending_acceleration * dt;
        self.pending_acceleration = Vec3::ZERO;

        if self.linear_damping > 0.0 {
            self.linear_velocity *= (1.0 - self.linear_damping * dt).max(0.0);
        }

        self.linear_velocity * dt
    }
}

impl FlightBody for ShipBody {
    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn add_acceleration(&mut self, acceleration: Vec3) {
        self.pending_acceleration += acceleration;
    }

    fn apply_velocity_change(&mut self, delta: Vec3) {
        self.linear_velocity += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_preserved_without_input() {
        let mut body = ShipBody::new(500.0).with_velocity(Vec3::new(10.0, 0.0, -5.0));
        let mut position = Vec3::ZERO;
        for _ in 0..10 {
            position += body.integrate(0.1);
        }
        assert!((position - Vec3::new(10.0, 0.0, -5.0)).length() < 1e-4);
        assert_eq!(body.linear_velocity, Vec3::new(10.0, 0.0, -5.0));
    }

    #[test]
    fn test_acceleration_is_mass_independent() {
        let mut light = ShipBody::new(10.0);
        let mut heavy = ShipBody::new(10_000.0);
        light.add_acceleration(Vec3::X * 4.0);
        heavy.add_acceleration(Vec3::X * 4.0);
        light.integrate(0.5);
        heavy.integrate(0.5);
        assert_eq!(light.linear_velocity, heavy.linear_velocity);
        assert!((light.linear_velocity.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_pending_acceleration_cleared_after_step() {
        let mut body = ShipBody::default();
        body.add_acceleration(Vec3::Y);
        body.add_acceleration(Vec3::Y);
        assert_eq!(body.pending_acceleration(), Vec3::Y * 2.0);
        body.integrate(1.0);
        assert_eq!(body.pending_acceleration(), Vec3::ZERO);
        body.integrate(1.0);
        assert!((body.linear_velocity.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_damping_slows_body() {
        let mut body = ShipBody::default().with_velocity(Vec3::new(100.0, 0.0, 0.0));
        body.linear_damping = 1.0;
        for _ in 0..600 {
            body.integrate(1.0 / 60.0);
        }
        assert!(body.speed() < 1.0, "got {}", body.speed());
    }

    #[test]
    fn test_velocity_change_is_immediate() {
        let mut body = ShipBody::default().with_velocity(Vec3::new(3.0, 0.0, 0.0));
        body.apply_velocity_change(Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }
}
