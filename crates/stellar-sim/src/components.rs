//! Core ECS components shared across the simulation crates.
//!
//! Positions are plain `f32` world-space meters. Gravity sources, solvers
//! and ships all read the same [`Position`], so a body that moves under
//! thrust is seen by the gravity registry at its integrated location.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

/// World-space position in meters.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct Position(pub Vec3);

impl Position {
    /// Creates a new [`Position`] from meter coordinates.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }
}

/// Orientation as a unit quaternion. Forward is local −Z, up is +Y,
/// right is +X.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Rotation(pub Quat);

impl Default for Rotation {
    fn default() -> Self {
        Self(Quat::IDENTITY)
    }
}

/// Human-readable debug name for an entity, used in log messages.
#[derive(Component, Clone, Debug, PartialEq, Eq, Default)]
pub struct Name(pub String);

impl Name {
    /// Creates a new [`Name`] from anything that converts to `String`.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Whether the entity is enabled. Toggling this is the activation
/// lifecycle: gravity bodies register when it turns on and unregister
/// when it turns off, without despawning the entity.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_can_be_added_to_entity() {
        let mut world = World::new();
        let entity = world.spawn(Position::new(1.0, 2.0, 3.0)).id();
        let pos = world.get::<Position>(entity).unwrap();
        assert_eq!(pos.0, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_rotation_defaults_to_identity() {
        assert_eq!(Rotation::default().0, Quat::IDENTITY);
    }

    #[test]
    fn test_active_defaults_to_true() {
        assert!(Active::default().0);
    }

    #[test]
    fn test_query_by_component_type() {
        let mut world = World::new();
        world.spawn((Position::new(1.0, 0.0, 0.0), Name::new("ship")));
        world.spawn(Position::new(4.0, 5.0, 6.0));
        world.spawn(Name::new("orphan"));

        let mut query = world.query::<(&Position, &Name)>();
        let results: Vec<_> = query.iter(&world).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1.0, "ship");
    }
}
