//! World factory function and core resource registration.

use bevy_ecs::prelude::*;

use crate::SimTime;

/// Registers the core simulation resources with default values.
///
/// Domain resources such as the gravity registry are inserted by their
/// owning crates so the dependency is explicit at the call site.
pub fn register_core_resources(world: &mut World) {
    world.insert_resource(SimTime::default());
}

/// Creates an ECS world with [`SimTime`] pre-inserted.
pub fn create_world() -> World {
    let mut world = World::new();
    register_core_resources(&mut world);
    world
}
