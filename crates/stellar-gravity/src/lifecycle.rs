//! Registration lifecycle for entities that own a gravity field.
//!
//! An entity carrying [`GravityBody`] hands its source to the registry when
//! it becomes [`Active`] and takes it back when deactivated, so the field
//! survives deactivation with its parameters intact. Despawned bodies are
//! unregistered through [`RemovedComponents`].

use bevy_ecs::prelude::*;
use glam::Vec3;
use stellar_sim::{Active, Position};

use crate::registry::GravityRegistry;
use crate::source::{GravitySource, SourceId};

/// Marks an entity as a gravity source.
///
/// While registered the registry owns the source; while inactive it is
/// parked here.
#[derive(Component)]
pub struct GravityBody {
    parked: Option<Box<dyn GravitySource>>,
}

impl GravityBody {
    /// Wrap a source that has not been registered yet.
    pub fn new(source: impl GravitySource) -> Self {
        Self {
            parked: Some(Box::new(source)),
        }
    }

    /// Wrap an already boxed source, e.g. one built from config.
    pub fn from_boxed(source: Box<dyn GravitySource>) -> Self {
        Self {
            parked: Some(source),
        }
    }

    /// Whether the source currently lives in the registry.
    pub fn is_registered(&self) -> bool {
        self.parked.is_none()
    }
}

/// Spawn an active gravity body and register it immediately.
pub fn spawn_gravity_body(
    world: &mut World,
    mut source: impl GravitySource,
    position: Vec3,
) -> Entity {
    source.set_center(position);
    let entity = world
        .spawn((Position(position), Active(true), GravityBody { parked: None }))
        .id();
    world
        .get_resource_or_insert_with(GravityRegistry::new)
        .register(SourceId::from(entity), source);
    entity
}

/// Unregister and despawn a gravity body. Returns `false` if the entity
/// did not exist.
pub fn despawn_gravity_body(world: &mut World, entity: Entity) -> bool {
    if let Some(mut registry) = world.get_resource_mut::<GravityRegistry>() {
        registry.unregister(SourceId::from(entity));
    }
    world.despawn(entity)
}

/// Register a parked body's source now instead of waiting for the next
/// fixed step. Returns `false` if the entity has no [`GravityBody`] or is
/// already registered.
pub fn activate_gravity_body(world: &mut World, entity: Entity) -> bool {
    let position = world.get::<Position>(entity).map(|p| p.0);
    let Some(mut source) = world
        .get_mut::<GravityBody>(entity)
        .and_then(|mut body| body.parked.take())
    else {
        return false;
    };
    if let Some(position) = position {
        source.set_center(position);
    }
    if let Some(mut active) = world.get_mut::<Active>(entity) {
        active.0 = true;
    }
    world
        .get_resource_or_insert_with(GravityRegistry::new)
        .register_boxed(SourceId::from(entity), source)
}

/// Take a body's source back out of the registry and park it on the entity.
/// The entity is marked `Active(false)`, inserting the flag if it was
/// missing. Returns `false` if the entity has no registered [`GravityBody`].
pub fn deactivate_gravity_body(world: &mut World, entity: Entity) -> bool {
    if !world
        .get::<GravityBody>(entity)
        .is_some_and(GravityBody::is_registered)
    {
        return false;
    }
    let Some(source) = world
        .get_resource_mut::<GravityRegistry>()
        .and_then(|mut registry| registry.unregister(SourceId::from(entity)))
    else {
        return false;
    };
    if let Some(mut body) = world.get_mut::<GravityBody>(entity) {
        body.parked = Some(source);
    }
    world.entity_mut(entity).insert(Active(false));
    true
}

/// Moves sources between the registry and their [`GravityBody`] as the
/// owning entity's [`Active`] flag changes. Entities without `Active`
/// count as active.
pub fn gravity_body_activation_system(
    mut registry: ResMut<GravityRegistry>,
    mut bodies: Query<(Entity, &mut GravityBody, Option<&Position>, Option<&Active>)>,
) {
    for (entity, mut body, position, active) in bodies.iter_mut() {
        let id = SourceId::from(entity);
        let active = active.is_none_or(|a| a.0);

        if active && !body.is_registered() {
            if let Some(mut source) = body.parked.take() {
                if let Some(position) = position {
                    source.set_center(position.0);
                }
                registry.register_boxed(id, source);
            }
        } else if !active && body.is_registered() {
            body.parked = registry.unregister(id);
        }
    }
}

/// Unregisters sources whose [`GravityBody`] was removed or whose entity
/// was despawned.
pub fn unregister_removed_bodies_system(
    mut registry: ResMut<GravityRegistry>,
    mut removed: RemovedComponents<GravityBody>,
) {
    for entity in removed.read() {
        registry.unregister(SourceId::from(entity));
    }
}

/// Copies moved positions into the registry for registered bodies.
pub fn sync_gravity_centers_system(
    mut registry: ResMut<GravityRegistry>,
    bodies: Query<(Entity, &Position, &GravityBody), Changed<Position>>,
) {
    for (entity, position, body) in bodies.iter() {
        if body.is_registered() {
            registry.set_center(SourceId::from(entity), position.0);
        }
    }
}
