//! Sphere-versus-planet surface contact.
//!
//! Stands in for a physics engine's collision callbacks: ships that reach a
//! planet surface are clamped to it, lose their inward velocity, and the
//! controller is told a contact began. Leaving the surface ends the contact.

use bevy_ecs::prelude::*;
use stellar_flight::{ShipBody, ShipFlightController};
use stellar_sim::{Name, Position};

/// Extra height above the surface before a resting ship counts as lifted off.
const LIFTOFF_MARGIN: f32 = 0.05;

/// Solid sphere a ship can land on.
#[derive(Component, Clone, Copy, Debug)]
pub struct Surface {
    /// Radius in meters.
    pub radius: f32,
}

/// Collision sphere around a ship, with the surfaces it currently touches.
#[derive(Component, Clone, Debug, Default)]
pub struct Hull {
    /// Radius in meters.
    pub radius: f32,
    touching: Vec<Entity>,
}

impl Hull {
    /// A hull of `radius` meters touching nothing.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            touching: Vec::new(),
        }
    }

    /// Whether the hull rests on `surface`.
    pub fn is_touching(&self, surface: Entity) -> bool {
        self.touching.contains(&surface)
    }
}

/// Resolves ship-surface penetration and raises enter/exit notifications.
pub fn surface_contact_system(
    surfaces: Query<(Entity, &Position, &Surface, Option<&Name>), Without<Hull>>,
    mut ships: Query<(
        &mut Hull,
        &mut Position,
        &mut ShipBody,
        &mut ShipFlightController,
    )>,
) {
    for (mut hull, mut position, mut body, mut ship) in ships.iter_mut() {
        for (surface_entity, center, surface, name) in surfaces.iter() {
            let offset = position.0 - center.0;
            let distance = offset.length();
            let contact_distance = surface.radius + hull.radius;
            let Some(normal) = offset.try_normalize() else {
                continue;
            };

            if distance <= contact_distance {
                position.0 = center.0 + normal * contact_distance;
                let inward = body.linear_velocity.dot(normal);
                if inward < 0.0 {
                    body.linear_velocity -= normal * inward;
                }

                if !hull.is_touching(surface_entity) {
                    hull.touching.push(surface_entity);
                    ship.on_collision_enter();
                    tracing::info!(
                        surface = name.map_or("unnamed", |n| n.0.as_str()),
                        impact_speed = -inward,
                        "touchdown"
                    );
                }
            } else if distance > contact_distance + LIFTOFF_MARGIN
                && hull.is_touching(surface_entity)
            {
                hull.touching.retain(|&e| e != surface_entity);
                ship.on_collision_exit();
                tracing::info!(
                    surface = name.map_or("unnamed", |n| n.0.as_str()),
                    "liftoff"
                );
            }
        }
    }
}
