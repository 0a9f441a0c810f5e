//! Multi-body gravity: sources, the registry, and per-entity solvers.
//!
//! Sources register with a [`GravityRegistry`] resource when their entity
//! activates. Each fixed step, [`gravity_solver_system`] asks the registry
//! for the accumulated force and the dominant source at every solver's
//! position, and movement controllers read the cached result.
//!
//! Force and orientation are resolved differently: overlapping fields add
//! linearly for force, while "up" always comes from a single dominant source.

mod lifecycle;
mod registry;
mod solver;
mod source;

pub use lifecycle::{
    GravityBody, activate_gravity_body, deactivate_gravity_body, despawn_gravity_body,
    gravity_body_activation_system, spawn_gravity_body, sync_gravity_centers_system,
    unregister_removed_bodies_system,
};
pub use registry::{DOMINANT_EPSILON, GravityContribution, GravityRegistry};
pub use solver::{GravitySolver, SolveMode, ZERO_G_THRESHOLD, gravity_solver_system};
pub use source::{
    GravityError, GravityMode, GravitySource, MIN_SOURCE_DISTANCE, PlanetGravity, SourceId,
    UniformGravity,
};

use bevy_ecs::schedule::IntoSystemConfigs;
use stellar_sim::{FixedStepSet, SimSchedule, SimSchedules};

/// Register the source lifecycle and solver systems in the fixed-step schedule.
///
/// The world must contain a [`GravityRegistry`] resource.
pub fn add_gravity_systems(schedules: &mut SimSchedules) {
    schedules.add_systems(
        SimSchedule::FixedStep,
        (
            unregister_removed_bodies_system,
            gravity_body_activation_system,
            sync_gravity_centers_system,
        )
            .chain()
            .in_set(FixedStepSet::SourceLifecycle),
    );
    schedules.add_systems(
        SimSchedule::FixedStep,
        gravity_solver_system.in_set(FixedStepSet::Gravity),
    );
}
