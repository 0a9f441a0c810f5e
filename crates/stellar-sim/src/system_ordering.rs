//! System set definitions and ordering constraints for the two loops.
//!
//! Fixed-step data flow: gravity sources are synced and solved before ships
//! apply forces, and forces are applied before bodies integrate. Frame data
//! flow: input is sampled before it is blended into orientation targets.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::Schedule;

/// Sets for systems in the fixed-step schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixedStepSet {
    /// Register/unregister sources and sync their centers.
    SourceLifecycle,
    /// Query the gravity registry for every solver.
    Gravity,
    /// Apply thrust, rotation, brake and gravity to ship bodies.
    Flight,
    /// Integrate accumulated accelerations into velocity and position.
    Integrate,
}

/// Sets for systems in the frame schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Forward input-layer state into controllers.
    Input,
    /// Accumulate pilot-commanded rotation into orientation targets.
    Orientation,
    /// Read-only reporting for presentation and logs.
    Telemetry,
}

/// Configure ordering constraints for the fixed-step schedule.
pub fn configure_fixed_step_ordering(schedule: &mut Schedule) {
    schedule.configure_sets(
        (
            FixedStepSet::SourceLifecycle,
            FixedStepSet::Gravity,
            FixedStepSet::Flight,
            FixedStepSet::Integrate,
        )
            .chain(),
    );
}

/// Configure ordering constraints for the frame schedule.
pub fn configure_frame_ordering(schedule: &mut Schedule) {
    schedule.configure_sets((FrameSet::Input, FrameSet::Orientation, FrameSet::Telemetry).chain());
}
