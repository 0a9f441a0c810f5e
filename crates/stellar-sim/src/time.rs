//! Simulation clock resource.

use bevy_ecs::prelude::*;

/// Timing information for the current frame and fixed step.
///
/// Frame systems read [`SimTime::frame_dt`]; fixed-step systems read
/// [`SimTime::fixed_dt`]. Both are written by [`crate::SimSchedules`]
/// before any system runs.
#[derive(Resource, Debug, Clone)]
pub struct SimTime {
    /// Wall-clock seconds elapsed since the previous frame.
    pub frame_dt: f32,
    /// Duration of one fixed physics step in seconds.
    pub fixed_dt: f32,
    /// Simulated seconds advanced by fixed steps so far.
    pub elapsed: f64,
    /// Number of fixed steps executed.
    pub tick: u64,
    /// Number of frames executed.
    pub frame: u64,
}

impl Default for SimTime {
    fn default() -> Self {
        Self {
            frame_dt: 0.0,
            fixed_dt: 1.0 / crate::DEFAULT_FIXED_HZ as f32,
            elapsed: 0.0,
            tick: 0,
            frame: 0,
        }
    }
}
