//! ECS world setup, simulation clock, and the frame / fixed-step schedule runner.
//!
//! Provides the shared spatial components every simulation crate queries,
//! the [`SimTime`] resource, and [`SimSchedules`], which decouples the
//! variable-rate frame loop from the fixed-rate physics loop.

mod components;
mod schedule;
mod system_ordering;
mod time;
mod world;

pub use components::{Active, Name, Position, Rotation};
pub use schedule::{DEFAULT_FIXED_HZ, MAX_FIXED_STEPS_PER_FRAME, SimSchedule, SimSchedules};
pub use system_ordering::{
    FixedStepSet, FrameSet, configure_fixed_step_ordering, configure_frame_ordering,
};
pub use time::SimTime;
pub use world::{create_world, register_core_resources};
