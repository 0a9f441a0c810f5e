//! Simulation schedule labels and the frame / fixed-step runner.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs, ScheduleLabel};

use crate::SimTime;
use crate::system_ordering::{configure_fixed_step_ordering, configure_frame_ordering};

/// Default physics rate in Hz.
pub const DEFAULT_FIXED_HZ: u32 = 50;

/// Maximum number of fixed steps per frame to prevent spiral-of-death.
pub const MAX_FIXED_STEPS_PER_FRAME: u32 = 10;

/// Labels for the two simulation loops.
#[derive(ScheduleLabel, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSchedule {
    /// Deterministic physics at the fixed rate (gravity, forces, integration).
    FixedStep,
    /// Variable-rate per-frame work (input sampling, orientation targets).
    Frame,
}

/// The fixed-step and frame schedules plus the time accumulator that
/// drives them.
///
/// Each call to [`SimSchedules::run`] executes 0..=`max_steps` fixed steps
/// followed by exactly one frame. Both schedules use the single-threaded
/// executor: registry mutation and queries share one logical thread.
pub struct SimSchedules {
    fixed: Schedule,
    frame: Schedule,
    fixed_accumulator: f64,
    fixed_dt: f64,
    max_steps: u32,
}

impl SimSchedules {
    /// Create schedules with the given fixed rate in Hz.
    pub fn new(fixed_hz: u32) -> Self {
        let mut fixed = Schedule::new(SimSchedule::FixedStep);
        fixed.set_executor_kind(ExecutorKind::SingleThreaded);
        configure_fixed_step_ordering(&mut fixed);

        let mut frame = Schedule::new(SimSchedule::Frame);
        frame.set_executor_kind(ExecutorKind::SingleThreaded);
        configure_frame_ordering(&mut frame);

        Self {
            fixed,
            frame,
            fixed_accumulator: 0.0,
            fixed_dt: 1.0 / f64::from(fixed_hz.max(1)),
            max_steps: MAX_FIXED_STEPS_PER_FRAME,
        }
    }

    /// Override the per-frame fixed step cap.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Register a system (or system tuple) into a schedule.
    pub fn add_systems<M>(&mut self, schedule: SimSchedule, systems: impl IntoSystemConfigs<M>) {
        match schedule {
            SimSchedule::FixedStep => self.fixed.add_systems(systems),
            SimSchedule::Frame => self.frame.add_systems(systems),
        };
    }

    /// Run one frame: fixed steps for the accumulated time, then the frame schedule.
    ///
    /// Returns the number of fixed steps executed.
    pub fn run(&mut self, world: &mut World, frame_dt: f64) -> u32 {
        self.fixed_accumulator += frame_dt.max(0.0);

        {
            let mut time = world.get_resource_or_insert_with(SimTime::default);
            time.frame_dt = frame_dt as f32;
            time.fixed_dt = self.fixed_dt as f32;
        }

        let mut steps: u32 = 0;
        while self.fixed_accumulator >= self.fixed_dt && steps < self.max_steps {
            self.fixed.run(world);
            self.fixed_accumulator -= self.fixed_dt;
            steps += 1;

            let mut time = world.resource_mut::<SimTime>();
            time.tick += 1;
            time.elapsed += self.fixed_dt;
        }

        if steps == self.max_steps && self.fixed_accumulator >= self.fixed_dt {
            tracing::warn!(
                backlog_s = self.fixed_accumulator,
                "fixed step cap reached, dropping backlog"
            );
            self.fixed_accumulator %= self.fixed_dt;
        }

        self.frame.run(world);
        world.resource_mut::<SimTime>().frame += 1;

        steps
    }

    /// Returns the current fixed-step accumulator value in seconds.
    pub fn fixed_accumulator(&self) -> f64 {
        self.fixed_accumulator
    }

    /// Returns the fixed timestep in seconds.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Force-initialize both schedules, validating the dependency graphs.
    pub fn initialize(&mut self, world: &mut World) {
        if let Err(err) = self.fixed.initialize(world) {
            tracing::error!("fixed-step schedule failed to initialize: {err}");
        }
        if let Err(err) = self.frame.initialize(world) {
            tracing::error!("frame schedule failed to initialize: {err}");
        }
    }
}

impl Default for SimSchedules {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_HZ)
    }
}
