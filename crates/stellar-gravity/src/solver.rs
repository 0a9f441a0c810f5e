//! Per-entity gravity adapter between the registry and movement controllers.
//!
//! A [`GravitySolver`] is refreshed once per fixed step from its entity's
//! [`Position`]. Movement code reads [`GravitySolver::current_gravity`] to
//! apply force and [`GravitySolver::local_up`] to orient itself.

use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use stellar_sim::{Position, SimTime};

use crate::registry::GravityRegistry;
use crate::source::SourceId;

/// Gravity magnitude (m/s²) below which an entity is considered in zero-gravity.
pub const ZERO_G_THRESHOLD: f32 = 0.01;

/// What [`GravitySolver::current_gravity`] holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMode {
    /// Linear sum of every accumulating source.
    #[default]
    Accumulated,
    /// Only the dominant source's own vector.
    DominantOnly,
}

/// Cached gravity state for one entity.
#[derive(Component, Clone, Debug)]
pub struct GravitySolver {
    /// When false the solver yields zero gravity and the default up.
    pub gravity_enabled: bool,
    /// Whether force comes from the sum or from the dominant source alone.
    pub mode: SolveMode,
    /// Up vector used when no dominant source is found.
    pub default_up: Vec3,
    /// How fast [`GravitySolver::smoothed_up`] tracks the local up, per second.
    /// `0.0` disables smoothing (it snaps every step).
    pub up_alignment_rate: f32,
    current_gravity: Vec3,
    local_up: Vec3,
    smoothed_up: Vec3,
    dominant: Option<SourceId>,
}

impl Default for GravitySolver {
    fn default() -> Self {
        Self::new(SolveMode::Accumulated)
    }
}

impl GravitySolver {
    /// Create an enabled solver with world +Y as the default up.
    pub fn new(mode: SolveMode) -> Self {
        Self {
            gravity_enabled: true,
            mode,
            default_up: Vec3::Y,
            up_alignment_rate: 0.0,
            current_gravity: Vec3::ZERO,
            local_up: Vec3::Y,
            smoothed_up: Vec3::Y,
            dominant: None,
        }
    }

    /// Enable up-vector smoothing at `rate` per second.
    pub fn with_up_alignment_rate(mut self, rate: f32) -> Self {
        self.up_alignment_rate = rate.max(0.0);
        self
    }

    /// Last computed gravity vector (m/s²).
    pub fn current_gravity(&self) -> Vec3 {
        self.current_gravity
    }

    /// Unit vector opposite the dominant source's pull.
    pub fn local_up(&self) -> Vec3 {
        self.local_up
    }

    /// [`GravitySolver::local_up`] low-pass filtered for camera use.
    pub fn smoothed_up(&self) -> Vec3 {
        self.smoothed_up
    }

    /// The dominant source found on the last update.
    pub fn dominant(&self) -> Option<SourceId> {
        self.dominant
    }

    /// Returns `true` if the current gravity is below [`ZERO_G_THRESHOLD`].
    pub fn is_zero_gravity(&self) -> bool {
        self.current_gravity.length() < ZERO_G_THRESHOLD
    }

    /// Toggle gravity. Disabling clears the cached state immediately.
    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.gravity_enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Refresh the cached state from `registry` at `position`.
    ///
    /// `dt` only drives up-vector smoothing.
    pub fn update(&mut self, registry: &GravityRegistry, position: Vec3, dt: f32) {
        if !self.gravity_enabled {
            self.reset();
            return;
        }

        let dominant = registry.dominant_with_gravity(position);

        self.current_gravity = match self.mode {
            SolveMode::Accumulated => registry.accumulated_gravity(position),
            SolveMode::DominantOnly => dominant.map_or(Vec3::ZERO, |(_, g)| g),
        };
        self.local_up = dominant
            .and_then(|(_, g)| (-g).try_normalize())
            .unwrap_or(self.default_up);
        self.dominant = dominant.map(|(id, _)| id);

        self.align_smoothed_up(dt);
    }

    fn reset(&mut self) {
        self.current_gravity = Vec3::ZERO;
        self.local_up = self.default_up;
        self.smoothed_up = self.default_up;
        self.dominant = None;
    }

    fn align_smoothed_up(&mut self, dt: f32) {
        if self.up_alignment_rate <= 0.0 {
            self.smoothed_up = self.local_up;
            return;
        }

        let t = (self.up_alignment_rate * dt).clamp(0.0, 1.0);
        let new_up = self.smoothed_up.lerp(self.local_up, t).normalize_or_zero();

        // Lerping between opposite vectors passes through zero; hold the last value.
        if new_up.length_squared() > 0.5 {
            self.smoothed_up = new_up;
        }
    }
}

/// Refreshes every solver from its entity's position.
///
/// Runs in the gravity set of the fixed-step schedule so flight and
/// character systems see this step's gravity.
pub fn gravity_solver_system(
    registry: Res<GravityRegistry>,
    time: Res<SimTime>,
    mut solvers: Query<(&Position, &mut GravitySolver)>,
) {
    for (position, mut solver) in solvers.iter_mut() {
        solver.update(&registry, position.0, time.fixed_dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{GravityMode, PlanetGravity};

    fn two_planet_registry() -> GravityRegistry {
        let mut registry = GravityRegistry::new();
        registry.register(
            SourceId(1),
            PlanetGravity::new(Vec3::new(-50.0, 0.0, 0.0), 9.8, 10.0, 1000.0).unwrap(),
        );
        registry.register(
            SourceId(2),
            PlanetGravity::new(Vec3::new(50.0, 0.0, 0.0), 9.8, 10.0, 1000.0).unwrap(),
        );
        registry
    }

    #[test]
    fn test_accumulated_mode_reports_sum() {
        let registry = two_planet_registry();
        let mut solver = GravitySolver::new(SolveMode::Accumulated);
        let p = Vec3::new(-20.0, 10.0, 0.0);
        solver.update(&registry, p, 0.02);

        assert!((solver.current_gravity() - registry.accumulated_gravity(p)).length() < 1e-6);
        assert_eq!(solver.dominant(), Some(SourceId(1)));
    }

    #[test]
    fn test_dominant_mode_reports_single_source() {
        let registry = two_planet_registry();
        let mut solver = GravitySolver::new(SolveMode::DominantOnly);
        let p = Vec3::new(-20.0, 10.0, 0.0);
        solver.update(&registry, p, 0.02);

        assert_eq!(solver.current_gravity(), registry.gravity_at(p));
    }

    #[test]
    fn test_local_up_points_away_from_dominant() {
        let registry = two_planet_registry();
        let mut solver = GravitySolver::default();
        solver.update(&registry, Vec3::new(-50.0, 30.0, 0.0), 0.02);

        assert!((solver.local_up() - Vec3::Y).length() < 1e-5);
        assert!((solver.local_up().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_local_up_defaults_without_dominant() {
        let mut registry = GravityRegistry::new();
        registry.register(
            SourceId(1),
            PlanetGravity::new(Vec3::ZERO, 9.8, 10.0, 1000.0)
                .unwrap()
                .with_mode(GravityMode::Accumulate),
        );
        let mut solver = GravitySolver::default();
        solver.default_up = Vec3::Z;
        solver.update(&registry, Vec3::new(0.0, 20.0, 0.0), 0.02);

        assert_eq!(solver.local_up(), Vec3::Z);
        assert!(solver.current_gravity().length() > 0.0);
        assert_eq!(solver.dominant(), None);
    }

    #[test]
    fn test_disabled_solver_yields_zero() {
        let registry = two_planet_registry();
        let mut solver = GravitySolver::default();
        solver.update(&registry, Vec3::new(-20.0, 0.0, 0.0), 0.02);
        assert!(solver.current_gravity().length() > 0.0);

        solver.set_gravity_enabled(false);
        assert_eq!(solver.current_gravity(), Vec3::ZERO);
        solver.update(&registry, Vec3::new(-20.0, 0.0, 0.0), 0.02);
        assert_eq!(solver.current_gravity(), Vec3::ZERO);
        assert_eq!(solver.local_up(), Vec3::Y);
        assert!(solver.is_zero_gravity());
    }

    #[test]
    fn test_smoothed_up_moves_gradually() {
        let registry = two_planet_registry();
        let mut solver = GravitySolver::default().with_up_alignment_rate(2.0);
        // Beside planet 1 on +X side: local up is +X.
        solver.update(&registry, Vec3::new(-30.0, 0.0, 0.0), 0.1);

        let up = solver.smoothed_up();
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(up.x > 0.0 && up.y > 0.0, "should be between +Y and +X, got {up:?}");

        for _ in 0..100 {
            solver.update(&registry, Vec3::new(-30.0, 0.0, 0.0), 0.1);
        }
        assert!((solver.smoothed_up() - Vec3::X).length() < 1e-3);
    }

    #[test]
    fn test_solver_system_updates_entities() {
        let mut world = stellar_sim::create_world();
        world.insert_resource(two_planet_registry());
        let entity = world
            .spawn((Position::new(-50.0, 30.0, 0.0), GravitySolver::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(gravity_solver_system);
        schedule.run(&mut world);

        let solver = world.get::<GravitySolver>(entity).unwrap();
        assert!(solver.current_gravity().y < 0.0);
        assert_eq!(solver.dominant(), Some(SourceId(1)));
    }
}
