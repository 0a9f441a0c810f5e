//! Gravity source capability and the concrete field shapes.
//!
//! A source is anything that can map a world position to an acceleration
//! vector. [`PlanetGravity`] is the spherical inverse-square field used for
//! celestial bodies; [`UniformGravity`] is a constant-direction field for
//! stations and gravity zones.

use bevy_ecs::entity::Entity;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Distance from a source center below which the field is treated as zero.
pub const MIN_SOURCE_DISTANCE: f32 = 1e-3;

/// Stable identity of a registered source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl From<Entity> for SourceId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Which registry queries a source participates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GravityMode {
    /// Only considered when resolving the dominant source (local up).
    Dominant,
    /// Only contributes to the accumulated force.
    Accumulate,
    /// Contributes to both queries.
    #[default]
    Both,
}

impl GravityMode {
    /// Whether the source is summed by [`crate::GravityRegistry::accumulated_gravity`].
    pub fn accumulates(self) -> bool {
        self != GravityMode::Dominant
    }

    /// Whether the source is a candidate for [`crate::GravityRegistry::dominant_source`].
    pub fn can_dominate(self) -> bool {
        self != GravityMode::Accumulate
    }
}

/// Invalid source parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GravityError {
    /// Surface strength must be finite and non-negative.
    #[error("gravity strength must be finite and >= 0, got {0}")]
    InvalidStrength(f32),

    /// Surface radius must be finite and non-negative.
    #[error("surface radius must be finite and >= 0, got {0}")]
    InvalidRadius(f32),

    /// Range must be finite and non-negative.
    #[error("max range must be finite and >= 0, got {0}")]
    InvalidRange(f32),

    /// Uniform fields need a non-zero direction.
    #[error("uniform gravity direction must be non-zero")]
    ZeroDirection,
}

/// Anything that produces a gravity field.
///
/// Implementations must return exactly [`Vec3::ZERO`] for positions farther
/// than [`GravitySource::max_range`] from [`GravitySource::center`].
pub trait GravitySource: Send + Sync + 'static {
    /// World-space origin of the field.
    fn center(&self) -> Vec3;

    /// Move the field origin. Called each fixed step for moving bodies.
    fn set_center(&mut self, center: Vec3);

    /// Surface acceleration in m/s².
    fn base_strength(&self) -> f32;

    /// Hard cutoff distance in meters.
    fn max_range(&self) -> f32;

    /// Tie-break rank for dominant selection; higher wins.
    fn priority(&self) -> i32;

    /// Which queries this source participates in.
    fn mode(&self) -> GravityMode;

    /// Acceleration this source produces at `position`.
    fn calculate_gravity(&self, position: Vec3) -> Vec3;

    /// Whether `position` lies within the cutoff range.
    fn in_range(&self, position: Vec3) -> bool {
        position.distance_squared(self.center()) <= self.max_range() * self.max_range()
    }
}

fn check_non_negative(value: f32, err: fn(f32) -> GravityError) -> Result<f32, GravityError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(err(value))
    }
}

/// Spherical body with inverse-square falloff.
///
/// Magnitude at distance `d` is `base_strength × surface_radius² / d²`, so
/// the configured strength is felt exactly at the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetGravity {
    /// World-space center of the body.
    pub center: Vec3,
    /// Acceleration at the surface radius, in m/s².
    pub base_strength: f32,
    /// Radius of the body's surface in meters.
    pub surface_radius: f32,
    /// Beyond this distance the source contributes zero gravity.
    pub max_range: f32,
    /// Tie-break rank for dominant selection.
    pub priority: i32,
    /// Query participation.
    pub mode: GravityMode,
}

impl PlanetGravity {
    /// Create a validated planet source with [`GravityMode::Both`] and priority 0.
    pub fn new(
        center: Vec3,
        base_strength: f32,
        surface_radius: f32,
        max_range: f32,
    ) -> Result<Self, GravityError> {
        Ok(Self {
            center,
            base_strength: check_non_negative(base_strength, GravityError::InvalidStrength)?,
            surface_radius: check_non_negative(surface_radius, GravityError::InvalidRadius)?,
            max_range: check_non_negative(max_range, GravityError::InvalidRange)?,
            priority: 0,
            mode: GravityMode::Both,
        })
    }

    /// Set the tie-break priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the query participation mode.
    pub fn with_mode(mut self, mode: GravityMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mass-like scale of the field: `base_strength × surface_radius²`.
    pub fn mass(&self) -> f32 {
        self.base_strength * self.surface_radius * self.surface_radius
    }
}

impl GravitySource for PlanetGravity {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    fn base_strength(&self) -> f32 {
        self.base_strength
    }

    fn max_range(&self) -> f32 {
        self.max_range
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn mode(&self) -> GravityMode {
        self.mode
    }

    fn calculate_gravity(&self, position: Vec3) -> Vec3 {
        let offset = self.center - position;
        let distance = offset.length();

        if distance > self.max_range || distance < MIN_SOURCE_DISTANCE {
            return Vec3::ZERO;
        }

        let magnitude = self.mass() / (distance * distance);
        offset / distance * magnitude
    }
}

/// Constant-direction field inside a sphere of `max_range` around `center`.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformGravity {
    /// Center of the influence sphere.
    pub center: Vec3,
    /// Unit direction gravity pulls toward.
    pub direction: Vec3,
    /// Acceleration in m/s² everywhere inside the sphere.
    pub strength: f32,
    /// Radius of the influence sphere.
    pub max_range: f32,
    /// Tie-break rank for dominant selection.
    pub priority: i32,
    /// Query participation.
    pub mode: GravityMode,
}

impl UniformGravity {
    /// Create a validated uniform field. `direction` is normalized.
    pub fn new(
        center: Vec3,
        direction: Vec3,
        strength: f32,
        max_range: f32,
    ) -> Result<Self, GravityError> {
        let direction = direction.try_normalize().ok_or(GravityError::ZeroDirection)?;
        Ok(Self {
            center,
            direction,
            strength: check_non_negative(strength, GravityError::InvalidStrength)?,
            max_range: check_non_negative(max_range, GravityError::InvalidRange)?,
            priority: 0,
            mode: GravityMode::Both,
        })
    }

    /// Set the tie-break priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the query participation mode.
    pub fn with_mode(mut self, mode: GravityMode) -> Self {
        self.mode = mode;
        self
    }
}

impl GravitySource for UniformGravity {
    fn center(&self) -> Vec3 {
        self.center
    }

    fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    fn base_strength(&self) -> f32 {
        self.strength
    }

    fn max_range(&self) -> f32 {
        self.max_range
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn mode(&self) -> GravityMode {
        self.mode
    }

    fn calculate_gravity(&self, position: Vec3) -> Vec3 {
        if self.in_range(position) {
            self.direction * self.strength
        } else {
            Vec3::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_planet() -> PlanetGravity {
        PlanetGravity::new(Vec3::ZERO, 9.8, 10.0, 1000.0).unwrap()
    }

    #[test]
    fn test_magnitude_follows_inverse_square() {
        let planet = reference_planet();
        let g = planet.calculate_gravity(Vec3::new(20.0, 0.0, 0.0));
        // 9.8 * 100 / 400
        assert!((g.length() - 2.45).abs() < 1e-4, "got {}", g.length());
        assert!((g.normalize() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_surface_strength_at_surface_radius() {
        let planet = reference_planet();
        let g = planet.calculate_gravity(Vec3::new(0.0, 10.0, 0.0));
        assert!((g.length() - 9.8).abs() < 1e-4);
        assert!((g.normalize() - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_zero_beyond_max_range() {
        let planet = reference_planet();
        assert_eq!(planet.calculate_gravity(Vec3::new(0.0, 0.0, 2000.0)), Vec3::ZERO);
        assert_eq!(planet.calculate_gravity(Vec3::new(1000.01, 0.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_nonzero_just_inside_max_range() {
        let planet = reference_planet();
        let p = Vec3::new(0.0, 999.9, 0.0);
        let g = planet.calculate_gravity(p);
        assert!(g.length() > 0.0);
        assert!(g.dot(planet.center - p) > 0.0, "must point toward center");
    }

    #[test]
    fn test_center_is_not_a_singularity() {
        let planet = reference_planet();
        let g = planet.calculate_gravity(Vec3::ZERO);
        assert_eq!(g, Vec3::ZERO);
        assert!(!g.is_nan());
    }

    #[test]
    fn test_mass_derivation() {
        let planet = reference_planet();
        assert!((planet.mass() - 980.0).abs() < 1e-3);
    }

    #[test]
    fn test_set_center_moves_field() {
        let mut planet = reference_planet();
        planet.set_center(Vec3::new(100.0, 0.0, 0.0));
        let g = planet.calculate_gravity(Vec3::new(120.0, 0.0, 0.0));
        assert!((g.length() - 2.45).abs() < 1e-4);
        assert!(g.x < 0.0);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert_eq!(
            PlanetGravity::new(Vec3::ZERO, -1.0, 10.0, 100.0),
            Err(GravityError::InvalidStrength(-1.0))
        );
        assert_eq!(
            PlanetGravity::new(Vec3::ZERO, 1.0, -10.0, 100.0),
            Err(GravityError::InvalidRadius(-10.0))
        );
        assert!(matches!(
            PlanetGravity::new(Vec3::ZERO, 1.0, 10.0, f32::NAN),
            Err(GravityError::InvalidRange(_))
        ));
        assert_eq!(
            UniformGravity::new(Vec3::ZERO, Vec3::ZERO, 9.8, 10.0),
            Err(GravityError::ZeroDirection)
        );
    }

    #[test]
    fn test_uniform_field_is_constant_in_range() {
        let zone = UniformGravity::new(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0), 5.0, 50.0).unwrap();
        let a = zone.calculate_gravity(Vec3::new(1.0, 2.0, 3.0));
        let b = zone.calculate_gravity(Vec3::new(-30.0, 10.0, 0.0));
        assert_eq!(a, b);
        assert!((a - Vec3::new(0.0, -5.0, 0.0)).length() < 1e-6);
        assert_eq!(zone.calculate_gravity(Vec3::new(0.0, 60.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_mode_participation() {
        assert!(GravityMode::Both.accumulates() && GravityMode::Both.can_dominate());
        assert!(!GravityMode::Dominant.accumulates());
        assert!(!GravityMode::Accumulate.can_dominate());
    }

    #[test]
    fn test_source_id_from_entity_is_stable() {
        let e = Entity::from_raw(7);
        assert_eq!(SourceId::from(e), SourceId::from(e));
        assert_ne!(SourceId::from(e), SourceId::from(Entity::from_raw(8)));
    }
}
