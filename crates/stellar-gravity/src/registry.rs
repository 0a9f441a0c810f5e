//! The set of active gravity sources and the queries answered over it.
//!
//! Two questions are answered separately on purpose:
//! - *How much force acts here?* [`GravityRegistry::accumulated_gravity`]
//!   sums every accumulating source linearly.
//! - *Which way is up here?* [`GravityRegistry::dominant_source`] picks a
//!   single source so the local up vector never blends between bodies.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::source::{GravitySource, SourceId};

/// Magnitude (m/s²) below which a source is ignored for dominant selection
/// and two magnitudes are considered tied.
pub const DOMINANT_EPSILON: f32 = 0.001;

/// One source's share of the field at a query point. Computed per query,
/// never cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityContribution {
    /// Which source produced this contribution.
    pub source: SourceId,
    /// Unit direction of the pull (toward the source for planets).
    pub direction: Vec3,
    /// Acceleration magnitude in m/s².
    pub magnitude: f32,
    /// Distance from the query point to the source center.
    pub distance_to_source: f32,
    /// `magnitude / Σ magnitude` over all contributors.
    pub influence_fraction: f32,
}

/// Central authority answering "what gravity exists at this point".
///
/// Inserted into the ECS world as a resource; there is exactly one per
/// simulation and it is passed to consumers explicitly.
#[derive(Resource)]
pub struct GravityRegistry {
    sources: FxHashMap<SourceId, Box<dyn GravitySource>>,
    epsilon: f32,
}

impl Default for GravityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GravityRegistry {
    /// Create an empty registry with [`DOMINANT_EPSILON`].
    pub fn new() -> Self {
        Self::with_epsilon(DOMINANT_EPSILON)
    }

    /// Create an empty registry with a custom tie / exclusion epsilon.
    pub fn with_epsilon(epsilon: f32) -> Self {
        Self {
            sources: FxHashMap::default(),
            epsilon: epsilon.max(0.0),
        }
    }

    /// The tie / exclusion epsilon in m/s².
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Add a source. Returns `false` and leaves the registry untouched if
    /// `id` is already registered.
    pub fn register(&mut self, id: SourceId, source: impl GravitySource) -> bool {
        self.register_boxed(id, Box::new(source))
    }

    /// Add an already boxed source. Same semantics as [`GravityRegistry::register`].
    pub fn register_boxed(&mut self, id: SourceId, source: Box<dyn GravitySource>) -> bool {
        if self.sources.contains_key(&id) {
            return false;
        }
        tracing::debug!(
            source = id.0,
            strength = source.base_strength(),
            range = source.max_range(),
            mode = ?source.mode(),
            "gravity source registered"
        );
        self.sources.insert(id, source);
        true
    }

    /// Remove a source, returning it if it was registered.
    pub fn unregister(&mut self, id: SourceId) -> Option<Box<dyn GravitySource>> {
        let removed = self.sources.remove(&id);
        if removed.is_some() {
            tracing::debug!(source = id.0, "gravity source unregistered");
        }
        removed
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: SourceId) -> bool {
        self.sources.contains_key(&id)
    }

    /// Borrow a registered source.
    pub fn get(&self, id: SourceId) -> Option<&dyn GravitySource> {
        self.sources.get(&id).map(|s| s.as_ref())
    }

    /// Mutably borrow a registered source.
    pub fn get_mut(&mut self, id: SourceId) -> Option<&mut (dyn GravitySource + 'static)> {
        self.sources.get_mut(&id).map(|s| s.as_mut())
    }

    /// Move a registered source. Returns `false` if `id` is unknown.
    pub fn set_center(&mut self, id: SourceId, center: Vec3) -> bool {
        match self.sources.get_mut(&id) {
            Some(source) => {
                source.set_center(center);
                true
            }
            None => false,
        }
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Iterate over all registered sources in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &dyn GravitySource)> {
        self.sources.iter().map(|(id, s)| (*id, s.as_ref()))
    }

    /// Remove every source.
    pub fn clear(&mut self) {
        self.sources.clear();
    }

    /// Linear sum of every non-dominant-only source at `position`.
    pub fn accumulated_gravity(&self, position: Vec3) -> Vec3 {
        self.sources
            .values()
            .filter(|s| s.mode().accumulates())
            .map(|s| s.calculate_gravity(position))
            .fold(Vec3::ZERO, |acc, g| acc + g)
    }

    /// The source defining local up at `position`, if any.
    ///
    /// Candidates are non-accumulate-only sources whose magnitude is at
    /// least the epsilon. Every candidate within epsilon of the strongest
    /// magnitude ties; among those the higher priority wins, then the lower
    /// [`SourceId`], so the answer never depends on map order.
    pub fn dominant_source(&self, position: Vec3) -> Option<SourceId> {
        self.dominant_with_gravity(position).map(|(id, _)| id)
    }

    /// The dominant source's own vector at `position` (not the sum).
    pub fn gravity_at(&self, position: Vec3) -> Vec3 {
        self.dominant_with_gravity(position)
            .map_or(Vec3::ZERO, |(_, g)| g)
    }

    /// Dominant source id together with its gravity vector at `position`.
    ///
    /// Ties are measured against the strongest candidate, so the result
    /// does not depend on the order sources are visited.
    pub fn dominant_with_gravity(&self, position: Vec3) -> Option<(SourceId, Vec3)> {
        let candidates: Vec<(SourceId, Vec3, f32, i32)> = self
            .sources
            .iter()
            .filter(|(_, source)| source.mode().can_dominate())
            .filter_map(|(id, source)| {
                let gravity = source.calculate_gravity(position);
                let magnitude = gravity.length();
                (magnitude >= self.epsilon).then_some((*id, gravity, magnitude, source.priority()))
            })
            .collect();

        let strongest = candidates
            .iter()
            .map(|&(_, _, magnitude, _)| magnitude)
            .max_by(f32::total_cmp)?;

        candidates
            .into_iter()
            .filter(|&(_, _, magnitude, _)| strongest - magnitude < self.epsilon)
            .max_by(|a, b| a.3.cmp(&b.3).then_with(|| b.0.cmp(&a.0)))
            .map(|(id, gravity, _, _)| (id, gravity))
    }

    /// Every source with a non-zero pull at `position`, strongest first.
    ///
    /// Mode is ignored: this is the diagnostics view of the whole field.
    /// Influence fractions sum to 1 when the list is non-empty.
    pub fn all_contributors(&self, position: Vec3) -> Vec<GravityContribution> {
        let mut contributions: Vec<GravityContribution> = self
            .sources
            .iter()
            .filter_map(|(id, source)| {
                let gravity = source.calculate_gravity(position);
                let magnitude = gravity.length();
                if magnitude <= 0.0 {
                    return None;
                }
                Some(GravityContribution {
                    source: *id,
                    direction: gravity / magnitude,
                    magnitude,
                    distance_to_source: position.distance(source.center()),
                    influence_fraction: 0.0,
                })
            })
            .collect();

        let total: f32 = contributions.iter().map(|c| c.magnitude).sum();
        if total > 0.0 {
            for c in &mut contributions {
                c.influence_fraction = c.magnitude / total;
            }
        }

        contributions.sort_by(|a, b| {
            b.magnitude
                .total_cmp(&a.magnitude)
                .then_with(|| a.source.cmp(&b.source))
        });
        contributions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{GravityMode, PlanetGravity, UniformGravity};

    fn planet(center: Vec3, strength: f32, radius: f32, range: f32) -> PlanetGravity {
        PlanetGravity::new(center, strength, radius, range).unwrap()
    }

    fn id(n: u64) -> SourceId {
        SourceId(n)
    }

    #[test]
    fn test_empty_registry_answers_with_sentinels() {
        let registry = GravityRegistry::new();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(registry.accumulated_gravity(p), Vec3::ZERO);
        assert_eq!(registry.dominant_source(p), None);
        assert_eq!(registry.gravity_at(p), Vec3::ZERO);
        assert!(registry.all_contributors(p).is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = GravityRegistry::new();
        let source = planet(Vec3::ZERO, 9.8, 10.0, 1000.0);
        assert!(registry.register(id(1), source.clone()));
        assert!(!registry.register(id(1), source.clone().with_priority(5)));
        assert_eq!(registry.len(), 1);
        // The original registration is kept.
        assert_eq!(registry.get(id(1)).unwrap().priority(), 0);

        let g = registry.accumulated_gravity(Vec3::new(20.0, 0.0, 0.0));
        assert!((g.length() - 2.45).abs() < 1e-4);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut registry = GravityRegistry::new();
        assert!(registry.unregister(id(9)).is_none());
        registry.register(id(1), planet(Vec3::ZERO, 9.8, 10.0, 1000.0));
        assert!(registry.unregister(id(1)).is_some());
        assert!(registry.unregister(id(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_single_source_scenario() {
        let mut registry = GravityRegistry::new();
        registry.register(id(1), planet(Vec3::ZERO, 9.8, 10.0, 1000.0));

        let near = Vec3::new(0.0, 20.0, 0.0);
        let g = registry.accumulated_gravity(near);
        assert!((g.length() - 2.45).abs() < 1e-4);
        assert!((g.normalize() - Vec3::NEG_Y).length() < 1e-5);
        assert_eq!(registry.dominant_source(near), Some(id(1)));
        assert_eq!(registry.gravity_at(near), g);

        let far = Vec3::new(0.0, 2000.0, 0.0);
        assert_eq!(registry.accumulated_gravity(far), Vec3::ZERO);
        assert_eq!(registry.dominant_source(far), None);
    }

    #[test]
    fn test_superposition_of_symmetric_sources() {
        let mut registry = GravityRegistry::new();
        // Each produces 5 m/s² at the query point: 5 * 10² / 10² at distance 10.
        let a = planet(Vec3::new(-6.0, 8.0, 0.0), 5.0, 10.0, 100.0)
            .with_mode(GravityMode::Accumulate);
        let b = planet(Vec3::new(6.0, 8.0, 0.0), 5.0, 10.0, 100.0)
            .with_mode(GravityMode::Accumulate);
        let p = Vec3::ZERO;
        let expected = a.calculate_gravity(p) + b.calculate_gravity(p);
        registry.register(id(1), a);
        registry.register(id(2), b);

        let g = registry.accumulated_gravity(p);
        assert!((g - expected).length() < 1e-5);
        assert!(g.length() <= 10.0 + 1e-4);
        // Bisects the two: straight up toward y = 8.
        assert!(g.x.abs() < 1e-5);
        assert!(g.y > 0.0);
        assert!((g.length() - 8.0).abs() < 1e-3, "5 * 0.8 * 2, got {}", g.length());
    }

    #[test]
    fn test_dominant_only_sources_excluded_from_sum() {
        let mut registry = GravityRegistry::new();
        registry.register(
            id(1),
            planet(Vec3::ZERO, 9.8, 10.0, 1000.0).with_mode(GravityMode::Dominant),
        );
        let p = Vec3::new(0.0, 20.0, 0.0);
        assert_eq!(registry.accumulated_gravity(p), Vec3::ZERO);
        assert_eq!(registry.dominant_source(p), Some(id(1)));
    }

    #[test]
    fn test_accumulate_only_sources_excluded_from_dominant() {
        let mut registry = GravityRegistry::new();
        registry.register(
            id(1),
            planet(Vec3::ZERO, 9.8, 10.0, 1000.0).with_mode(GravityMode::Accumulate),
        );
        let p = Vec3::new(0.0, 20.0, 0.0);
        assert!(registry.accumulated_gravity(p).length() > 0.0);
        assert_eq!(registry.dominant_source(p), None);
        assert_eq!(registry.gravity_at(p), Vec3::ZERO);
    }

    #[test]
    fn test_dominant_picks_strongest() {
        let mut registry = GravityRegistry::new();
        registry.register(id(1), planet(Vec3::new(-50.0, 0.0, 0.0), 9.8, 10.0, 1000.0));
        registry.register(id(2), planet(Vec3::new(50.0, 0.0, 0.0), 9.8, 10.0, 1000.0));

        assert_eq!(registry.dominant_source(Vec3::new(-30.0, 0.0, 0.0)), Some(id(1)));
        assert_eq!(registry.dominant_source(Vec3::new(30.0, 0.0, 0.0)), Some(id(2)));
    }

    #[test]
    fn test_gravity_at_is_dominant_not_sum() {
        let mut registry = GravityRegistry::new();
        let a = planet(Vec3::new(-50.0, 0.0, 0.0), 9.8, 10.0, 1000.0);
        let b = planet(Vec3::new(50.0, 0.0, 0.0), 9.8, 10.0, 1000.0);
        let p = Vec3::new(-30.0, 5.0, 0.0);
        let expected = a.calculate_gravity(p);
        registry.register(id(1), a);
        registry.register(id(2), b);

        assert_eq!(registry.gravity_at(p), expected);
        assert_ne!(registry.gravity_at(p), registry.accumulated_gravity(p));
    }

    #[test]
    fn test_tie_broken_by_priority_regardless_of_order() {
        let p = Vec3::ZERO;
        let low = planet(Vec3::new(-20.0, 0.0, 0.0), 9.8, 10.0, 1000.0).with_priority(1);
        // Magnitude differs by far less than epsilon.
        let high = planet(Vec3::new(20.0001, 0.0, 0.0), 9.8, 10.0, 1000.0).with_priority(3);
        assert!(
            (low.calculate_gravity(p).length() - high.calculate_gravity(p).length()).abs()
                < DOMINANT_EPSILON
        );

        let mut forward = GravityRegistry::new();
        forward.register(id(1), low.clone());
        forward.register(id(2), high.clone());

        let mut reverse = GravityRegistry::new();
        reverse.register(id(2), high);
        reverse.register(id(1), low);

        assert_eq!(forward.dominant_source(p), Some(id(2)));
        assert_eq!(reverse.dominant_source(p), Some(id(2)));
    }

    #[test]
    fn test_tie_window_anchored_at_strongest() {
        let zone = |strength: f32, priority: i32| {
            UniformGravity::new(Vec3::ZERO, Vec3::NEG_Y, strength, 100.0)
                .unwrap()
                .with_priority(priority)
        };
        // The weakest has top priority but is outside epsilon of the strongest.
        let sources = [(id(1), zone(1.0, 5)), (id(3), zone(1.0008, 0)), (id(2), zone(1.0016, 0))];

        let mut forward = GravityRegistry::new();
        for (source_id, source) in sources.iter().cloned() {
            forward.register(source_id, source);
        }
        let mut reverse = GravityRegistry::new();
        for (source_id, source) in sources.iter().rev().cloned() {
            reverse.register(source_id, source);
        }

        assert_eq!(forward.dominant_source(Vec3::ZERO), Some(id(2)));
        assert_eq!(reverse.dominant_source(Vec3::ZERO), Some(id(2)));
    }

    #[test]
    fn test_full_tie_resolved_by_lowest_id() {
        let mut equal = GravityRegistry::new();
        for n in [5, 3, 9] {
            equal.register(id(n), planet(Vec3::ZERO, 9.8, 10.0, 1000.0));
        }
        assert_eq!(equal.dominant_source(Vec3::new(0.0, 30.0, 0.0)), Some(id(3)));
    }

    #[test]
    fn test_below_epsilon_sources_excluded() {
        let mut registry = GravityRegistry::new();
        // At distance 900 this produces 9.8 * 1 / 810000 ≈ 1.2e-5 m/s².
        registry.register(id(1), planet(Vec3::ZERO, 9.8, 1.0, 1000.0));
        let p = Vec3::new(900.0, 0.0, 0.0);
        assert!(registry.accumulated_gravity(p).length() > 0.0);
        assert_eq!(registry.dominant_source(p), None);
    }

    #[test]
    fn test_contributors_sorted_and_normalized() {
        let mut registry = GravityRegistry::new();
        registry.register(id(1), planet(Vec3::new(-50.0, 0.0, 0.0), 9.8, 10.0, 1000.0));
        registry.register(id(2), planet(Vec3::new(50.0, 0.0, 0.0), 4.0, 10.0, 1000.0));
        registry.register(
            id(3),
            UniformGravity::new(Vec3::ZERO, Vec3::NEG_Y, 1.0, 500.0)
                .unwrap()
                .with_mode(GravityMode::Dominant),
        );
        registry.register(id(4), planet(Vec3::new(5000.0, 0.0, 0.0), 9.8, 10.0, 100.0));

        let list = registry.all_contributors(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(list.len(), 3, "out-of-range source must be skipped");
        for pair in list.windows(2) {
            assert!(pair[0].magnitude >= pair[1].magnitude);
        }
        let sum: f32 = list.iter().map(|c| c.influence_fraction).sum();
        assert!((sum - 1.0).abs() < 1e-5, "fractions sum to {sum}");

        let first = list[0];
        assert!((first.direction.length() - 1.0).abs() < 1e-5);
        assert!(first.distance_to_source > 0.0);
    }

    #[test]
    fn test_contributors_empty_when_nothing_in_range() {
        let mut registry = GravityRegistry::new();
        registry.register(id(1), planet(Vec3::ZERO, 9.8, 10.0, 100.0));
        assert!(registry.all_contributors(Vec3::new(0.0, 500.0, 0.0)).is_empty());
    }

    #[test]
    fn test_set_center_moves_registered_source() {
        let mut registry = GravityRegistry::new();
        registry.register(id(1), planet(Vec3::ZERO, 9.8, 10.0, 1000.0));
        assert!(registry.set_center(id(1), Vec3::new(0.0, 100.0, 0.0)));
        assert!(!registry.set_center(id(2), Vec3::ZERO));

        let g = registry.accumulated_gravity(Vec3::new(0.0, 80.0, 0.0));
        assert!(g.y > 0.0, "field should now pull upward toward y=100");
    }
}
