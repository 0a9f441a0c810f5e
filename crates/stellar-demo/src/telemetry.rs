//! Periodic flight telemetry written to the log.
//!
//! Computes speed, altitude over the dominant body, heading and flags from
//! the ship state, and optionally the per-source gravity breakdown.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use stellar_flight::{ShipBody, ShipFlightController};
use stellar_gravity::{GravityRegistry, GravitySolver, SourceId};
use stellar_sim::{Name, Position, SimTime};

use crate::contact::Surface;

/// Reporting cadence and detail.
#[derive(Resource, Clone, Debug)]
pub struct TelemetrySettings {
    /// Simulated seconds between reports.
    pub interval: f64,
    /// Also log every contributing gravity source.
    pub log_contributors: bool,
    next_report: f64,
}

impl TelemetrySettings {
    /// Report every `interval` simulated seconds, starting immediately.
    pub fn new(interval: f64, log_contributors: bool) -> Self {
        Self {
            interval: interval.max(0.0),
            log_contributors,
            next_report: 0.0,
        }
    }

    /// Returns `true` once per interval of simulated time.
    fn due(&mut self, elapsed: f64) -> bool {
        if elapsed + 1e-9 < self.next_report {
            return false;
        }
        self.next_report = if self.interval > 0.0 {
            elapsed + self.interval
        } else {
            f64::INFINITY
        };
        true
    }
}

/// Compass heading in degrees (0–360, 0 = world −Z, 90 = +X) of the ship's nose.
pub fn heading_degrees(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    forward.x.atan2(-forward.z).to_degrees().rem_euclid(360.0)
}

/// Height above the surface of the dominant source, when it has one.
fn altitude(
    position: Vec3,
    dominant: Option<SourceId>,
    surfaces: &Query<(&Position, &Surface)>,
) -> Option<f32> {
    let entity = Entity::try_from_bits(dominant?.0).ok()?;
    let (center, surface) = surfaces.get(entity).ok()?;
    Some(position.distance(center.0) - surface.radius)
}

fn source_name(id: SourceId, names: &Query<&Name>) -> String {
    Entity::try_from_bits(id.0)
        .ok()
        .and_then(|e| names.get(e).ok())
        .map_or_else(|| format!("source#{}", id.0), |n| n.0.clone())
}

/// Logs one telemetry line per ship every [`TelemetrySettings::interval`].
pub fn telemetry_system(
    time: Res<SimTime>,
    registry: Res<GravityRegistry>,
    mut settings: ResMut<TelemetrySettings>,
    ships: Query<(
        &Position,
        &ShipBody,
        &ShipFlightController,
        Option<&GravitySolver>,
    )>,
    surfaces: Query<(&Position, &Surface)>,
    names: Query<&Name>,
) {
    if !settings.due(time.elapsed) {
        return;
    }

    for (position, body, ship, solver) in ships.iter() {
        let t = ship.telemetry(body, solver);
        let dominant = solver.and_then(GravitySolver::dominant);
        let dominant_name = dominant.map(|id| source_name(id, &names));

        let height = altitude(position.0, dominant, &surfaces)
            .map_or_else(|| "-".to_string(), |a| format!("{a:.1}"));
        tracing::info!(
            t = %format!("{:.2}", time.elapsed),
            pos = %format!("({:.1}, {:.1}, {:.1})", position.0.x, position.0.y, position.0.z),
            speed = %format!("{:.2}", t.speed),
            gravity = %format!("{:.3}", t.gravity.length()),
            altitude = %height,
            heading = %format!("{:03.0}", heading_degrees(body.rotation)),
            dominant = %dominant_name.as_deref().unwrap_or("none"),
            piloting = t.is_piloting,
            grounded = t.is_grounded,
            braking = t.is_braking,
            boosting = t.is_boosting,
            "ship"
        );

        if settings.log_contributors {
            for c in registry.all_contributors(position.0) {
                tracing::debug!(
                    source = %source_name(c.source, &names),
                    magnitude = c.magnitude,
                    distance = c.distance_to_source,
                    share = %format!("{:.1}%", c.influence_fraction * 100.0),
                    "gravity contributor"
                );
            }
        }
    }
}
