//! Satellite record and phase propagation
//!
//! A satellite is created at a deployment event from a shell assignment
//! and a sampled position, then mutated each tick by phase-angle
//! propagation and the survival roll. The orbital state is the simplified
//! circular model: period from the normalized radius, phase advancing
//! uniformly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

use crate::{geodetic_to_cartesian, orbital_radius, CartesianPosition, GeodeticPosition, Shell, ShellId, EARTH_RADIUS_KM, MU_EARTH};

/// Sequential satellite identifier. Allocation is owned by the engine
/// instance; this type only carries the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SatelliteId(pub u64);

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SAT-{:05}", self.0)
    }
}

/// Visual/behavioral class tag. Not used by the physics; `Observer`
/// satellites are always placed in the sun-synchronous shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatelliteClass {
    Compute,
    Relay,
    Observer,
}

/// Simplified circular-orbit propagation state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbitalState {
    /// Orbital radius normalized to Earth radius = 1.
    pub radius: f64,
    pub inclination_deg: f64,
    /// Current phase angle along the orbit, radians in [0, 2π).
    pub phase_angle_rad: f64,
    /// Orbital period in seconds.
    pub period_s: f64,
    pub launched: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: SatelliteId,
    pub geodetic: GeodeticPosition,
    pub cartesian: CartesianPosition,
    pub shell: ShellId,
    pub orbit: OrbitalState,
    pub class: SatelliteClass,
}

/// Circular orbital period for a normalized radius: `T = 2π·√(a³/μ)`.
pub fn orbital_period_s(radius: f64) -> f64 {
    let a_km = radius * EARTH_RADIUS_KM;
    TAU * (a_km.powi(3) / MU_EARTH).sqrt()
}

impl Satellite {
    /// Materialize a satellite at a deployment event.
    pub fn deploy(
        id: SatelliteId,
        shell: &Shell,
        class: SatelliteClass,
        position: GeodeticPosition,
        launched: DateTime<Utc>,
    ) -> Satellite {
        let radius = orbital_radius(position.altitude_km);
        // Fixed inclination where the shell pins it; otherwise the
        // minimum inclination that reaches the sampled latitude.
        let inclination_deg = shell.inclination_deg.unwrap_or(position.lat_deg.abs());
        let orbit = OrbitalState {
            radius,
            inclination_deg,
            phase_angle_rad: 0.0,
            period_s: orbital_period_s(radius),
            launched,
        };
        Satellite {
            id,
            cartesian: geodetic_to_cartesian(&position),
            geodetic: position,
            shell: shell.id,
            orbit,
            class,
        }
    }

    /// Advance the phase angle by `dt_s` seconds of orbital motion.
    pub fn advance_phase(&mut self, dt_s: f64) {
        let advanced = self.orbit.phase_angle_rad + TAU * dt_s / self.orbit.period_s;
        self.orbit.phase_angle_rad = advanced.rem_euclid(TAU);
    }
}
