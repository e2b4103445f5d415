//! Orbital Shells Library
//!
//! Shell catalog, coordinate transforms, congestion-scored shell
//! assignment, rejection-sampled satellite positioning, and the fleet
//! production law for the compute constellation.
//!
//! # Shell Catalog
//!
//! | Shell | Altitude (km)   | Lat band | Min sep | Capacity |
//! |-------|-----------------|----------|---------|----------|
//! | LEO   | 500 – 1,200     | ±60°     | 2.0°    | 4,000    |
//! | SSO   | 600 – 800       | i = 97.8°| 2.5°    | 800      |
//! | MEO   | 8,000 – 12,000  | ±55°     | 5.0°    | 600      |
//! | GEO   | 35,786 (fixed)  | ±3°      | 2.0°    | 180      |
//!
//! The MEO band sits in the Van Allen slot region (between the inner
//! proton belt and the outer electron belt); GEO rides outside the outer
//! belt, which is why both carry elevated radiation flux ratios relative
//! to the LEO baseline.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

pub mod assignment;
pub mod positioning;
pub mod production;
pub mod satellite;

pub use assignment::assign_shell;
pub use positioning::{generate_position, PositioningConfig};
pub use production::{next_fleet_count, project_fleet, GrowthStrategy};
pub use satellite::{OrbitalState, Satellite, SatelliteClass, SatelliteId};

/// Earth equatorial radius in km.
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Earth gravitational parameter, km³/s².
pub const MU_EARTH: f64 = 398600.4418;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Shell {0:?} is at capacity ({1} satellites)")]
    AtCapacity(ShellId, u32),
    #[error("All shells are at capacity")]
    AllShellsAtCapacity,
}

pub type Result<T> = std::result::Result<T, ShellError>;

/// Orbital shell identifiers, in fixed assignment-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShellId {
    Leo,
    SunSync,
    Meo,
    Geo,
}

impl ShellId {
    /// All shells in priority order; ties in assignment scoring break
    /// toward the earlier entry.
    pub const ALL: [ShellId; 4] = [ShellId::Leo, ShellId::SunSync, ShellId::Meo, ShellId::Geo];

    pub fn name(&self) -> &'static str {
        match self {
            ShellId::Leo => "LEO",
            ShellId::SunSync => "SSO",
            ShellId::Meo => "MEO",
            ShellId::Geo => "GEO",
        }
    }

    /// Radiation flux relative to the LEO baseline, used by the survival
    /// model. MEO and GEO ride the Van Allen belt edges.
    pub fn flux_ratio(&self) -> f64 {
        match self {
            ShellId::Leo => 1.0,
            ShellId::SunSync => 1.4,
            ShellId::Meo => 4.0,
            ShellId::Geo => 2.5,
        }
    }
}

/// An orbital shell: a named altitude/inclination band with spacing and
/// capacity constraints for satellite placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub id: ShellId,
    /// Latitude-band half-width in degrees.
    pub lat_band_deg: f64,
    /// Altitude range in km; min == max for geostationary.
    pub altitude_min_km: f64,
    pub altitude_max_km: f64,
    /// Minimum great-circle separation between same-shell satellites.
    pub min_separation_deg: f64,
    /// Maximum satellites this shell accepts.
    pub capacity: u32,
    /// Fixed inclination for the sun-synchronous shell.
    pub inclination_deg: Option<f64>,
}

impl Shell {
    /// Canonical shell configuration.
    pub fn of(id: ShellId) -> Shell {
        match id {
            ShellId::Leo => Shell {
                id,
                lat_band_deg: 60.0,
                altitude_min_km: 500.0,
                altitude_max_km: 1200.0,
                min_separation_deg: 2.0,
                capacity: 4000,
                inclination_deg: None,
            },
            ShellId::SunSync => Shell {
                id,
                // Covers the reachable latitudes of a 97.8° inclined
                // orbit, asin(sin 97.8°) ≈ 82.2°.
                lat_band_deg: 82.5,
                altitude_min_km: 600.0,
                altitude_max_km: 800.0,
                min_separation_deg: 2.5,
                capacity: 800,
                inclination_deg: Some(97.8),
            },
            ShellId::Meo => Shell {
                id,
                lat_band_deg: 55.0,
                altitude_min_km: 8000.0,
                altitude_max_km: 12000.0,
                min_separation_deg: 5.0,
                capacity: 600,
                inclination_deg: None,
            },
            ShellId::Geo => Shell {
                id,
                lat_band_deg: 3.0,
                altitude_min_km: 35786.0,
                altitude_max_km: 35786.0,
                min_separation_deg: 2.0,
                capacity: 180,
                inclination_deg: None,
            },
        }
    }

    /// Full catalog in priority order.
    pub fn catalog() -> Vec<Shell> {
        ShellId::ALL.iter().map(|id| Shell::of(*id)).collect()
    }

    /// Midpoint of the altitude range.
    pub fn mean_altitude_km(&self) -> f64 {
        (self.altitude_min_km + self.altitude_max_km) / 2.0
    }
}

/// Geodetic position on a spherical Earth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub altitude_km: f64,
}

/// Cartesian position normalized to Earth radius = 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartesianPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Normalized orbital radius for an altitude: `1 + alt / R_E`.
pub fn orbital_radius(altitude_km: f64) -> f64 {
    1.0 + altitude_km / EARTH_RADIUS_KM
}

/// The single spherical-to-Cartesian transform used everywhere a
/// satellite position is materialized.
pub fn geodetic_to_cartesian(pos: &GeodeticPosition) -> CartesianPosition {
    let r = orbital_radius(pos.altitude_km);
    let lat = pos.lat_deg.to_radians();
    let lon = pos.lon_deg.to_radians();
    CartesianPosition {
        x: r * lat.cos() * lon.cos(),
        y: r * lat.cos() * lon.sin(),
        z: r * lat.sin(),
    }
}

/// Great-circle angular distance between two positions, in degrees.
/// Altitude is ignored; separation is measured on the shell sphere.
pub fn angular_separation_deg(a: &GeodeticPosition, b: &GeodeticPosition) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let dlat = (b.lat_deg - a.lat_deg).to_radians();
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let central = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    central * 180.0 / PI
}
