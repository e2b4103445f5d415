//! Aggregate economics derivation
//!
//! Folds the mobilization state and the fleet into the per-year
//! [`SimulationState`] snapshot the validator checks and consumers read.
//! Deliberately coarse: flat per-GW cost and carbon constants, and a
//! compute-weighted latency blend over altitude-derived propagation
//! delays.

use std::collections::HashMap;

use mobilization::YearState;
use orbital_shells::{Satellite, SatelliteClass, Shell, ShellId};
use state_validation::SimulationState;

pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Mean request latency against ground data centers (ms).
pub const GROUND_LATENCY_MS: f64 = 15.0;

/// Annualized cost per GW, $B.
pub const GROUND_COST_B_PER_GW: f64 = 0.9;
pub const ORBITAL_COST_B_PER_GW: f64 = 3.5;

/// Grid carbon intensity, Mt CO₂ per GW-year of facility load.
pub const GRID_CARBON_MT_PER_GW_YR: f64 = 3.5;

/// Compute capacity contributed by one satellite, GW.
pub fn satellite_compute_gw(class: SatelliteClass) -> f64 {
    match class {
        SatelliteClass::Compute => 0.012,
        SatelliteClass::Relay => 0.004,
        SatelliteClass::Observer => 0.002,
    }
}

/// Round-trip propagation latency to a shell's mean altitude (ms).
pub fn shell_latency_ms(shell: &Shell) -> f64 {
    2.0 * shell.mean_altitude_km() / SPEED_OF_LIGHT_KM_S * 1000.0
}

/// Build the aggregate snapshot for one simulated year.
pub fn derive_state(
    year_state: &YearState,
    fleet: &[Satellite],
    occupancy: &HashMap<ShellId, u32>,
) -> SimulationState {
    let mut orbital_by_shell: HashMap<ShellId, f64> = HashMap::new();
    for sat in fleet {
        *orbital_by_shell.entry(sat.shell).or_insert(0.0) += satellite_compute_gw(sat.class);
    }

    // Sum in fixed shell order: map iteration order would make the
    // float total run-dependent.
    let orbital_compute_gw: f64 = ShellId::ALL
        .iter()
        .map(|id| orbital_by_shell.get(id).copied().unwrap_or(0.0))
        .sum();
    let ground_compute_gw = year_state.capacity_gw.max(0.0);
    let total_compute_gw = orbital_compute_gw + ground_compute_gw;

    let orbital_cost_b = orbital_compute_gw * ORBITAL_COST_B_PER_GW;
    let ground_cost_b = ground_compute_gw * GROUND_COST_B_PER_GW;

    let avg_latency_ms = if total_compute_gw > 0.0 {
        let orbital_weighted: f64 = ShellId::ALL
            .iter()
            .map(|id| {
                let gw = orbital_by_shell.get(id).copied().unwrap_or(0.0);
                gw * shell_latency_ms(&Shell::of(*id))
            })
            .sum();
        (ground_compute_gw * GROUND_LATENCY_MS + orbital_weighted) / total_compute_gw
    } else {
        GROUND_LATENCY_MS
    };

    let orbital_share = if total_compute_gw > 0.0 {
        orbital_compute_gw / total_compute_gw
    } else {
        0.0
    };

    let mut shell_capacity = HashMap::new();
    let mut shell_utilization = HashMap::new();
    for id in ShellId::ALL {
        let shell = Shell::of(id);
        shell_capacity.insert(id.name().to_string(), shell.capacity as f64);
        shell_utilization.insert(
            id.name().to_string(),
            occupancy.get(&id).copied().unwrap_or(0) as f64,
        );
    }

    SimulationState {
        year: year_state.year,
        total_compute_gw,
        orbital_compute_gw,
        ground_compute_gw,
        total_cost_b: orbital_cost_b + ground_cost_b,
        orbital_cost_b,
        ground_cost_b,
        avg_latency_ms,
        carbon_mt: ground_compute_gw * GRID_CARBON_MT_PER_GW_YR,
        orbital_share,
        shell_capacity,
        shell_utilization,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mobilization::{step_year, ScenarioParams, DEFAULT_PUE};
    use orbital_shells::{GeodeticPosition, SatelliteId};

    fn sample_fleet() -> Vec<Satellite> {
        let epoch = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        vec![
            Satellite::deploy(
                SatelliteId(1),
                &Shell::of(ShellId::Leo),
                SatelliteClass::Compute,
                GeodeticPosition { lat_deg: 10.0, lon_deg: 20.0, altitude_km: 550.0 },
                epoch,
            ),
            Satellite::deploy(
                SatelliteId(2),
                &Shell::of(ShellId::Geo),
                SatelliteClass::Relay,
                GeodeticPosition { lat_deg: 0.0, lon_deg: -60.0, altitude_km: 35786.0 },
                epoch,
            ),
        ]
    }

    #[test]
    fn test_compute_conservation_by_construction() {
        let params = ScenarioParams::reference();
        let year_state = step_year(None, &params, 2030, DEFAULT_PUE, 0.0);
        let fleet = sample_fleet();
        let mut occupancy = HashMap::new();
        occupancy.insert(ShellId::Leo, 1);
        occupancy.insert(ShellId::Geo, 1);

        let state = derive_state(&year_state, &fleet, &occupancy);
        let delta =
            (state.orbital_compute_gw + state.ground_compute_gw - state.total_compute_gw).abs();
        assert!(delta < 1e-9);
        assert!((state.orbital_compute_gw - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_latency_between_ground_and_geo() {
        let params = ScenarioParams::reference();
        let year_state = step_year(None, &params, 2030, DEFAULT_PUE, 0.0);
        let state = derive_state(&year_state, &sample_fleet(), &HashMap::new());
        let geo_latency = shell_latency_ms(&Shell::of(ShellId::Geo));
        assert!(state.avg_latency_ms >= state_validation::LATENCY_FLOOR_MS);
        assert!(state.avg_latency_ms <= geo_latency);
    }

    #[test]
    fn test_empty_fleet_is_all_ground() {
        let params = ScenarioParams::reference();
        let year_state = step_year(None, &params, 2030, DEFAULT_PUE, 0.0);
        let state = derive_state(&year_state, &[], &HashMap::new());
        assert_eq!(state.orbital_compute_gw, 0.0);
        assert_eq!(state.orbital_share, 0.0);
        assert_eq!(state.avg_latency_ms, GROUND_LATENCY_MS);
    }

    #[test]
    fn test_shell_maps_cover_catalog() {
        let params = ScenarioParams::reference();
        let year_state = step_year(None, &params, 2030, DEFAULT_PUE, 0.0);
        let state = derive_state(&year_state, &[], &HashMap::new());
        for id in ShellId::ALL {
            assert!(state.shell_capacity.contains_key(id.name()));
            assert!(state.shell_utilization.contains_key(id.name()));
        }
    }
}
