//! Fleet Survival Library
//!
//! Annual failure rate and cumulative hazard/survival for the orbital
//! fleet. The rate is a scenario base multiplied by radiation, thermal,
//! and maintenance factors, clamped to [0, 0.5]. Survival probability
//! compounds a constant hazard per period: `exp(−cumulative_hazard)`.
//!
//! This model never errors. Every input is clamped into its valid range
//! before use, so callers feed it raw fleet state without pre-validation.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard ceiling on the annual failure rate.
pub const MAX_ANNUAL_FAILURE_RATE: f64 = 0.5;

/// How strongly the shell flux ratio couples into the radiation factor.
/// The remainder is the baseline exposure every shell shares.
const FLUX_COUPLING: f64 = 0.6;

/// Shielding-effectiveness slope: each unit of shielding-mass fraction
/// divides the radiation contribution by this much more.
const SHIELDING_EFFECTIVENESS: f64 = 4.0;

/// Linear/exponential blend of the thermal excess term.
const THERMAL_LINEAR_WEIGHT: f64 = 0.7;
const THERMAL_EXP_WEIGHT: f64 = 0.3;

/// Thermal slopes per °C of core temperature above design.
const THERMAL_LINEAR_SLOPE: f64 = 0.02;
const THERMAL_EXP_SLOPE: f64 = 0.012;

/// Secondary penalty per unit of radiator utilization above 100% of
/// design.
const RADIATOR_OVERDRIVE_PENALTY: f64 = 0.5;

/// Hazard environment severity. Sets the pre-factor base rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardScenario {
    Benign,
    Nominal,
    Harsh,
}

impl HazardScenario {
    pub fn base_rate(&self) -> f64 {
        match self {
            HazardScenario::Benign => 0.01,
            HazardScenario::Nominal => 0.02,
            HazardScenario::Harsh => 0.05,
        }
    }
}

/// Fleet/environment state feeding the annual failure rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurvivalState {
    /// Orbital radiation flux relative to the baseline shell.
    pub flux_ratio: f64,
    /// Shielding mass as a fraction of satellite mass, 0–1.
    pub shielding_mass_fraction: f64,
    /// Core temperature, °C.
    pub core_temp_c: f64,
    /// Design temperature threshold, °C.
    pub design_temp_c: f64,
    /// Radiator utilization relative to design; 1.0 = at design.
    pub radiator_utilization: f64,
    /// Satellites serviceable per year.
    pub repair_capacity: f64,
    /// Currently alive satellites.
    pub alive_count: u64,
}

/// Annual failure rate in [0, 0.5].
pub fn annual_failure_rate(state: &SurvivalState, scenario: HazardScenario) -> f64 {
    let radiation = radiation_factor(state.flux_ratio, state.shielding_mass_fraction);
    let thermal = thermal_factor(
        state.core_temp_c,
        state.design_temp_c,
        state.radiator_utilization,
    );
    let maintenance = maintenance_factor(state.repair_capacity, state.alive_count);

    let rate = scenario.base_rate() * radiation * thermal * maintenance;
    let clamped = rate.clamp(0.0, MAX_ANNUAL_FAILURE_RATE);

    debug!(radiation, thermal, maintenance, rate = clamped, "annual failure rate");
    clamped
}

/// Radiation contribution: the shell flux ratio blended with a baseline
/// coupling, divided by a shielding term that grows with shielding-mass
/// fraction — more shielding, lower failure contribution.
pub fn radiation_factor(flux_ratio: f64, shielding_mass_fraction: f64) -> f64 {
    let flux = flux_ratio.max(0.0);
    let shielding = shielding_mass_fraction.clamp(0.0, 1.0);

    let exposure = (1.0 - FLUX_COUPLING) + FLUX_COUPLING * flux;
    let shielding_term = 1.0 + SHIELDING_EFFECTIVENESS * shielding;
    exposure / shielding_term
}

/// Thermal contribution: 70/30 linear/exponential blend of the excess of
/// core temperature over design, plus a smaller penalty once radiators
/// run past 100% of design.
pub fn thermal_factor(core_temp_c: f64, design_temp_c: f64, radiator_utilization: f64) -> f64 {
    let excess = (core_temp_c - design_temp_c).max(0.0);

    let linear = 1.0 + THERMAL_LINEAR_SLOPE * excess;
    let exponential = (THERMAL_EXP_SLOPE * excess).exp();
    let blended = THERMAL_LINEAR_WEIGHT * linear + THERMAL_EXP_WEIGHT * exponential;

    let overdrive = (radiator_utilization.max(0.0) - 1.0).max(0.0);
    blended + RADIATOR_OVERDRIVE_PENALTY * overdrive
}

/// Maintenance relief: full repair coverage halves the failure rate.
/// With zero alive satellites there is nothing to repair and the factor
/// is 1.
pub fn maintenance_factor(repair_capacity: f64, alive_count: u64) -> f64 {
    if alive_count == 0 {
        return 1.0;
    }
    let coverage = (repair_capacity.max(0.0) / alive_count as f64).min(1.0);
    1.0 - 0.5 * coverage
}

/// Survival probability after accumulating `cumulative_hazard` across
/// periods of constant hazard.
pub fn cumulative_survival(cumulative_hazard: f64) -> f64 {
    (-cumulative_hazard.max(0.0)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nominal_state() -> SurvivalState {
        SurvivalState {
            flux_ratio: 1.0,
            shielding_mass_fraction: 0.1,
            core_temp_c: 45.0,
            design_temp_c: 60.0,
            radiator_utilization: 0.8,
            repair_capacity: 0.0,
            alive_count: 100,
        }
    }

    #[test]
    fn test_rate_within_bounds() {
        let rate = annual_failure_rate(&nominal_state(), HazardScenario::Nominal);
        assert!(rate > 0.0 && rate <= MAX_ANNUAL_FAILURE_RATE);
    }

    #[test]
    fn test_rate_clamped_under_extreme_inputs() {
        let state = SurvivalState {
            flux_ratio: 500.0,
            shielding_mass_fraction: 0.0,
            core_temp_c: 400.0,
            design_temp_c: 60.0,
            radiator_utilization: 5.0,
            repair_capacity: 0.0,
            alive_count: 10,
        };
        assert_eq!(
            annual_failure_rate(&state, HazardScenario::Harsh),
            MAX_ANNUAL_FAILURE_RATE
        );
    }

    #[test]
    fn test_more_shielding_lowers_radiation_factor() {
        let bare = radiation_factor(4.0, 0.0);
        let shielded = radiation_factor(4.0, 0.5);
        let heavily = radiation_factor(4.0, 1.0);
        assert!(bare > shielded && shielded > heavily);
    }

    #[test]
    fn test_radiation_scales_with_flux() {
        assert!(radiation_factor(4.0, 0.2) > radiation_factor(1.0, 0.2));
        // Baseline shell at baseline flux with no shielding is unity.
        assert!((radiation_factor(1.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_thermal_factor_at_design_is_unity() {
        assert!((thermal_factor(60.0, 60.0, 1.0) - 1.0).abs() < 1e-12);
        // Below design is not rewarded.
        assert!((thermal_factor(20.0, 60.0, 0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_thermal_excess_raises_factor() {
        let mild = thermal_factor(70.0, 60.0, 1.0);
        let severe = thermal_factor(100.0, 60.0, 1.0);
        assert!(mild > 1.0);
        assert!(severe > mild);
    }

    #[test]
    fn test_radiator_overdrive_penalty() {
        let at_design = thermal_factor(60.0, 60.0, 1.0);
        let overdriven = thermal_factor(60.0, 60.0, 1.5);
        assert!((overdriven - at_design - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_full_repair_coverage_halves_rate() {
        assert_eq!(maintenance_factor(100.0, 100), 0.5);
        // Coverage beyond the fleet does not over-credit.
        assert_eq!(maintenance_factor(1000.0, 100), 0.5);
    }

    #[test]
    fn test_no_fleet_means_no_adjustment() {
        assert_eq!(maintenance_factor(50.0, 0), 1.0);
    }

    #[test]
    fn test_cumulative_survival_properties() {
        assert_eq!(cumulative_survival(0.0), 1.0);
        let s1 = cumulative_survival(0.1);
        let s2 = cumulative_survival(0.5);
        let s3 = cumulative_survival(2.0);
        assert!(s1 > s2 && s2 > s3);
        assert!(s3 > 0.0);
        // Negative hazard clamps rather than exceeding 1.
        assert_eq!(cumulative_survival(-1.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_rate_always_in_bounds(
            flux in -10.0f64..1000.0,
            shielding in -1.0f64..2.0,
            core in -100.0f64..500.0,
            design in 0.0f64..100.0,
            radiator in -1.0f64..10.0,
            repair in -10.0f64..1e6,
            alive in 0u64..100_000,
        ) {
            let state = SurvivalState {
                flux_ratio: flux,
                shielding_mass_fraction: shielding,
                core_temp_c: core,
                design_temp_c: design,
                radiator_utilization: radiator,
                repair_capacity: repair,
                alive_count: alive,
            };
            for scenario in [HazardScenario::Benign, HazardScenario::Nominal, HazardScenario::Harsh] {
                let rate = annual_failure_rate(&state, scenario);
                prop_assert!((0.0..=MAX_ANNUAL_FAILURE_RATE).contains(&rate));
            }
        }

        #[test]
        fn prop_survival_strictly_decreasing(h in 0.0f64..20.0) {
            let s = cumulative_survival(h);
            prop_assert!(s > 0.0 && s <= 1.0);
            prop_assert!(cumulative_survival(h + 0.1) < s);
        }
    }
}
