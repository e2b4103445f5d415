//! Run reports
//!
//! Batch-run helper and the JSON report the `run-scenario` binary
//! writes: full trajectory, validated per-year states, and a final fleet
//! summary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use mobilization::{ScenarioParams, YearState};
use state_validation::SimulationState;

use crate::{EconomyEngine, EngineConfig, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub alive: usize,
    pub by_shell: HashMap<String, u32>,
    pub by_class: HashMap<String, u32>,
    pub cumulative_hazard: f64,
    pub cumulative_survival: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub generated_at: String,
    pub seed: u64,
    pub years_simulated: u32,
    pub trajectory: Vec<YearState>,
    pub states: Vec<SimulationState>,
    pub fleet: FleetSummary,
}

/// Drive a fresh engine `years` ticks and collect the report.
///
/// Propagates the fatal validation error unchanged: a run that breaks
/// its own invariants produces no report.
pub fn run_scenario(
    scenario_name: &str,
    params: ScenarioParams,
    config: EngineConfig,
    years: u32,
) -> Result<RunReport> {
    let seed = config.seed;
    let mut engine = EconomyEngine::new(params, config);

    for _ in 0..years {
        engine.advance_year()?;
    }

    let mut by_shell: HashMap<String, u32> = HashMap::new();
    let mut by_class: HashMap<String, u32> = HashMap::new();
    for sat in engine.fleet_snapshot() {
        *by_shell.entry(sat.shell.name().to_string()).or_insert(0) += 1;
        *by_class.entry(format!("{:?}", sat.class)).or_insert(0) += 1;
    }

    Ok(RunReport {
        scenario: scenario_name.to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        seed,
        years_simulated: years,
        trajectory: engine.trajectory().to_vec(),
        states: engine.history().to_vec(),
        fleet: FleetSummary {
            alive: engine.alive_count(),
            by_shell,
            by_class,
            cumulative_hazard: engine.cumulative_hazard(),
            cumulative_survival: engine.fleet_survival(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_scenario_collects_full_history() {
        let report = run_scenario(
            "reference",
            ScenarioParams::reference(),
            EngineConfig { initial_fleet: 6, ..EngineConfig::default() },
            8,
        )
        .unwrap();

        assert_eq!(report.years_simulated, 8);
        assert_eq!(report.trajectory.len(), 8);
        assert_eq!(report.states.len(), 8);
        assert_eq!(report.trajectory.first().unwrap().year, 2025);
        assert_eq!(report.trajectory.last().unwrap().year, 2032);
        assert!(report.fleet.alive > 0);
        assert!(report.fleet.cumulative_survival > 0.0);
        assert!(report.fleet.cumulative_survival <= 1.0);
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = run_scenario(
            "reference",
            ScenarioParams::reference(),
            EngineConfig { initial_fleet: 4, ..EngineConfig::default() },
            3,
        )
        .unwrap();

        let json = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.years_simulated, 3);
        assert_eq!(parsed.trajectory.len(), report.trajectory.len());
    }
}
