//! Economy Engine
//!
//! Owns the canonical simulation state — mobilization trajectory, fleet
//! list, per-shell occupancy, ID allocator, and the deterministic RNG —
//! and advances it one simulated year per tick. Each tick runs the
//! mobilization step, the fleet production law, shell assignment and
//! positioning for new satellites, phase propagation, the survival roll,
//! and finally invariant validation over the aggregate snapshot.
//!
//! Consumers read year and satellite snapshots by value; nothing here
//! hands out mutable access to engine internals.

use chrono::{DateTime, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use fleet_survival::{annual_failure_rate, cumulative_survival, HazardScenario, SurvivalState};
use mobilization::{step_year, ScenarioError, ScenarioParams, YearState};
use orbital_shells::{
    assign_shell, generate_position, next_fleet_count, GeodeticPosition, GrowthStrategy,
    PositioningConfig, Satellite, SatelliteClass, SatelliteId, Shell, ShellError, ShellId,
};
use state_validation::{validate_and_repair, SimulationState, ValidationError};

pub mod economics;
pub mod report;
pub mod scenario_file;

pub use report::{run_scenario, FleetSummary, RunReport};
pub use scenario_file::ScenarioFile;

/// One simulated year of orbital motion, seconds.
pub const YEAR_SECONDS: f64 = 31_557_600.0;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Scenario configuration: {0}")]
    Scenario(#[from] ScenarioError),
    #[error("State validation: {0}")]
    Validation(#[from] ValidationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Thermal/shielding/maintenance environment for the survival model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub shielding_mass_fraction: f64,
    pub core_temp_c: f64,
    pub design_temp_c: f64,
    pub radiator_utilization: f64,
    pub repair_capacity_per_year: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            shielding_mass_fraction: 0.15,
            core_temp_c: 55.0,
            design_temp_c: 60.0,
            radiator_utilization: 0.85,
            repair_capacity_per_year: 20.0,
        }
    }
}

/// Engine knobs beyond the mobilization scenario itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub start_year: i32,
    pub pue: f64,
    pub strategy: GrowthStrategy,
    pub use_max_growth: bool,
    pub initial_fleet: u64,
    pub seed: u64,
    pub positioning: PositioningConfig,
    pub hazard: HazardScenario,
    pub environment: EnvironmentConfig,
    /// Ground capacity retired per year (GW).
    pub retirements_gw_per_year: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_year: 2025,
            pue: mobilization::DEFAULT_PUE,
            strategy: GrowthStrategy::Conservative,
            use_max_growth: false,
            initial_fleet: 12,
            seed: 42,
            positioning: PositioningConfig::default(),
            hazard: HazardScenario::Nominal,
            environment: EnvironmentConfig::default(),
            retirements_gw_per_year: 0.0,
        }
    }
}

/// Outcome of one deployment batch. Skips are soft conditions; the batch
/// always runs to completion or shell exhaustion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub requested: u64,
    pub deployed: u64,
    pub skipped_no_position: u64,
    pub skipped_at_capacity: u64,
}

/// Sequential satellite ID allocation, owned by one engine instance so
/// concurrent or repeated runs never collide.
#[derive(Debug, Default)]
struct SatelliteIdAllocator {
    next: u64,
}

impl SatelliteIdAllocator {
    fn allocate(&mut self) -> SatelliteId {
        let id = SatelliteId(self.next);
        self.next += 1;
        id
    }
}

pub struct EconomyEngine {
    params: ScenarioParams,
    config: EngineConfig,
    next_year: i32,
    trajectory: Vec<YearState>,
    history: Vec<SimulationState>,
    fleet: Vec<Satellite>,
    occupancy: HashMap<ShellId, u32>,
    congestion: HashMap<ShellId, f64>,
    ids: SatelliteIdAllocator,
    rng: ChaCha8Rng,
    cumulative_hazard: f64,
}

impl EconomyEngine {
    /// Build an engine and deploy the initial fleet.
    pub fn new(params: ScenarioParams, config: EngineConfig) -> Self {
        let mut engine = Self {
            next_year: config.start_year,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            params,
            trajectory: Vec::new(),
            history: Vec::new(),
            fleet: Vec::new(),
            occupancy: HashMap::new(),
            congestion: HashMap::new(),
            ids: SatelliteIdAllocator::default(),
            cumulative_hazard: 0.0,
            config,
        };
        let initial = engine.config.initial_fleet;
        if initial > 0 {
            let report = engine.deploy_satellites(initial, SatelliteClass::Compute);
            info!(deployed = report.deployed, "initial fleet deployed");
        }
        engine
    }

    /// Advance one simulated year. A tick is atomic: consumers only see
    /// the appended snapshots after it returns.
    pub fn advance_year(&mut self) -> Result<&SimulationState> {
        let year = self.next_year;

        // 1. Mobilization step.
        let year_state = step_year(
            self.trajectory.last(),
            &self.params,
            year,
            self.config.pue,
            self.config.retirements_gw_per_year,
        );
        self.trajectory.push(year_state);

        // 2–3. Production law sizes this year's batch; assignment and
        // positioning place it.
        let alive = self.fleet.len() as u64;
        let target = next_fleet_count(alive, self.config.strategy, self.config.use_max_growth);
        let batch = target.saturating_sub(alive);
        let deployment = self.deploy_satellites(batch, SatelliteClass::Compute);
        debug!(year, ?deployment, "deployment batch");

        // 4. Orbital motion.
        for sat in &mut self.fleet {
            sat.advance_phase(YEAR_SECONDS);
        }

        // 5. Attrition.
        let failures = self.survival_roll();
        if failures > 0 {
            info!(year, failures, alive = self.fleet.len(), "fleet attrition");
        }

        self.update_congestion();

        // 6. Aggregate snapshot, validated before anyone sees it.
        let snapshot = economics::derive_state(
            self.trajectory.last().expect("pushed above"),
            &self.fleet,
            &self.occupancy,
        );
        let outcome = validate_and_repair(snapshot)?;
        if outcome.repaired {
            info!(year, fixed = outcome.violations.len(), "snapshot repaired");
        }
        self.history.push(outcome.state);

        self.next_year = year + 1;
        Ok(self.history.last().expect("pushed above"))
    }

    /// Explicit deployment command: place `count` satellites of `class`.
    /// `Observer` satellites are forced into the sun-synchronous shell.
    pub fn deploy_satellites(&mut self, count: u64, class: SatelliteClass) -> DeploymentReport {
        let mut report = DeploymentReport { requested: count, ..Default::default() };
        let launched = self.launch_epoch();
        let forced = (class == SatelliteClass::Observer).then_some(ShellId::SunSync);

        for _ in 0..count {
            let shell_id = match assign_shell(&self.congestion, &self.occupancy, forced) {
                Ok(id) => id,
                Err(ShellError::AtCapacity(id, capacity)) => {
                    warn!(shell = id.name(), capacity, "forced shell at capacity, batch stopped");
                    report.skipped_at_capacity = count - report.deployed - report.skipped_no_position;
                    break;
                }
                Err(ShellError::AllShellsAtCapacity) => {
                    warn!("all shells at capacity, batch stopped");
                    report.skipped_at_capacity = count - report.deployed - report.skipped_no_position;
                    break;
                }
            };

            let shell = Shell::of(shell_id);
            let resident: Vec<GeodeticPosition> = self
                .fleet
                .iter()
                .filter(|sat| sat.shell == shell_id)
                .map(|sat| sat.geodetic)
                .collect();

            match generate_position(&shell, &resident, &self.config.positioning, &mut self.rng) {
                Some(position) => {
                    let id = self.ids.allocate();
                    let satellite = Satellite::deploy(id, &shell, class, position, launched);
                    *self.occupancy.entry(shell_id).or_insert(0) += 1;
                    self.fleet.push(satellite);
                    report.deployed += 1;
                }
                None => {
                    // Soft condition: skip this satellite, keep the batch.
                    warn!(shell = shell_id.name(), "positioning exhausted, satellite skipped");
                    report.skipped_no_position += 1;
                }
            }
        }

        report
    }

    /// Explicitly retire a satellite. Returns false when the ID is not
    /// in the fleet (already failed or retired).
    pub fn retire_satellite(&mut self, id: SatelliteId) -> bool {
        match self.fleet.iter().position(|sat| sat.id == id) {
            Some(index) => {
                let sat = self.fleet.remove(index);
                if let Some(occupied) = self.occupancy.get_mut(&sat.shell) {
                    *occupied = occupied.saturating_sub(1);
                }
                info!(id = %sat.id, shell = sat.shell.name(), "satellite retired");
                true
            }
            None => false,
        }
    }

    /// Bernoulli attrition draw per satellite against this year's
    /// failure rate. Deterministic under the engine seed.
    fn survival_roll(&mut self) -> u64 {
        let alive = self.fleet.len() as u64;
        if alive == 0 {
            return 0;
        }

        let flux_ratio = self
            .fleet
            .iter()
            .map(|sat| sat.shell.flux_ratio())
            .sum::<f64>()
            / alive as f64;
        let env = &self.config.environment;
        let survival_state = SurvivalState {
            flux_ratio,
            shielding_mass_fraction: env.shielding_mass_fraction,
            core_temp_c: env.core_temp_c,
            design_temp_c: env.design_temp_c,
            radiator_utilization: env.radiator_utilization,
            repair_capacity: env.repair_capacity_per_year,
            alive_count: alive,
        };
        let rate = annual_failure_rate(&survival_state, self.config.hazard);
        self.cumulative_hazard += rate;

        let mut failures = 0u64;
        let fleet = std::mem::take(&mut self.fleet);
        for sat in fleet {
            if self.rng.gen::<f64>() < rate {
                debug!(id = %sat.id, shell = sat.shell.name(), "satellite failed");
                if let Some(occupied) = self.occupancy.get_mut(&sat.shell) {
                    *occupied = occupied.saturating_sub(1);
                }
                failures += 1;
            } else {
                self.fleet.push(sat);
            }
        }
        failures
    }

    /// Congestion estimate with one-year memory: half the previous
    /// estimate, half the current fill fraction.
    fn update_congestion(&mut self) {
        for id in ShellId::ALL {
            let shell = Shell::of(id);
            let fill = self.occupancy.get(&id).copied().unwrap_or(0) as f64 / shell.capacity as f64;
            let prev = self.congestion.get(&id).copied().unwrap_or(0.0);
            self.congestion.insert(id, 0.5 * prev + 0.5 * fill);
        }
    }

    fn launch_epoch(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(self.next_year, 1, 1, 0, 0, 0)
            .single()
            .expect("midnight Jan 1 is unambiguous in UTC")
    }

    // Read-only snapshot surface.

    pub fn current_year(&self) -> i32 {
        self.next_year - 1
    }

    pub fn trajectory(&self) -> &[YearState] {
        &self.trajectory
    }

    pub fn history(&self) -> &[SimulationState] {
        &self.history
    }

    /// Fleet snapshot by value.
    pub fn fleet_snapshot(&self) -> Vec<Satellite> {
        self.fleet.clone()
    }

    pub fn alive_count(&self) -> usize {
        self.fleet.len()
    }

    pub fn occupancy(&self) -> &HashMap<ShellId, u32> {
        &self.occupancy
    }

    pub fn cumulative_hazard(&self) -> f64 {
        self.cumulative_hazard
    }

    /// Fleet survival probability under the accumulated hazard.
    pub fn fleet_survival(&self) -> f64 {
        cumulative_survival(self.cumulative_hazard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EngineConfig {
        EngineConfig {
            initial_fleet: 8,
            seed: 7,
            ..EngineConfig::default()
        }
    }

    fn engine() -> EconomyEngine {
        EconomyEngine::new(ScenarioParams::reference(), small_config())
    }

    #[test]
    fn test_initial_fleet_deployed() {
        let engine = engine();
        assert_eq!(engine.alive_count(), 8);
        let occupied: u32 = engine.occupancy().values().sum();
        assert_eq!(occupied, 8);
    }

    #[test]
    fn test_advance_year_appends_snapshots() {
        let mut engine = engine();
        for expected_year in 2025..2030 {
            let state = engine.advance_year().unwrap();
            assert_eq!(state.year, expected_year);
        }
        assert_eq!(engine.trajectory().len(), 5);
        assert_eq!(engine.history().len(), 5);
        assert_eq!(engine.current_year(), 2029);
    }

    #[test]
    fn test_fleet_grows_under_production_law() {
        let mut engine = engine();
        let before = engine.alive_count();
        engine.advance_year().unwrap();
        // Conservative min doubles, minus any attrition.
        assert!(engine.alive_count() > before);
    }

    #[test]
    fn test_snapshots_satisfy_invariants() {
        let mut engine = engine();
        for _ in 0..8 {
            engine.advance_year().unwrap();
        }
        for state in engine.history() {
            let delta =
                (state.orbital_compute_gw + state.ground_compute_gw - state.total_compute_gw).abs();
            assert!(delta <= state_validation::COMPUTE_BALANCE_TOLERANCE_GW);
            assert!(state.orbital_share <= 1.0);
            assert!(state.avg_latency_ms >= state_validation::LATENCY_FLOOR_MS);
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = |seed: u64| {
            let mut engine = EconomyEngine::new(
                ScenarioParams::reference(),
                EngineConfig { seed, initial_fleet: 8, ..EngineConfig::default() },
            );
            for _ in 0..6 {
                engine.advance_year().unwrap();
            }
            (
                engine.alive_count(),
                engine.cumulative_hazard(),
                engine.fleet_snapshot().iter().map(|s| s.geodetic.lon_deg).collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_observer_forced_into_sun_sync() {
        let mut engine = engine();
        let report = engine.deploy_satellites(3, SatelliteClass::Observer);
        assert_eq!(report.deployed, 3);
        let observers: Vec<_> = engine
            .fleet_snapshot()
            .into_iter()
            .filter(|s| s.class == SatelliteClass::Observer)
            .collect();
        assert_eq!(observers.len(), 3);
        assert!(observers.iter().all(|s| s.shell == ShellId::SunSync));
    }

    #[test]
    fn test_retire_satellite_frees_occupancy() {
        let mut engine = engine();
        let sat = engine.fleet_snapshot()[0].clone();
        let before = engine.occupancy()[&sat.shell];

        assert!(engine.retire_satellite(sat.id));
        assert_eq!(engine.alive_count(), 7);
        assert_eq!(engine.occupancy()[&sat.shell], before - 1);

        // Second retirement of the same ID is a no-op.
        assert!(!engine.retire_satellite(sat.id));
    }

    #[test]
    fn test_satellite_ids_are_sequential_per_engine() {
        let engine_a = engine();
        let engine_b = engine();
        let ids_a: Vec<u64> = engine_a.fleet_snapshot().iter().map(|s| s.id.0).collect();
        let ids_b: Vec<u64> = engine_b.fleet_snapshot().iter().map(|s| s.id.0).collect();
        // Two runs each start from zero; no process-wide shared counter.
        assert_eq!(ids_a, (0..8).collect::<Vec<u64>>());
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_crowded_positioning_skips_not_aborts() {
        // One-attempt budget, and every Observer forced into the same
        // sun-synchronous shell: rejections accumulate as the shell
        // fills, and each one skips that satellite without ending the
        // batch.
        let mut config = small_config();
        config.initial_fleet = 0;
        config.positioning = PositioningConfig { max_attempts: 1 };
        let mut engine = EconomyEngine::new(ScenarioParams::reference(), config);

        let report = engine.deploy_satellites(400, SatelliteClass::Observer);
        assert_eq!(
            report.deployed + report.skipped_no_position + report.skipped_at_capacity,
            400
        );
        assert_eq!(engine.alive_count() as u64, report.deployed);
        assert!(report.skipped_no_position > 0, "a one-attempt budget against a filling shell must reject sometimes");
    }
}
