//! State Validation Library
//!
//! Fail-fast invariant checking over the aggregate simulation snapshot,
//! with one bounded repair attempt. A snapshot that fails its checks is
//! clamped back into range and re-checked; a snapshot that still fails
//! after repair signals a structural bug in the stepping logic and
//! surfaces as a hard error. That error is never downgraded — continuing
//! would silently corrupt the trajectory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Tolerance for the compute-conservation check (GW).
pub const COMPUTE_BALANCE_TOLERANCE_GW: f64 = 0.01;

/// Minimum plausible propagation latency (ms). No average latency below
/// this is physically producible by the model.
pub const LATENCY_FLOOR_MS: f64 = 0.5;

/// Utilization fraction above which a shell draws a warning.
pub const UTILIZATION_WARN_RATIO: f64 = 0.9;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Simulation state unrepairable after clamp pass: {0:?}")]
    Unrepairable(Vec<Violation>),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Aggregate per-year snapshot handed to external consumers.
///
/// Shell maps are keyed by shell name (`"LEO"`, `"MEO"`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub year: i32,
    pub total_compute_gw: f64,
    pub orbital_compute_gw: f64,
    pub ground_compute_gw: f64,
    pub total_cost_b: f64,
    pub orbital_cost_b: f64,
    pub ground_cost_b: f64,
    pub avg_latency_ms: f64,
    /// Annual carbon mass, Mt CO₂.
    pub carbon_mt: f64,
    /// Orbital fraction of total compute, 0–1.
    pub orbital_share: f64,
    pub shell_capacity: HashMap<String, f64>,
    pub shell_utilization: HashMap<String, f64>,
}

/// A specific invariant breach, in check order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    ComputeImbalance { delta_gw: f64 },
    NegativeCost { field: CostField, value: f64 },
    LatencyBelowFloor { value_ms: f64 },
    OrbitalShareAboveOne { value: f64 },
    ShellOverCapacity { shell: String, utilization: f64, capacity: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostField {
    Total,
    Orbital,
    Ground,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ComputeImbalance { delta_gw } => {
                write!(f, "compute imbalance of {delta_gw:.4} GW")
            }
            Violation::NegativeCost { field, value } => {
                write!(f, "negative {field:?} cost {value:.4}")
            }
            Violation::LatencyBelowFloor { value_ms } => {
                write!(f, "latency {value_ms:.4} ms below floor")
            }
            Violation::OrbitalShareAboveOne { value } => {
                write!(f, "orbital share {value:.4} above 1")
            }
            Violation::ShellOverCapacity { shell, utilization, capacity } => {
                write!(f, "shell {shell} utilization {utilization:.1} over capacity {capacity:.1}")
            }
        }
    }
}

/// Result of a validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub state: SimulationState,
    /// Violations found (and fixed) on this pass; empty when the input
    /// was already valid.
    pub violations: Vec<Violation>,
    pub repaired: bool,
}

/// Check a snapshot, repairing locally if needed.
///
/// Valid input passes through untouched. Repairable input comes back
/// clamped, with the list of violations that were fixed. Input that
/// still fails after repair is a structural bug and returns
/// [`ValidationError::Unrepairable`].
pub fn validate_and_repair(state: SimulationState) -> Result<ValidationOutcome> {
    let violations = check(&state);
    if violations.is_empty() {
        return Ok(ValidationOutcome { state, violations, repaired: false });
    }

    debug!(count = violations.len(), "attempting state repair");
    let repaired = repair(state);

    let remaining = check(&repaired);
    if remaining.is_empty() {
        Ok(ValidationOutcome { state: repaired, violations, repaired: true })
    } else {
        Err(ValidationError::Unrepairable(remaining))
    }
}

/// Run the ordered invariant checks.
fn check(state: &SimulationState) -> Vec<Violation> {
    let mut violations = Vec::new();

    // 1. Compute conservation.
    let delta = state.orbital_compute_gw + state.ground_compute_gw - state.total_compute_gw;
    if !(delta.abs() <= COMPUTE_BALANCE_TOLERANCE_GW) {
        violations.push(Violation::ComputeImbalance { delta_gw: delta });
    }

    // 2. Cost non-negativity.
    for (field, value) in [
        (CostField::Total, state.total_cost_b),
        (CostField::Orbital, state.orbital_cost_b),
        (CostField::Ground, state.ground_cost_b),
    ] {
        if !(value >= 0.0) {
            violations.push(Violation::NegativeCost { field, value });
        }
    }

    // 3. Latency floor.
    if !(state.avg_latency_ms >= LATENCY_FLOOR_MS) {
        violations.push(Violation::LatencyBelowFloor { value_ms: state.avg_latency_ms });
    }

    // 4. Orbital share.
    if !(state.orbital_share <= 1.0) {
        violations.push(Violation::OrbitalShareAboveOne { value: state.orbital_share });
    }

    // 5. Shell utilization vs capacity. Warn early at 90%.
    for (shell, utilization) in &state.shell_utilization {
        let capacity = state.shell_capacity.get(shell).copied().unwrap_or(0.0);
        if *utilization > capacity {
            violations.push(Violation::ShellOverCapacity {
                shell: shell.clone(),
                utilization: *utilization,
                capacity,
            });
        } else if *utilization > UTILIZATION_WARN_RATIO * capacity {
            warn!(
                shell = shell.as_str(),
                utilization, capacity, "shell utilization above 90% of capacity"
            );
        }
    }

    violations
}

/// Local clamp repair. Costs and share clamp into range, latency clamps
/// up to the floor, shell utilization clamps to capacity, and total
/// compute is recomputed as the sum of its parts.
fn repair(mut state: SimulationState) -> SimulationState {
    state.total_cost_b = state.total_cost_b.max(0.0);
    state.orbital_cost_b = state.orbital_cost_b.max(0.0);
    state.ground_cost_b = state.ground_cost_b.max(0.0);

    state.avg_latency_ms = state.avg_latency_ms.max(LATENCY_FLOOR_MS);
    state.orbital_share = state.orbital_share.min(1.0);

    for (shell, utilization) in state.shell_utilization.iter_mut() {
        let capacity = state.shell_capacity.get(shell).copied().unwrap_or(0.0);
        if *utilization > capacity {
            *utilization = capacity;
        }
    }

    state.total_compute_gw = state.orbital_compute_gw + state.ground_compute_gw;
    state
}
