//! Year-by-year mobilization stepping
//!
//! Each step folds the demand and buildout curves into the running
//! capacity/pipeline/backlog accounting. States are immutable once
//! produced; the caller appends them to an ordered trajectory.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{buildout, demand, ScenarioParams, RATE_EPSILON};

/// One simulated year of the mobilization model.
///
/// `growth_rate` and `smoothing_factor` record the curve internals that
/// produced this state; they carry no semantics downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearState {
    pub year: i32,
    /// Facility-load demand (GW).
    pub demand_gw: f64,
    /// Demand growth over the previous year (GW).
    pub demand_delta_gw: f64,
    /// Buildout rate this year (GW/yr).
    pub build_rate_gw: f64,
    /// Cumulative built capacity (GW).
    pub capacity_gw: f64,
    /// Capacity in the construction pipeline (GW).
    pub pipeline_gw: f64,
    /// Unmet demand carried forward (GW).
    pub backlog_gw: f64,
    /// Backlog divided by build rate (years).
    pub avg_wait_years: f64,
    pub growth_rate: f64,
    pub smoothing_factor: f64,
}

/// Step the mobilization model to `year`.
///
/// `prev` is the state for `year − 1`, or `None` on the first call, in
/// which case previous demand is read off the curve at `year − 1` and
/// capacity/backlog start from zero. `retirements_gw` is capacity taken
/// out of service this year.
pub fn step_year(
    prev: Option<&YearState>,
    params: &ScenarioParams,
    year: i32,
    pue: f64,
    retirements_gw: f64,
) -> YearState {
    let demand_gw = demand::demand_gw(year, params, pue);
    let prev_demand = match prev {
        Some(state) => state.demand_gw,
        None => demand::demand_gw(year - 1, params, pue),
    };
    let demand_delta_gw = demand_gw - prev_demand;

    let build_rate_gw = buildout::build_rate(year, params);

    let prev_capacity = prev.map(|s| s.capacity_gw).unwrap_or(0.0);
    let prev_backlog = prev.map(|s| s.backlog_gw).unwrap_or(0.0);

    let capacity_gw = prev_capacity + build_rate_gw - retirements_gw;
    let pipeline_gw = build_rate_gw * params.pipeline_lead_years * params.pipeline_fill_fraction;
    let backlog_gw = (prev_backlog + demand_delta_gw - build_rate_gw).max(0.0);
    let avg_wait_years = backlog_gw / build_rate_gw.max(RATE_EPSILON);

    debug!(
        year,
        demand_gw, build_rate_gw, capacity_gw, backlog_gw, "mobilization step"
    );

    YearState {
        year,
        demand_gw,
        demand_delta_gw,
        build_rate_gw,
        capacity_gw,
        pipeline_gw,
        backlog_gw,
        avg_wait_years,
        growth_rate: demand::growth_rate(year, params),
        smoothing_factor: buildout::smoothing_factor(year, params),
    }
}
