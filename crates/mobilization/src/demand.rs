//! Piecewise-exponential demand projection
//!
//! Two segments: start→middle anchor and middle→end anchor, each with its
//! own continuous growth rate so the curve passes through all three
//! anchors exactly. Years before the first anchor return the first
//! anchor's value; there is no backward extrapolation.

use crate::ScenarioParams;

/// Demand in facility-load GW at `year`.
///
/// When the scenario's anchors are IT load rather than facility load, the
/// curve value is multiplied by `pue` to account for power-usage overhead.
pub fn demand_gw(year: i32, params: &ScenarioParams, pue: f64) -> f64 {
    let curve = demand_curve_gw(year, params);
    if params.demand_is_facility_load {
        curve
    } else {
        curve * pue
    }
}

/// Raw curve value at `year`, in the same units as the anchors.
pub fn demand_curve_gw(year: i32, params: &ScenarioParams) -> f64 {
    let [start, mid, end] = &params.demand_anchors;

    if year <= start.year {
        return start.gw;
    }
    if year <= mid.year {
        let rate = segment_rate(start.gw, mid.gw, start.year, mid.year);
        start.gw * (rate * (year - start.year) as f64).exp()
    } else {
        let rate = segment_rate(mid.gw, end.gw, mid.year, end.year);
        mid.gw * (rate * (year - mid.year) as f64).exp()
    }
}

/// Continuous growth rate that produced the demand value at `year`.
/// Diagnostic only; zero before the first anchor.
pub fn growth_rate(year: i32, params: &ScenarioParams) -> f64 {
    let [start, mid, end] = &params.demand_anchors;
    if year <= start.year {
        0.0
    } else if year <= mid.year {
        segment_rate(start.gw, mid.gw, start.year, mid.year)
    } else {
        segment_rate(mid.gw, end.gw, mid.year, end.year)
    }
}

fn segment_rate(from_gw: f64, to_gw: f64, from_year: i32, to_year: i32) -> f64 {
    (to_gw / from_gw).ln() / (to_year - from_year) as f64
}
