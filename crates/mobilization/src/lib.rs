//! Mobilization Model
//!
//! Demand projection and buildout stepping for the hybrid ground/orbital
//! compute economy. Demand follows a two-segment piecewise exponential
//! through three control anchors; buildout rate is geometrically
//! interpolated between anchor years and optionally smoothed with a
//! centered moving average. The year stepper accumulates capacity,
//! pipeline, and backlog into an append-only trajectory of [`YearState`]
//! records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod buildout;
pub mod demand;
pub mod step;

pub use buildout::build_rate;
pub use demand::demand_gw;
pub use step::{step_year, YearState};

/// Default power-usage-effectiveness factor for converting IT load to
/// facility load.
pub const DEFAULT_PUE: f64 = 1.3;

/// Division guard for wait-time calculation.
pub const RATE_EPSILON: f64 = 1e-9;

/// Strict-mode tolerance for reproducing the middle demand anchor.
pub const ANCHOR_FIT_TOLERANCE: f64 = 0.03;

/// Strict-mode sanity floor at the final anchor, as a fraction of the
/// anchor value.
pub const FINAL_ANCHOR_FLOOR_RATIO: f64 = 0.66;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Unsupported demand curve kind: {0}")]
    UnsupportedCurve(String),
    #[error("Anchor years must be strictly increasing: {0}")]
    AnchorOrder(String),
    #[error("Anchor values must be strictly positive: {0}")]
    NonPositiveAnchor(String),
    #[error("Need at least two buildout anchors, have {0}")]
    TooFewBuildAnchors(usize),
    #[error("Demand curve failed strict anchor verification: {0}")]
    AnchorFit(String),
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

/// Supported demand-curve families.
///
/// Only the piecewise exponential is implemented; scenario files naming
/// anything else fail at construction, never at simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandCurveKind {
    PiecewiseExponential,
}

impl DemandCurveKind {
    /// Parse the curve kind named by a scenario file.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "piecewise-exponential" | "piecewise_exponential" => {
                Ok(DemandCurveKind::PiecewiseExponential)
            }
            other => Err(ScenarioError::UnsupportedCurve(other.to_string())),
        }
    }
}

/// A (year, value) control point the demand curve passes through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DemandAnchor {
    pub year: i32,
    pub gw: f64,
}

/// A (year, rate) control point for the buildout-rate curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuildAnchor {
    pub year: i32,
    pub gw_per_year: f64,
}

/// Validated scenario parameters.
///
/// Construction is the configuration-error boundary: anchor ordering,
/// positivity, and the curve kind are all rejected here so the stepping
/// path never sees malformed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub curve_kind: DemandCurveKind,
    /// Start / middle / end demand anchors (GW).
    pub demand_anchors: [DemandAnchor; 3],
    /// True when demand anchors already include power-usage overhead.
    pub demand_is_facility_load: bool,
    /// Buildout-rate anchors, strictly increasing in year.
    pub build_anchors: Vec<BuildAnchor>,
    /// Centered smoothing window for the buildout rate, in years. Zero
    /// disables smoothing.
    pub smoothing_window_years: u32,
    /// Pipeline lead time in years.
    pub pipeline_lead_years: f64,
    /// Fraction of the pipeline assumed filled.
    pub pipeline_fill_fraction: f64,
    /// When set, the demand curve is verified against its own anchors at
    /// construction.
    pub strict_mode: bool,
}

impl ScenarioParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        curve_kind: DemandCurveKind,
        demand_anchors: [DemandAnchor; 3],
        demand_is_facility_load: bool,
        build_anchors: Vec<BuildAnchor>,
        smoothing_window_years: u32,
        pipeline_lead_years: f64,
        pipeline_fill_fraction: f64,
        strict_mode: bool,
    ) -> Result<Self> {
        let params = Self {
            curve_kind,
            demand_anchors,
            demand_is_facility_load,
            build_anchors,
            smoothing_window_years,
            pipeline_lead_years,
            pipeline_fill_fraction,
            strict_mode,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        let [a0, a1, a2] = &self.demand_anchors;
        if a0.year >= a1.year || a1.year >= a2.year {
            return Err(ScenarioError::AnchorOrder(format!(
                "demand anchors at {}, {}, {}",
                a0.year, a1.year, a2.year
            )));
        }
        for anchor in &self.demand_anchors {
            if anchor.gw <= 0.0 {
                return Err(ScenarioError::NonPositiveAnchor(format!(
                    "demand {} GW at {}",
                    anchor.gw, anchor.year
                )));
            }
        }

        if self.build_anchors.len() < 2 {
            return Err(ScenarioError::TooFewBuildAnchors(self.build_anchors.len()));
        }
        for pair in self.build_anchors.windows(2) {
            if pair[0].year >= pair[1].year {
                return Err(ScenarioError::AnchorOrder(format!(
                    "buildout anchors at {} and {}",
                    pair[0].year, pair[1].year
                )));
            }
        }
        for anchor in &self.build_anchors {
            if anchor.gw_per_year <= 0.0 {
                return Err(ScenarioError::NonPositiveAnchor(format!(
                    "buildout {} GW/yr at {}",
                    anchor.gw_per_year, anchor.year
                )));
            }
        }

        if self.strict_mode {
            self.verify_anchor_fit()?;
        }
        Ok(())
    }

    /// Strict-mode self-check: the curve must reproduce the middle anchor
    /// within tolerance and clear a sanity floor at the final anchor.
    fn verify_anchor_fit(&self) -> Result<()> {
        let [_, mid, end] = &self.demand_anchors;

        let at_mid = demand::demand_curve_gw(mid.year, self);
        let rel_err = (at_mid - mid.gw).abs() / mid.gw;
        if rel_err > ANCHOR_FIT_TOLERANCE {
            return Err(ScenarioError::AnchorFit(format!(
                "demand({}) = {:.1} GW, anchor {:.1} GW (rel err {:.4})",
                mid.year, at_mid, mid.gw, rel_err
            )));
        }

        let at_end = demand::demand_curve_gw(end.year, self);
        let floor = end.gw * FINAL_ANCHOR_FLOOR_RATIO;
        if at_end < floor {
            return Err(ScenarioError::AnchorFit(format!(
                "demand({}) = {:.1} GW below sanity floor {:.1} GW",
                end.year, at_end, floor
            )));
        }
        Ok(())
    }

    /// Reference scenario: facility-load demand anchored at 120 GW (2025),
    /// 450 GW (2040), 3,000 GW (2060) with buildout ramping 25 to 220
    /// GW/yr.
    pub fn reference() -> Self {
        Self::new(
            DemandCurveKind::PiecewiseExponential,
            [
                DemandAnchor { year: 2025, gw: 120.0 },
                DemandAnchor { year: 2040, gw: 450.0 },
                DemandAnchor { year: 2060, gw: 3000.0 },
            ],
            true,
            vec![
                BuildAnchor { year: 2025, gw_per_year: 25.0 },
                BuildAnchor { year: 2030, gw_per_year: 60.0 },
                BuildAnchor { year: 2040, gw_per_year: 140.0 },
                BuildAnchor { year: 2060, gw_per_year: 220.0 },
            ],
            5,
            3.0,
            0.6,
            false,
        )
        .expect("reference scenario is valid")
    }
}
