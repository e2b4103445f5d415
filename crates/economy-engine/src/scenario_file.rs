//! Scenario file loading
//!
//! JSON scenario files name their demand curve as a string; mapping that
//! string onto [`mobilization::DemandCurveKind`] is where an unsupported
//! curve becomes a configuration error, before any engine exists.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use mobilization::{BuildAnchor, DemandAnchor, DemandCurveKind, ScenarioParams, DEFAULT_PUE};

use crate::Result;

fn default_pue() -> f64 {
    DEFAULT_PUE
}

/// On-disk scenario description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub name: String,
    /// Curve family name, e.g. `"piecewise-exponential"`.
    pub demand_curve: String,
    pub demand_anchors: [DemandAnchor; 3],
    pub demand_is_facility_load: bool,
    #[serde(default = "default_pue")]
    pub pue: f64,
    pub build_anchors: Vec<BuildAnchor>,
    #[serde(default)]
    pub smoothing_window_years: u32,
    pub pipeline_lead_years: f64,
    pub pipeline_fill_fraction: f64,
    #[serde(default)]
    pub strict_mode: bool,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<ScenarioFile> {
        let file = File::open(path)?;
        let scenario: ScenarioFile = serde_json::from_reader(BufReader::new(file))?;
        info!(name = scenario.name.as_str(), "loaded scenario");
        Ok(scenario)
    }

    /// Validate into engine-ready parameters.
    pub fn into_params(self) -> Result<ScenarioParams> {
        let curve_kind = DemandCurveKind::parse(&self.demand_curve)?;
        let params = ScenarioParams::new(
            curve_kind,
            self.demand_anchors,
            self.demand_is_facility_load,
            self.build_anchors,
            self.smoothing_window_years,
            self.pipeline_lead_years,
            self.pipeline_fill_fraction,
            self.strict_mode,
        )?;
        Ok(params)
    }
}
