//! Fleet production law
//!
//! Year-over-year fleet growth is a bounded multiplicative law: the
//! strategy fixes a multiplier range and the caller selects the range's
//! floor or ceiling. Fractional satellites are floored away.

use serde::{Deserialize, Serialize};

/// Deployment aggressiveness. Conservative doubles-to-triples per year;
/// aggressive runs four-to-six-fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthStrategy {
    Conservative,
    Aggressive,
}

impl GrowthStrategy {
    /// Inclusive multiplier bounds for one year of growth.
    pub fn multiplier_bounds(&self) -> (f64, f64) {
        match self {
            GrowthStrategy::Conservative => (2.0, 3.0),
            GrowthStrategy::Aggressive => (4.0, 6.0),
        }
    }
}

/// Fleet size after one year under `strategy`. `use_max` selects the
/// upper bound of the strategy's multiplier range.
pub fn next_fleet_count(count: u64, strategy: GrowthStrategy, use_max: bool) -> u64 {
    let (lo, hi) = strategy.multiplier_bounds();
    let multiplier = if use_max { hi } else { lo };
    (count as f64 * multiplier).floor() as u64
}

/// Project the fleet `years` ahead. The returned sequence starts with
/// `count` and applies the law iteratively, so it is monotone
/// non-decreasing for any multiplier ≥ 1.
pub fn project_fleet(count: u64, strategy: GrowthStrategy, use_max: bool, years: u32) -> Vec<u64> {
    let mut projection = Vec::with_capacity(years as usize + 1);
    projection.push(count);
    let mut current = count;
    for _ in 0..years {
        current = next_fleet_count(current, strategy, use_max);
        projection.push(current);
    }
    projection
}
