//! Buildout-rate curve
//!
//! Rates between anchors are interpolated geometrically (log-linear), so
//! a doubling over a decade reads as a constant fractional ramp rather
//! than a straight line. Outside the anchor span the rate clamps to the
//! nearest anchor. An optional centered moving average over the
//! unsmoothed curve removes anchor-joint kinks.

use crate::ScenarioParams;

/// Smoothed buildout rate (GW/yr) at `year`.
pub fn build_rate(year: i32, params: &ScenarioParams) -> f64 {
    if params.smoothing_window_years == 0 {
        return build_rate_raw(year, params);
    }

    let first = params.build_anchors.first().expect("validated: >= 2 anchors");
    let last = params.build_anchors.last().expect("validated: >= 2 anchors");

    // Centered, boundary-truncated moving average over unsmoothed values.
    let half = (params.smoothing_window_years / 2) as i32;
    let mut sum = 0.0;
    let mut samples = 0u32;
    for offset in -half..=half {
        let sample_year = (year + offset).clamp(first.year, last.year);
        sum += build_rate_raw(sample_year, params);
        samples += 1;
    }
    sum / samples as f64
}

/// Unsmoothed rate: geometric interpolation between the bracketing
/// anchors, clamped outside the span.
pub fn build_rate_raw(year: i32, params: &ScenarioParams) -> f64 {
    let anchors = &params.build_anchors;
    let first = anchors.first().expect("validated: >= 2 anchors");
    let last = anchors.last().expect("validated: >= 2 anchors");

    if year <= first.year {
        return first.gw_per_year;
    }
    if year >= last.year {
        return last.gw_per_year;
    }

    for pair in anchors.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if year >= lo.year && year <= hi.year {
            let t = (year - lo.year) as f64 / (hi.year - lo.year) as f64;
            return lo.gw_per_year * (hi.gw_per_year / lo.gw_per_year).powf(t);
        }
    }
    last.gw_per_year
}

/// Ratio of smoothed to unsmoothed rate at `year`. Diagnostic only.
pub fn smoothing_factor(year: i32, params: &ScenarioParams) -> f64 {
    let raw = build_rate_raw(year, params);
    if raw == 0.0 {
        return 1.0;
    }
    build_rate(year, params) / raw
}
