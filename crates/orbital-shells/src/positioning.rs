//! Constrained satellite positioning (rejection sampling)
//!
//! Candidate positions are drawn until one clears the shell's minimum
//! angular separation from every already-placed satellite, or the attempt
//! budget runs out. The budget bounds the loop so an over-constrained
//! shell degrades to a skipped satellite instead of a hang.
//!
//! Latitude law: `lat = asin(u · sin(band))` for u uniform in [−1, 1] —
//! the cosine-density restriction of a uniform sphere distribution to the
//! band, so density thins toward the band edges (pole-averse). The
//! sun-synchronous shell uses the same form with its fixed inclination in
//! place of the band half-width.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{angular_separation_deg, GeodeticPosition, Shell};

/// Rejection-sampling attempt budget. Explicit configuration rather than
/// a buried constant so tests can tighten it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositioningConfig {
    pub max_attempts: u32,
}

impl Default for PositioningConfig {
    fn default() -> Self {
        Self { max_attempts: 64 }
    }
}

/// Sample a valid position in `shell`, or `None` when the attempt budget
/// is exhausted. `existing` must hold the positions already committed to
/// the same shell; separation against other shells is not checked.
pub fn generate_position<R: Rng + ?Sized>(
    shell: &Shell,
    existing: &[GeodeticPosition],
    config: &PositioningConfig,
    rng: &mut R,
) -> Option<GeodeticPosition> {
    for attempt in 0..config.max_attempts {
        let lon_deg = rng.gen_range(-180.0..180.0);
        let lat_deg = sample_latitude(shell, rng);

        let candidate = GeodeticPosition {
            lat_deg,
            lon_deg,
            altitude_km: 0.0,
        };

        let conflict = existing
            .iter()
            .any(|other| angular_separation_deg(&candidate, other) < shell.min_separation_deg);
        if conflict {
            continue;
        }

        let altitude_km = if shell.altitude_min_km == shell.altitude_max_km {
            shell.altitude_min_km
        } else {
            rng.gen_range(shell.altitude_min_km..=shell.altitude_max_km)
        };

        debug!(
            shell = shell.id.name(),
            attempt, lat_deg, lon_deg, altitude_km, "position accepted"
        );
        return Some(GeodeticPosition { lat_deg, lon_deg, altitude_km });
    }

    debug!(
        shell = shell.id.name(),
        attempts = config.max_attempts,
        occupied = existing.len(),
        "position sampling exhausted"
    );
    None
}

/// Pole-averse latitude draw for the shell's band, or the inclination-
/// constrained draw for sun-synchronous shells.
fn sample_latitude<R: Rng + ?Sized>(shell: &Shell, rng: &mut R) -> f64 {
    let u: f64 = rng.gen_range(-1.0..=1.0);
    let half_width = match shell.inclination_deg {
        Some(inclination) => inclination.to_radians().sin().abs(),
        None => shell.lat_band_deg.to_radians().sin(),
    };
    (u * half_width).asin().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Shell, ShellId};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_positions_respect_latitude_band() {
        let shell = Shell::of(ShellId::Leo);
        let mut rng = rng(7);
        for _ in 0..200 {
            let pos = generate_position(&shell, &[], &PositioningConfig::default(), &mut rng)
                .expect("empty shell always accepts");
            assert!(
                pos.lat_deg.abs() <= shell.lat_band_deg + 1e-9,
                "latitude {} outside ±{}",
                pos.lat_deg,
                shell.lat_band_deg
            );
            assert!(pos.lon_deg >= -180.0 && pos.lon_deg < 180.0);
            assert!(pos.altitude_km >= shell.altitude_min_km);
            assert!(pos.altitude_km <= shell.altitude_max_km);
        }
    }

    #[test]
    fn test_positions_respect_min_separation() {
        let shell = Shell::of(ShellId::Meo);
        let mut rng = rng(11);
        let mut placed: Vec<GeodeticPosition> = Vec::new();
        let config = PositioningConfig::default();

        for _ in 0..40 {
            if let Some(pos) = generate_position(&shell, &placed, &config, &mut rng) {
                for other in &placed {
                    assert!(
                        angular_separation_deg(&pos, other) >= shell.min_separation_deg,
                        "separation violated"
                    );
                }
                placed.push(pos);
            }
        }
        assert!(placed.len() > 10, "sampler should place most of a sparse batch");
    }

    #[test]
    fn test_geo_altitude_is_fixed() {
        let shell = Shell::of(ShellId::Geo);
        let mut rng = rng(3);
        let pos = generate_position(&shell, &[], &PositioningConfig::default(), &mut rng).unwrap();
        assert_eq!(pos.altitude_km, 35786.0);
    }

    #[test]
    fn test_sun_sync_latitude_bounded_by_inclination() {
        let shell = Shell::of(ShellId::SunSync);
        let bound = shell
            .inclination_deg
            .unwrap()
            .to_radians()
            .sin()
            .abs()
            .asin()
            .to_degrees();
        let mut rng = rng(19);
        for _ in 0..200 {
            let pos = generate_position(&shell, &[], &PositioningConfig::default(), &mut rng).unwrap();
            assert!(pos.lat_deg.abs() <= bound + 1e-9);
        }
    }

    #[test]
    fn test_exhaustion_returns_none() {
        // A shell whose min separation exceeds any possible spacing: one
        // resident satellite blocks the entire sphere.
        let mut shell = Shell::of(ShellId::Geo);
        shell.min_separation_deg = 361.0;
        let resident = GeodeticPosition { lat_deg: 0.0, lon_deg: 0.0, altitude_km: 35786.0 };
        let mut rng = rng(5);
        let config = PositioningConfig { max_attempts: 16 };
        assert!(generate_position(&shell, &[resident], &config, &mut rng).is_none());
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let shell = Shell::of(ShellId::Leo);
        let config = PositioningConfig::default();
        let a = generate_position(&shell, &[], &config, &mut rng(42)).unwrap();
        let b = generate_position(&shell, &[], &config, &mut rng(42)).unwrap();
        assert_eq!(a.lat_deg, b.lat_deg);
        assert_eq!(a.lon_deg, b.lon_deg);
        assert_eq!(a.altitude_km, b.altitude_km);
    }

    proptest! {
        #[test]
        fn prop_accepted_positions_stay_in_band(seed in 0u64..1000) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for shell in Shell::catalog() {
                if let Some(pos) =
                    generate_position(&shell, &[], &PositioningConfig::default(), &mut rng)
                {
                    prop_assert!(pos.lat_deg.abs() <= shell.lat_band_deg + 1e-9);
                    prop_assert!(pos.altitude_km >= shell.altitude_min_km);
                    prop_assert!(pos.altitude_km <= shell.altitude_max_km);
                }
            }
        }
    }
}
