//! Shell assignment scoring
//!
//! Picks the shell for the next satellite by minimizing a weighted
//! combination of normalized congestion and occupancy-relative-to-capacity.
//! Ties break toward the earlier shell in [`ShellId::ALL`], so identical
//! inputs always produce identical assignments.

use std::collections::HashMap;
use tracing::debug;

use crate::{Result, Shell, ShellError, ShellId};

/// Scoring weights. Congestion dominates; occupancy pressure keeps a
/// filling shell from absorbing the whole batch.
pub const W_CONGESTION: f64 = 0.6;
pub const W_OCCUPANCY: f64 = 0.4;

/// Select a shell for the next satellite.
///
/// `congestion` is the engine's running congestion estimate per shell
/// (arbitrary non-negative scale; normalized here against the maximum).
/// `occupancy` is the committed satellite count per shell. A `forced`
/// shell bypasses scoring but is still validated against capacity.
pub fn assign_shell(
    congestion: &HashMap<ShellId, f64>,
    occupancy: &HashMap<ShellId, u32>,
    forced: Option<ShellId>,
) -> Result<ShellId> {
    if let Some(id) = forced {
        let shell = Shell::of(id);
        let occupied = occupancy.get(&id).copied().unwrap_or(0);
        if occupied >= shell.capacity {
            return Err(ShellError::AtCapacity(id, shell.capacity));
        }
        return Ok(id);
    }

    let max_congestion = ShellId::ALL
        .iter()
        .map(|id| congestion.get(id).copied().unwrap_or(0.0))
        .fold(0.0_f64, f64::max);

    let mut best: Option<(ShellId, f64)> = None;
    for id in ShellId::ALL {
        let shell = Shell::of(id);
        let occupied = occupancy.get(&id).copied().unwrap_or(0);
        if occupied >= shell.capacity {
            continue;
        }

        let congestion_norm = if max_congestion > 0.0 {
            congestion.get(&id).copied().unwrap_or(0.0) / max_congestion
        } else {
            0.0
        };
        let occupancy_norm = occupied as f64 / shell.capacity as f64;
        let score = W_CONGESTION * congestion_norm + W_OCCUPANCY * occupancy_norm;

        debug!(shell = id.name(), score, congestion_norm, occupancy_norm, "shell score");

        // Strict < keeps the earlier (higher-priority) shell on ties.
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((id, score)),
        }
    }

    best.map(|(id, _)| id).ok_or(ShellError::AllShellsAtCapacity)
}
