//! Net worth.

use crate::state::{ProgressionState, ResourceLedger, StructureLevels};
use nexus_data::defines::networth as defines;

/// Weighted sum of wealth, army, structures and level.
pub fn calculate_net_worth(
    resources: &ResourceLedger,
    structures: &StructureLevels,
    progression: &ProgressionState,
) -> i64 {
    let credits = resources.credits.saturating_add(resources.banked_credits) / defines::CREDITS_PER_POINT;
    let civilians = resources
        .workers
        .saturating_add(resources.untrained_citizens)
        .saturating_mul(defines::CIVILIAN_WEIGHT);
    let military = resources
        .soldiers
        .saturating_add(resources.guards)
        .saturating_mul(defines::MILITARY_WEIGHT);
    let covert = resources
        .spies
        .saturating_add(resources.sentries)
        .saturating_mul(defines::COVERT_WEIGHT);
    let buildings = structures
        .total_levels()
        .saturating_mul(defines::STRUCTURE_LEVEL_WEIGHT);
    let level = progression
        .level
        .saturating_mul(defines::PLAYER_LEVEL_WEIGHT);

    [credits, civilians, military, covert, buildings, level]
        .into_iter()
        .fold(0i64, i64::saturating_add)
        .max(0)
}
