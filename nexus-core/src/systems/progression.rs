//! Per-turn progression: energy, attack turns, deposit charges, experience.

use crate::bounded;
use crate::state::{ProgressionState, TurnNumber};
use nexus_data::defines::progression as defines;
use serde::{Deserialize, Serialize};

/// What one turn of progression changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressionGain {
    pub energy: i64,
    pub attack_turns: i64,
    pub deposit_charges: i64,
    pub experience: i64,
    pub levels: i64,
}

pub fn run_progression_tick(progression: &mut ProgressionState, turn: TurnNumber) -> ProgressionGain {
    let mut gain = ProgressionGain::default();

    let mut energy = bounded::energy(progression.energy);
    gain.energy = energy.add(defines::ENERGY_PER_TURN);
    progression.energy = energy.get();

    let mut attack_turns = bounded::attack_turns(progression.attack_turns);
    gain.attack_turns = attack_turns.add(defines::ATTACK_TURNS_PER_TURN);
    progression.attack_turns = attack_turns.get();

    if turn > 0 && turn % defines::DEPOSIT_CHARGE_INTERVAL == 0 {
        let mut charges = bounded::deposit_charges(progression.deposit_charges);
        gain.deposit_charges = charges.add(1);
        progression.deposit_charges = charges.get();
    }

    gain.experience = defines::XP_PER_TURN;
    gain.levels = grant_experience(progression, defines::XP_PER_TURN);
    gain
}

/// Experience needed to go from `level` to `level + 1`.
pub fn xp_for_next_level(level: i64) -> i64 {
    level.max(1).saturating_mul(defines::XP_PER_LEVEL)
}

/// Add experience, levelling up as often as it allows. Returns levels gained.
pub fn grant_experience(progression: &mut ProgressionState, xp: i64) -> i64 {
    progression.experience = progression.experience.saturating_add(xp.max(0));
    let mut gained = 0;
    loop {
        let needed = xp_for_next_level(progression.level);
        if progression.experience < needed {
            break;
        }
        progression.experience -= needed;
        progression.level += 1;
        progression.unallocated_points += defines::POINTS_PER_LEVEL;
        gained += 1;
    }
    if gained > 0 {
        log::info!("Reached level {} (+{} points)", progression.level, gained * defines::POINTS_PER_LEVEL);
    }
    gained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_cap() {
        let mut p = ProgressionState {
            energy: 95,
            attack_turns: defines::MAX_ATTACK_TURNS,
            ..Default::default()
        };
        let gain = run_progression_tick(&mut p, 1);
        assert_eq!(p.energy, defines::MAX_ENERGY);
        assert_eq!(gain.energy, 5);
        assert_eq!(gain.attack_turns, 0);
        assert_eq!(p.attack_turns, defines::MAX_ATTACK_TURNS);
    }

    #[test]
    fn test_deposit_charge_every_interval() {
        let mut p = ProgressionState::default();
        for turn in 1..=8 {
            run_progression_tick(&mut p, turn);
        }
        assert_eq!(p.deposit_charges, 2);
    }

    #[test]
    fn test_level_up_grants_points() {
        let mut p = ProgressionState {
            experience: 995,
            ..Default::default()
        };
        let gain = run_progression_tick(&mut p, 1);
        assert_eq!(gain.levels, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.experience, 0);
        assert_eq!(p.unallocated_points, 1);
    }

    #[test]
    fn test_multiple_levels_at_once() {
        let mut p = ProgressionState::default();
        // 1000 for level 2, 2000 for level 3
        assert_eq!(grant_experience(&mut p, 3_500), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.experience, 500);
    }
}
