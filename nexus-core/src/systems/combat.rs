//! Battle resolution.
//!
//! Deterministic: the same two snapshots and attack-turn count always give the
//! same report. Victory iff attacker offense exceeds defender defense.
//!
//! Casualty rates scale with the opposing power ratio:
//!
//! ```text
//! attacker soldiers: clamp(BASE_LOSS_RATE × defense / offense, 0, MAX_LOSS_RATE)
//! defender guards:   clamp(BASE_LOSS_RATE × offense / defense, 0, MAX_LOSS_RATE)
//!                    (halved when the attack fails)
//! ```
//!
//! The report is immutable and embeds a [`DefenderView`] taken at attack time,
//! so it stays valid whatever happens to the defender afterwards.

use crate::calculator::{PlayerMetrics, PowerReport};
use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::state::{PlayerId, PlayerRecord, Resource, TurnNumber};
use nexus_data::defines::combat as defines;
use serde::{Deserialize, Serialize};

/// One side of a battle or spy mission: the stored record plus its computed
/// metrics.
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub record: &'a PlayerRecord,
    pub metrics: &'a PlayerMetrics,
}

/// What the attacker saw of the defender at attack time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderView {
    pub player: PlayerId,
    pub name: String,
    pub level: i64,
    pub net_worth: i64,
    pub credits: i64,
    pub workers: i64,
    pub soldiers: i64,
    pub guards: i64,
    pub spies: i64,
    pub sentries: i64,
    pub power: PowerReport,
    pub taken_on: TurnNumber,
}

impl DefenderView {
    pub fn capture(defender: Combatant, turn: TurnNumber) -> Self {
        let r = &defender.record.resources;
        Self {
            player: defender.record.id,
            name: defender.record.name.clone(),
            level: defender.record.progression.level,
            net_worth: defender.record.progression.net_worth,
            credits: r.credits,
            workers: r.workers,
            soldiers: r.soldiers,
            guards: r.guards,
            spies: r.spies,
            sentries: r.sentries,
            power: defender.metrics.power,
            taken_on: turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub turn: TurnNumber,
    pub attack_turns: i64,
    pub offense: i64,
    pub defense: i64,
    pub victory: bool,
    pub attacker_soldiers_lost: i64,
    pub defender_guards_lost: i64,
    pub plunder: i64,
    pub experience: i64,
    pub war_prestige: i64,
    pub defender_view: DefenderView,
}

fn loss_rate(own: i64, opposing: i64) -> Fixed {
    let base = Fixed::from_f32(defines::BASE_LOSS_RATE);
    let cap = Fixed::from_f32(defines::MAX_LOSS_RATE);
    if own <= 0 {
        return cap;
    }
    (base * Fixed::ratio(Fixed::from_int(opposing), Fixed::from_int(own))).clamp(Fixed::ZERO, cap)
}

fn casualties(units: i64, rate: Fixed) -> i64 {
    rate.mul_int(units).floor_int().clamp(0, units.max(0))
}

/// Plunder share for spending `attack_turns`.
pub fn plunder_rate(attack_turns: i64) -> Fixed {
    Fixed::from_f32(defines::PLUNDER_RATE_PER_TURN)
        .mul_int(attack_turns)
        .min(Fixed::from_f32(defines::MAX_PLUNDER_RATE))
}

pub fn resolve_battle(
    attacker: Combatant,
    defender: Combatant,
    attack_turns: i64,
    turn: TurnNumber,
) -> Result<BattleReport, EngineError> {
    if attacker.record.id == defender.record.id {
        return Err(EngineError::invalid("A player cannot attack themselves"));
    }
    if !(1..=defines::MAX_ATTACK_TURNS_PER_BATTLE).contains(&attack_turns) {
        return Err(EngineError::invalid(format!(
            "Attack turns must be between 1 and {}, got {}",
            defines::MAX_ATTACK_TURNS_PER_BATTLE,
            attack_turns
        )));
    }
    let available = attacker.record.progression.attack_turns;
    if available < attack_turns {
        return Err(EngineError::insufficient(
            Resource::AttackTurns,
            attack_turns,
            available,
        ));
    }
    if attacker.record.resources.soldiers <= 0 {
        return Err(EngineError::invalid("No soldiers to attack with"));
    }

    let offense = attacker.metrics.power.offense;
    let defense = defender.metrics.power.defense;
    let victory = offense > defense;

    let attacker_rate = loss_rate(offense, defense);
    let mut defender_rate = loss_rate(defense, offense);
    if !victory {
        defender_rate = defender_rate * Fixed::HALF;
    }

    let plunder = if victory {
        plunder_rate(attack_turns)
            .mul_int(defender.record.resources.credits)
            .floor_int()
            .max(0)
    } else {
        0
    };

    let report = BattleReport {
        attacker: attacker.record.id,
        defender: defender.record.id,
        turn,
        attack_turns,
        offense,
        defense,
        victory,
        attacker_soldiers_lost: casualties(attacker.record.resources.soldiers, attacker_rate),
        defender_guards_lost: casualties(defender.record.resources.guards, defender_rate),
        plunder,
        experience: defines::XP_PER_ATTACK_TURN * attack_turns,
        war_prestige: if victory {
            defines::PRESTIGE_PER_ATTACK_TURN * attack_turns
        } else {
            0
        },
        defender_view: DefenderView::capture(defender, turn),
    };

    log::info!(
        "Battle {} -> {}: offense {} vs defense {}, {} (plunder {}, losses {}/{})",
        report.attacker,
        report.defender,
        offense,
        defense,
        if victory { "victory" } else { "defeat" },
        report.plunder,
        report.attacker_soldiers_lost,
        report.defender_guards_lost
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Calculator;
    use crate::rules::RuleBook;
    use crate::testing::PlayerBuilder;

    fn metrics(record: &PlayerRecord) -> PlayerMetrics {
        Calculator::new(&RuleBook::builtin())
            .compute(&record.sources(None))
            .unwrap()
    }

    #[test]
    fn test_stronger_attacker_wins_and_plunders() {
        let attacker = PlayerBuilder::new(1).soldiers(1_000).attack_turns(20).build();
        let defender = PlayerBuilder::new(2).guards(100).credits(100_000).build();
        let (am, dm) = (metrics(&attacker), metrics(&defender));

        let report = resolve_battle(
            Combatant {
                record: &attacker,
                metrics: &am,
            },
            Combatant {
                record: &defender,
                metrics: &dm,
            },
            5,
            3,
        )
        .unwrap();

        assert!(report.victory);
        assert_eq!(report.offense, 10_000);
        assert_eq!(report.defense, 1_000);
        // 10% of 100k for 5 turns
        assert_eq!(report.plunder, 10_000);
        // 0.05 × 1000/10000 = 0.005 → 5 soldiers
        assert_eq!(report.attacker_soldiers_lost, 5);
        // 0.05 × 10 capped at 0.15 → 15 guards
        assert_eq!(report.defender_guards_lost, 15);
        assert_eq!(report.experience, 100);
        assert_eq!(report.war_prestige, 10);
        assert_eq!(report.defender_view.credits, 100_000);
        assert_eq!(report.defender_view.taken_on, 3);
    }

    #[test]
    fn test_equal_power_is_defeat() {
        let attacker = PlayerBuilder::new(1).soldiers(100).attack_turns(5).build();
        let defender = PlayerBuilder::new(2).guards(100).credits(50_000).build();
        let (am, dm) = (metrics(&attacker), metrics(&defender));

        let report = resolve_battle(
            Combatant {
                record: &attacker,
                metrics: &am,
            },
            Combatant {
                record: &defender,
                metrics: &dm,
            },
            1,
            1,
        )
        .unwrap();

        assert!(!report.victory);
        assert_eq!(report.plunder, 0);
        assert_eq!(report.war_prestige, 0);
        assert_eq!(report.attacker_soldiers_lost, 5);
        // 0.05 halved on a failed attack
        assert_eq!(report.defender_guards_lost, 2);
    }

    #[test]
    fn test_battle_is_deterministic() {
        let attacker = PlayerBuilder::new(1).soldiers(321).attack_turns(10).build();
        let defender = PlayerBuilder::new(2).guards(123).credits(9_999).build();
        let (am, dm) = (metrics(&attacker), metrics(&defender));
        let run = || {
            resolve_battle(
                Combatant {
                    record: &attacker,
                    metrics: &am,
                },
                Combatant {
                    record: &defender,
                    metrics: &dm,
                },
                7,
                2,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_rejects_bad_attack_turns() {
        let attacker = PlayerBuilder::new(1).soldiers(10).attack_turns(2).build();
        let defender = PlayerBuilder::new(2).build();
        let (am, dm) = (metrics(&attacker), metrics(&defender));
        let a = Combatant {
            record: &attacker,
            metrics: &am,
        };
        let d = Combatant {
            record: &defender,
            metrics: &dm,
        };

        assert!(matches!(
            resolve_battle(a, d, 0, 1),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_battle(a, d, 3, 1),
            Err(EngineError::InsufficientResource {
                resource: Resource::AttackTurns,
                ..
            })
        ));
        assert!(matches!(
            resolve_battle(a, a, 1, 1),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_plunder_rate_caps() {
        assert_eq!(plunder_rate(1), Fixed::from_raw(200));
        assert_eq!(plunder_rate(10), Fixed::from_raw(2_000));
        assert_eq!(plunder_rate(50), Fixed::from_raw(2_000));
    }
}
