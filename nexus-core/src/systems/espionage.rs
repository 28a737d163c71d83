//! Spy missions.
//!
//! Spy power is scaled by the share of the player's spies sent on the
//! mission; the mission succeeds iff that exceeds the target's sentry power.

use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::state::{PlayerId, Resource, TurnNumber};
use crate::systems::combat::{Combatant, DefenderView};
use nexus_data::defines::espionage as defines;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mission {
    /// Reveals a snapshot of the target.
    Intelligence,
    /// Kills a share of the target's workers.
    Assassination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspionageReport {
    pub spy: PlayerId,
    pub target: PlayerId,
    pub turn: TurnNumber,
    pub mission: Mission,
    pub spies_sent: i64,
    pub spy_power: i64,
    pub sentry_power: i64,
    pub success: bool,
    pub spies_lost: i64,
    pub workers_killed: i64,
    pub intel: Option<DefenderView>,
}

pub fn resolve_espionage(
    spy: Combatant,
    target: Combatant,
    mission: Mission,
    spies_sent: i64,
    turn: TurnNumber,
) -> Result<EspionageReport, EngineError> {
    if spy.record.id == target.record.id {
        return Err(EngineError::invalid("A player cannot spy on themselves"));
    }
    if spies_sent <= 0 {
        return Err(EngineError::invalid(format!(
            "Spies sent must be positive, got {spies_sent}"
        )));
    }
    let spies = spy.record.resources.spies;
    if spies < spies_sent {
        return Err(EngineError::insufficient(Resource::Spies, spies_sent, spies));
    }
    let energy = spy.record.progression.energy;
    if energy < defines::MISSION_ENERGY_COST {
        return Err(EngineError::insufficient(
            Resource::Energy,
            defines::MISSION_ENERGY_COST,
            energy,
        ));
    }

    let spy_power = (Fixed::from_int(spy.metrics.power.spy)
        * Fixed::ratio(Fixed::from_int(spies_sent), Fixed::from_int(spies)))
    .floor_int();
    let sentry_power = target.metrics.power.sentry;
    let success = spy_power > sentry_power;

    let spies_lost = if success {
        0
    } else {
        Fixed::from_f32(defines::FAILED_MISSION_SPY_LOSS)
            .mul_int(spies_sent)
            .floor_int()
    };
    let workers_killed = if success && mission == Mission::Assassination {
        Fixed::from_f32(defines::ASSASSINATION_RATE)
            .mul_int(target.record.resources.workers)
            .floor_int()
            .max(0)
    } else {
        0
    };
    let intel = (success && mission == Mission::Intelligence)
        .then(|| DefenderView::capture(target, turn));

    log::info!(
        "{} mission {} -> {}: {} vs {} sentry, {}",
        mission,
        spy.record.id,
        target.record.id,
        spy_power,
        sentry_power,
        if success { "success" } else { "failure" }
    );

    Ok(EspionageReport {
        spy: spy.record.id,
        target: target.record.id,
        turn,
        mission,
        spies_sent,
        spy_power,
        sentry_power,
        success,
        spies_lost,
        workers_killed,
        intel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{Calculator, PlayerMetrics};
    use crate::rules::RuleBook;
    use crate::state::PlayerRecord;
    use crate::testing::PlayerBuilder;

    fn metrics(record: &PlayerRecord) -> PlayerMetrics {
        Calculator::new(&RuleBook::builtin())
            .compute(&record.sources(None))
            .unwrap()
    }

    #[test]
    fn test_partial_send_scales_power() {
        let spy = PlayerBuilder::new(1).spies(100).energy(50).build();
        let target = PlayerBuilder::new(2).sentries(40).workers(500).build();
        let (sm, tm) = (metrics(&spy), metrics(&target));
        let s = Combatant {
            record: &spy,
            metrics: &sm,
        };
        let t = Combatant {
            record: &target,
            metrics: &tm,
        };

        // Half the spies: 500 vs 400 sentry
        let report = resolve_espionage(s, t, Mission::Assassination, 50, 1).unwrap();
        assert!(report.success);
        assert_eq!(report.spy_power, 500);
        assert_eq!(report.workers_killed, 10);
        assert!(report.intel.is_none());

        // 33 of 100: 330 vs 400
        let report = resolve_espionage(s, t, Mission::Intelligence, 33, 1).unwrap();
        assert!(!report.success);
        assert_eq!(report.spies_lost, 8);
        assert!(report.intel.is_none());
    }

    #[test]
    fn test_intelligence_reveals_snapshot() {
        let spy = PlayerBuilder::new(1).spies(10).energy(10).build();
        let target = PlayerBuilder::new(2).credits(77_000).build();
        let (sm, tm) = (metrics(&spy), metrics(&target));

        let report = resolve_espionage(
            Combatant {
                record: &spy,
                metrics: &sm,
            },
            Combatant {
                record: &target,
                metrics: &tm,
            },
            Mission::Intelligence,
            10,
            4,
        )
        .unwrap();

        let intel = report.intel.unwrap();
        assert_eq!(intel.credits, 77_000);
        assert_eq!(intel.taken_on, 4);
    }

    #[test]
    fn test_requires_energy_and_spies() {
        let spy = PlayerBuilder::new(1).spies(10).energy(5).build();
        let target = PlayerBuilder::new(2).build();
        let (sm, tm) = (metrics(&spy), metrics(&target));
        let s = Combatant {
            record: &spy,
            metrics: &sm,
        };
        let t = Combatant {
            record: &target,
            metrics: &tm,
        };

        assert!(matches!(
            resolve_espionage(s, t, Mission::Intelligence, 5, 1),
            Err(EngineError::InsufficientResource {
                resource: Resource::Energy,
                ..
            })
        ));
        assert!(matches!(
            resolve_espionage(s, t, Mission::Intelligence, 11, 1),
            Err(EngineError::InsufficientResource {
                resource: Resource::Spies,
                ..
            })
        ));
    }
}
