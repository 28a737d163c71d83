use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::state::{
    AllianceId, AllianceOperation, AllianceRecord, OperationKind, OperationStatus, PlayerId,
    PlayerRecord, Stat, TurnNumber,
};
use crate::store::{MemoryStore, PlayerStore, PlayerTxn, Report};
use nexus_data::{ItemCategory, StructureKind, UnitKind};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Fluent [`PlayerRecord`] constructor for tests and demo worlds.
pub struct PlayerBuilder {
    record: PlayerRecord,
}

impl PlayerBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            record: PlayerRecord {
                id: PlayerId(id),
                name: format!("player{id}"),
                ..Default::default()
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.record.name = name.to_string();
        self
    }

    pub fn alliance(mut self, id: u64) -> Self {
        self.record.alliance = Some(AllianceId(id));
        self
    }

    pub fn credits(mut self, amount: i64) -> Self {
        self.record.resources.credits = amount;
        self
    }

    pub fn banked(mut self, amount: i64) -> Self {
        self.record.resources.banked_credits = amount;
        self
    }

    pub fn citizens(mut self, amount: i64) -> Self {
        self.record.resources.untrained_citizens = amount;
        self
    }

    pub fn workers(mut self, amount: i64) -> Self {
        self.record.resources.workers = amount;
        self
    }

    pub fn soldiers(mut self, amount: i64) -> Self {
        self.record.resources.soldiers = amount;
        self
    }

    pub fn guards(mut self, amount: i64) -> Self {
        self.record.resources.guards = amount;
        self
    }

    pub fn spies(mut self, amount: i64) -> Self {
        self.record.resources.spies = amount;
        self
    }

    pub fn sentries(mut self, amount: i64) -> Self {
        self.record.resources.sentries = amount;
        self
    }

    pub fn protoform(mut self, amount: i64) -> Self {
        self.record.resources.protoform = Fixed::from_int(amount);
        self
    }

    pub fn structure(mut self, kind: StructureKind, level: i64) -> Self {
        self.record.structures.set(kind, level);
        self
    }

    pub fn stat(mut self, stat: Stat, points: i64) -> Self {
        *self.record.progression.stat_mut(stat) = points;
        self
    }

    pub fn level(mut self, level: i64) -> Self {
        self.record.progression.level = level;
        self
    }

    pub fn unallocated_points(mut self, points: i64) -> Self {
        self.record.progression.unallocated_points = points;
        self
    }

    pub fn energy(mut self, energy: i64) -> Self {
        self.record.progression.energy = energy;
        self
    }

    pub fn attack_turns(mut self, turns: i64) -> Self {
        self.record.progression.attack_turns = turns;
        self
    }

    pub fn deposit_charges(mut self, charges: i64) -> Self {
        self.record.progression.deposit_charges = charges;
        self
    }

    pub fn processed_through(mut self, turn: TurnNumber) -> Self {
        self.record.progression.last_processed_turn = Some(turn);
        self
    }

    pub fn generals(mut self, count: i64) -> Self {
        self.record.specialists.generals = count;
        self
    }

    pub fn scientists(mut self, count: i64) -> Self {
        self.record.specialists.scientists = count;
        self
    }

    /// Activate an edict. Does not add embassy levels.
    pub fn edict(mut self, key: &str) -> Self {
        self.record.edicts.active.push(key.to_string());
        self
    }

    pub fn owns(mut self, item: &str) -> Self {
        self.record.loadout.owned.insert(item.to_string());
        self
    }

    /// Own and equip an item.
    pub fn equip(mut self, unit: UnitKind, category: ItemCategory, item: &str) -> Self {
        self.record.loadout.owned.insert(item.to_string());
        self.record.loadout.equip(unit, category, item);
        self
    }

    pub fn build(self) -> PlayerRecord {
        self.record
    }
}

/// Fluent [`AllianceRecord`] constructor.
pub struct AllianceBuilder {
    record: AllianceRecord,
}

impl AllianceBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            record: AllianceRecord {
                id: AllianceId(id),
                name: format!("alliance{id}"),
                ..Default::default()
            },
        }
    }

    pub fn structure(mut self, key: &str, level: i64) -> Self {
        self.record.structures.set(key, level);
        self
    }

    pub fn treasury(mut self, amount: i64) -> Self {
        self.record.treasury = amount;
        self
    }

    pub fn tax_rate(mut self, rate: f32) -> Self {
        self.record.tax_rate = Fixed::from_f32(rate);
        self
    }

    pub fn operation(mut self, id: u32, kind: OperationKind, target: i64, deadline: TurnNumber) -> Self {
        self.record.operations.push(AllianceOperation {
            id,
            name: format!("{kind} {id}"),
            kind,
            target,
            contributed: 0,
            deadline,
            status: OperationStatus::Active,
        });
        self
    }

    pub fn build(self) -> AllianceRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let player = PlayerBuilder::new(7)
            .alliance(2)
            .soldiers(10)
            .structure(StructureKind::Armory, 2)
            .equip(UnitKind::Soldier, ItemCategory::Weapon, "pulse_rifle")
            .build();

        assert_eq!(player.id, PlayerId(7));
        assert_eq!(player.alliance, Some(AllianceId(2)));
        assert_eq!(player.structures.level(StructureKind::Armory), 2);
        assert!(player.loadout.owns("pulse_rifle"));
        assert_eq!(player.progression.level, 1);

        let alliance = AllianceBuilder::new(2)
            .structure("population_habitat", 1)
            .tax_rate(0.10)
            .build();
        assert_eq!(alliance.structures.level("population_habitat"), 1);
        assert_eq!(alliance.tax_rate, Fixed::from_raw(1_000));
    }
}

/// Delegates to a [`MemoryStore`] but reports a conflict for the first
/// `n` transactions of chosen players.
pub struct FlakyStore {
    inner: MemoryStore,
    conflicts: Mutex<BTreeMap<PlayerId, u32>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore, player: PlayerId, conflicts: u32) -> Self {
        Self {
            inner,
            conflicts: Mutex::new(BTreeMap::from([(player, conflicts)])),
        }
    }

    /// Every transaction of `player` conflicts.
    pub fn always(inner: MemoryStore, player: PlayerId) -> Self {
        Self::new(inner, player, u32::MAX)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl PlayerStore for FlakyStore {
    fn player_ids(&self) -> Vec<PlayerId> {
        self.inner.player_ids()
    }

    fn player(&self, id: PlayerId) -> Result<PlayerRecord, EngineError> {
        self.inner.player(id)
    }

    fn alliance_ids(&self) -> Vec<AllianceId> {
        self.inner.alliance_ids()
    }

    fn alliance(&self, id: AllianceId) -> Result<AllianceRecord, EngineError> {
        self.inner.alliance(id)
    }

    fn transact<T, E, F>(&self, player: PlayerId, f: F) -> Result<T, E>
    where
        E: From<EngineError>,
        F: FnOnce(&mut PlayerTxn) -> Result<T, E>,
    {
        {
            let mut conflicts = self
                .conflicts
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(remaining) = conflicts.get_mut(&player) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(EngineError::PersistenceConflict(player).into());
                }
            }
        }
        self.inner.transact(player, f)
    }

    fn update_alliance<T, F>(&self, id: AllianceId, f: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut AllianceRecord) -> Result<T, EngineError>,
    {
        self.inner.update_alliance(id, f)
    }

    fn append_report(&self, report: Report) -> Result<(), EngineError> {
        self.inner.append_report(report)
    }
}
