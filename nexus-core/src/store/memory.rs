//! In-process [`PlayerStore`] with optimistic per-player versioning.

use super::{AllianceDelta, PlayerStore, PlayerTxn, Report};
use crate::error::EngineError;
use crate::state::{AllianceId, AllianceRecord, PlayerId, PlayerRecord};
use crate::systems::operations::apply_contribution;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

#[derive(Debug)]
struct Versioned {
    version: u64,
    record: PlayerRecord,
}

/// Store backed by in-memory maps.
///
/// The set of players and alliances is fixed after construction; each entry
/// has its own lock, so transactions on different players never contend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: BTreeMap<PlayerId, Mutex<Versioned>>,
    alliances: BTreeMap<AllianceId, Mutex<AllianceRecord>>,
    reports: RwLock<Vec<Report>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new(players: Vec<PlayerRecord>, alliances: Vec<AllianceRecord>) -> Self {
        Self {
            players: players
                .into_iter()
                .map(|record| (record.id, Mutex::new(Versioned { version: 0, record })))
                .collect(),
            alliances: alliances
                .into_iter()
                .map(|a| (a.id, Mutex::new(a)))
                .collect(),
            reports: RwLock::new(Vec::new()),
        }
    }

    fn entry(&self, id: PlayerId) -> Result<&Mutex<Versioned>, EngineError> {
        self.players
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("player {id}")))
    }

    fn alliance_entry(&self, id: AllianceId) -> Result<&Mutex<AllianceRecord>, EngineError> {
        self.alliances
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(format!("alliance {id}")))
    }

    /// Current commit version of a player.
    pub fn version(&self, id: PlayerId) -> Result<u64, EngineError> {
        Ok(lock(self.entry(id)?).version)
    }

    pub fn players(&self) -> Vec<PlayerRecord> {
        self.players
            .values()
            .map(|m| lock(m).record.clone())
            .collect()
    }

    pub fn alliances(&self) -> Vec<AllianceRecord> {
        self.alliances.values().map(|m| lock(m).clone()).collect()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn apply_alliance_deltas(&self, id: AllianceId, deltas: &[AllianceDelta]) -> Result<(), EngineError> {
        let mut alliance = lock(self.alliance_entry(id)?);
        for delta in deltas {
            match delta {
                AllianceDelta::Treasury(amount) => {
                    let applied = alliance.adjust_treasury(*amount);
                    if applied != *amount {
                        log::warn!("{}: treasury clamped ({} of {})", id, applied, amount);
                    }
                }
                AllianceDelta::Contribution { contribution, turn } => {
                    apply_contribution(&mut alliance, contribution, *turn);
                }
            }
        }
        Ok(())
    }
}

impl PlayerStore for MemoryStore {
    fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    fn player(&self, id: PlayerId) -> Result<PlayerRecord, EngineError> {
        Ok(lock(self.entry(id)?).record.clone())
    }

    fn alliance_ids(&self) -> Vec<AllianceId> {
        self.alliances.keys().copied().collect()
    }

    fn alliance(&self, id: AllianceId) -> Result<AllianceRecord, EngineError> {
        Ok(lock(self.alliance_entry(id)?).clone())
    }

    fn transact<T, E, F>(&self, player: PlayerId, f: F) -> Result<T, E>
    where
        E: From<EngineError>,
        F: FnOnce(&mut PlayerTxn) -> Result<T, E>,
    {
        let entry = self.entry(player)?;
        let (version, snapshot) = {
            let guard = lock(entry);
            (guard.version, guard.record.clone())
        };

        let mut txn = PlayerTxn::new(snapshot);
        let value = f(&mut txn)?;
        let (record, deltas) = txn.into_parts();
        let alliance = record.alliance;

        {
            let mut guard = lock(entry);
            if guard.version != version {
                return Err(EngineError::PersistenceConflict(player).into());
            }
            guard.record = record;
            guard.version += 1;
        }

        // The player is committed at this point; alliance deltas cannot undo it.
        if !deltas.is_empty() {
            match alliance {
                Some(id) => {
                    if let Err(e) = self.apply_alliance_deltas(id, &deltas) {
                        log::error!("{}: alliance deltas dropped: {}", player, e);
                    }
                }
                None => log::warn!("{}: alliance deltas without an alliance dropped", player),
            }
        }
        Ok(value)
    }

    fn update_alliance<T, F>(&self, id: AllianceId, f: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut AllianceRecord) -> Result<T, EngineError>,
    {
        let mut guard = lock(self.alliance_entry(id)?);
        let mut copy = guard.clone();
        let value = f(&mut copy)?;
        *guard = copy;
        Ok(value)
    }

    fn append_report(&self, report: Report) -> Result<(), EngineError> {
        self.reports
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{OperationKind, ResourceDelta};
    use crate::systems::OperationContribution;
    use crate::testing::{AllianceBuilder, PlayerBuilder};

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                PlayerBuilder::new(1).alliance(9).credits(100).build(),
                PlayerBuilder::new(2).credits(50).build(),
            ],
            vec![AllianceBuilder::new(9)
                .operation(1, OperationKind::CreditDrive, 1_000, 10)
                .build()],
        )
    }

    #[test]
    fn test_failed_transaction_writes_nothing() {
        let store = store();
        let result: Result<(), EngineError> = store.transact(PlayerId(1), |txn| {
            txn.record.resources.credits = 0;
            txn.pay_treasury(10);
            Err(EngineError::invalid("abort"))
        });
        assert!(result.is_err());
        assert_eq!(store.player(PlayerId(1)).unwrap().resources.credits, 100);
        assert_eq!(store.alliance(AllianceId(9)).unwrap().treasury, 0);
        assert_eq!(store.version(PlayerId(1)).unwrap(), 0);
    }

    #[test]
    fn test_commit_applies_alliance_deltas() {
        let store = store();
        store
            .transact(PlayerId(1), |txn| {
                txn.record
                    .resources
                    .try_apply(&ResourceDelta::credits(-40))?;
                txn.pay_treasury(40);
                txn.contribute(
                    OperationContribution {
                        operation: 1,
                        amount: 40,
                    },
                    1,
                );
                Ok::<_, EngineError>(())
            })
            .unwrap();

        let alliance = store.alliance(AllianceId(9)).unwrap();
        assert_eq!(alliance.treasury, 40);
        assert_eq!(alliance.operations[0].contributed, 40);
        assert_eq!(store.player(PlayerId(1)).unwrap().resources.credits, 60);
        assert_eq!(store.version(PlayerId(1)).unwrap(), 1);
    }

    #[test]
    fn test_concurrent_write_conflicts() {
        let store = store();
        let result: Result<(), EngineError> = store.transact(PlayerId(2), |txn| {
            // Another writer commits while this transaction is open.
            store.transact(PlayerId(2), |inner| {
                inner.record.resources.credits += 1;
                Ok::<_, EngineError>(())
            })?;
            txn.record.resources.credits += 100;
            Ok(())
        });
        assert_eq!(result, Err(EngineError::PersistenceConflict(PlayerId(2))));
        assert_eq!(store.player(PlayerId(2)).unwrap().resources.credits, 51);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let store = store();
        assert!(matches!(
            store.player(PlayerId(99)),
            Err(EngineError::NotFound(_))
        ));
        assert!(matches!(
            store.alliance(AllianceId(1)),
            Err(EngineError::NotFound(_))
        ));
    }
}
