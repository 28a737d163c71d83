//! Persistence seam.
//!
//! The engine never holds a lock across players. Each player is updated in
//! its own transaction; alliance-side effects of that transaction (tax paid
//! into the treasury, operation contributions) are recorded as relative
//! deltas and applied when the player's transaction commits, so concurrent
//! members never overwrite each other.
//!
//! ```text
//! TurnProcessor / execute_command
//!        │ transact(player, |txn| ...)
//!        ▼
//!   PlayerStore ──► PlayerTxn { record, alliance deltas }
//!        │
//!        ├── MemoryStore (versioned records, optimistic commit)
//!        └── [external] SQL-backed store
//! ```

pub mod memory;

pub use memory::MemoryStore;

use crate::error::EngineError;
use crate::state::{AllianceId, AllianceRecord, PlayerId, PlayerRecord, TurnNumber};
use crate::systems::{BattleReport, EspionageReport, OperationContribution};
use serde::{Deserialize, Serialize};

/// Relative change to an alliance, applied at player commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllianceDelta {
    Treasury(i64),
    Contribution {
        contribution: OperationContribution,
        turn: TurnNumber,
    },
}

/// Transaction-local copy of one player plus pending alliance deltas.
#[derive(Debug, Clone)]
pub struct PlayerTxn {
    pub record: PlayerRecord,
    alliance_deltas: Vec<AllianceDelta>,
}

impl PlayerTxn {
    pub fn new(record: PlayerRecord) -> Self {
        Self {
            record,
            alliance_deltas: Vec::new(),
        }
    }

    pub fn pay_treasury(&mut self, amount: i64) {
        if amount != 0 {
            self.alliance_deltas.push(AllianceDelta::Treasury(amount));
        }
    }

    pub fn contribute(&mut self, contribution: OperationContribution, turn: TurnNumber) {
        self.alliance_deltas.push(AllianceDelta::Contribution {
            contribution,
            turn,
        });
    }

    pub fn alliance_deltas(&self) -> &[AllianceDelta] {
        &self.alliance_deltas
    }

    pub fn into_parts(self) -> (PlayerRecord, Vec<AllianceDelta>) {
        (self.record, self.alliance_deltas)
    }
}

/// Immutable combat or espionage outcome kept for both parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Battle(BattleReport),
    Espionage(EspionageReport),
}

pub trait PlayerStore: Sync {
    fn player_ids(&self) -> Vec<PlayerId>;

    /// Read-only snapshot of a player.
    fn player(&self, id: PlayerId) -> Result<PlayerRecord, EngineError>;

    fn alliance_ids(&self) -> Vec<AllianceId>;

    /// Read-only snapshot of an alliance.
    fn alliance(&self, id: AllianceId) -> Result<AllianceRecord, EngineError>;

    /// Run `f` on a transaction-local copy of `player` and commit it.
    ///
    /// Nothing is written if `f` fails. Returns
    /// [`EngineError::PersistenceConflict`] if the player changed underneath.
    fn transact<T, E, F>(&self, player: PlayerId, f: F) -> Result<T, E>
    where
        E: From<EngineError>,
        F: FnOnce(&mut PlayerTxn) -> Result<T, E>;

    /// Serialised read-modify-write of one alliance.
    fn update_alliance<T, F>(&self, id: AllianceId, f: F) -> Result<T, EngineError>
    where
        F: FnOnce(&mut AllianceRecord) -> Result<T, EngineError>;

    fn append_report(&self, report: Report) -> Result<(), EngineError>;
}
