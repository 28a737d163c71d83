//! Turn processor.
//!
//! Advances one player by one turn inside a single store transaction:
//!
//! ```text
//! already processed? ──yes──► AlreadyProcessed (no change)
//!        │ no
//!        ▼
//! compute metrics (alliance structures read-only)
//!        ▼
//! upkeep (clamped, shortfall logged)
//!        ▼
//! income (alliance tax → treasury delta)
//!        ▼
//! progression ─► net worth ─► operation contributions ─► mark processed
//! ```
//!
//! A batch runs every player as its own transaction, retries persistence
//! conflicts, isolates all other failures to the player that raised them,
//! and finally advances alliance operations.

use crate::calculator::{Calculator, IncomeReport, PlayerMetrics};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::metrics::TurnMetrics;
use crate::rules::RuleBook;
use crate::state::{PlayerId, ResourceDelta, Shortfall, TurnNumber};
use crate::store::{PlayerStore, PlayerTxn};
use crate::systems::operations::{self, contributions_for};
use crate::systems::{
    calculate_net_worth, run_progression_tick, run_upkeep, OperationContribution,
    OperationTransition, ProgressionGain,
};
use nexus_data::defines::alliance as alliance_defines;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::instrument;

/// What one player's turn did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub player: PlayerId,
    pub turn: TurnNumber,
    /// Upkeep that could not be paid.
    pub shortfall: Shortfall,
    pub income: IncomeReport,
    pub tax_paid: i64,
    pub progression: ProgressionGain,
    pub net_worth: i64,
    pub contributions: Vec<OperationContribution>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Processed(TurnReport),
    AlreadyProcessed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerFailure {
    pub player: PlayerId,
    pub error: EngineError,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub turn: TurnNumber,
    pub processed: Vec<TurnReport>,
    pub skipped: Vec<PlayerId>,
    pub failures: Vec<PlayerFailure>,
    /// Players that committed after at least one conflict retry.
    pub retried: u64,
    pub operations: Vec<OperationTransition>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_into(&self, metrics: &mut TurnMetrics) {
        metrics.batches += 1;
        metrics.players_processed += self.processed.len() as u64;
        metrics.players_skipped += self.skipped.len() as u64;
        metrics.players_failed += self.failures.len() as u64;
        metrics.conflicts_retried += self.retried;
        metrics.operations_resolved += self.operations.len() as u64;
        metrics.total_time += self.elapsed;
    }
}

pub struct TurnProcessor<'a, S> {
    store: &'a S,
    rules: &'a RuleBook,
    config: EngineConfig,
}

impl<'a, S: PlayerStore> TurnProcessor<'a, S> {
    pub fn new(store: &'a S, rules: &'a RuleBook, config: EngineConfig) -> Self {
        Self {
            store,
            rules,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[instrument(skip(self), name = "player_turn")]
    pub fn process_turn_for_player(
        &self,
        player: PlayerId,
        turn: TurnNumber,
    ) -> Result<TurnOutcome, EngineError> {
        self.store
            .transact(player, |txn| self.apply_turn(txn, turn))
    }

    fn apply_turn(&self, txn: &mut PlayerTxn, turn: TurnNumber) -> Result<TurnOutcome, EngineError> {
        if txn.record.progression.has_processed(turn) {
            log::debug!("{}: turn {} already processed", txn.record.id, turn);
            return Ok(TurnOutcome::AlreadyProcessed);
        }

        let alliance = match txn.record.alliance {
            Some(id) => Some(self.store.alliance(id)?),
            None => None,
        };
        let metrics = Calculator::new(self.rules)
            .compute(&txn.record.sources(alliance.as_ref().map(|a| &a.structures)))?;
        if self.config.log_breakdowns {
            log_breakdown(&metrics);
        }

        let record = &mut txn.record;
        let shortfall = run_upkeep(&mut record.resources, &record.specialists);
        if !shortfall.is_empty() {
            log::warn!("{}: unpaid upkeep {:?}", record.id, shortfall);
        }

        let income = metrics.income;
        let tax_paid = match &alliance {
            Some(a) => {
                let rate = a
                    .tax_rate
                    .clamp(Fixed::ZERO, Fixed::from_f32(alliance_defines::MAX_TAX_RATE));
                rate.mul_int(income.credits).floor_int().max(0)
            }
            None => 0,
        };
        record.resources.apply_clamped(&ResourceDelta {
            credits: income.credits - tax_paid,
            banked_credits: income.bank_interest,
            untrained_citizens: income.citizens,
            research_data: income.research_data,
            protoform: income.protoform,
            dark_matter: income.dark_matter,
            ..Default::default()
        });

        let progression = run_progression_tick(&mut record.progression, turn);
        let net_worth = calculate_net_worth(&record.resources, &record.structures, &record.progression);
        record.progression.net_worth = net_worth;
        record.progression.last_processed_turn = Some(turn);
        let player = record.id;

        txn.pay_treasury(tax_paid);
        let contributions = match &alliance {
            Some(a) => contributions_for(&a.operations, &income, turn),
            None => Vec::new(),
        };
        for c in &contributions {
            txn.contribute(*c, turn);
        }

        log::debug!(
            "{}: turn {} +{} credits (tax {}), +{} citizens, net worth {}",
            player,
            turn,
            income.credits - tax_paid,
            tax_paid,
            income.citizens,
            net_worth
        );

        Ok(TurnOutcome::Processed(TurnReport {
            player,
            turn,
            shortfall,
            income,
            tax_paid,
            progression,
            net_worth,
            contributions,
        }))
    }

    /// Process one player, retrying persistence conflicts. Returns the result
    /// and whether a retry was needed.
    fn process_with_retry(&self, player: PlayerId, turn: TurnNumber) -> (Result<TurnOutcome, EngineError>, bool) {
        let mut attempt = 0;
        loop {
            match self.process_turn_for_player(player, turn) {
                Err(e) if e.is_transient() && attempt < self.config.conflict_retries => {
                    attempt += 1;
                    log::warn!("{}: {} (retry {})", player, e, attempt);
                }
                result => return (result, attempt > 0),
            }
        }
    }

    #[instrument(skip(self), name = "turn_batch")]
    pub fn process_batch(&self, turn: TurnNumber) -> BatchSummary {
        let start = Instant::now();
        let ids = self.store.player_ids();

        let results: Vec<_> = if self.config.parallel_batch {
            ids.par_iter()
                .map(|&id| (id, self.process_with_retry(id, turn)))
                .collect()
        } else {
            ids.iter()
                .map(|&id| (id, self.process_with_retry(id, turn)))
                .collect()
        };

        let mut summary = BatchSummary {
            turn,
            ..Default::default()
        };
        for (player, (result, retried)) in results {
            if retried {
                summary.retried += 1;
            }
            match result {
                Ok(TurnOutcome::Processed(report)) => summary.processed.push(report),
                Ok(TurnOutcome::AlreadyProcessed) => summary.skipped.push(player),
                Err(error) => {
                    log::error!("{}: turn {} failed: {}", player, turn, error);
                    summary.failures.push(PlayerFailure { player, error });
                }
            }
        }

        summary.operations = self.advance_operations(turn);
        summary.elapsed = start.elapsed();

        log::info!(
            "Turn {}: {} processed, {} skipped, {} failed, {} operations resolved",
            turn,
            summary.processed.len(),
            summary.skipped.len(),
            summary.failures.len(),
            summary.operations.len()
        );
        summary
    }

    /// Run the operation state machine for every alliance.
    pub fn advance_operations(&self, turn: TurnNumber) -> Vec<OperationTransition> {
        let mut transitions = Vec::new();
        for id in self.store.alliance_ids() {
            match self
                .store
                .update_alliance(id, |a| Ok(operations::advance_operations(a, turn)))
            {
                Ok(mut t) => transitions.append(&mut t),
                Err(e) => log::error!("{}: operations not advanced: {}", id, e),
            }
        }
        transitions
    }
}

fn log_breakdown(metrics: &PlayerMetrics) {
    for (metric, b) in &metrics.breakdown {
        log::debug!(
            "{} {}: base {} + flat {} + alliance {} × {} | pct {} | edict {} = {}",
            metrics.player,
            metric,
            b.base,
            b.personal_flat,
            b.alliance_flat,
            b.synergy_factor,
            b.total_percent,
            b.edict_percent,
            b.value
        );
    }
}

#[cfg(test)]
#[path = "turn_tests.rs"]
mod tests;
