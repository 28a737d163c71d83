//! Power & economy calculator.
//!
//! Turns a [`ModifierSources`] snapshot into [`PlayerMetrics`]: the four power
//! values, per-turn income and a breakdown of every contribution. Pure and
//! side-effect free. Malformed inputs fail with
//! [`EngineError::InvalidInput`]; nothing is silently zeroed.
//!
//! Memoisation is opt-in through a caller-owned [`MetricsCache`], which never
//! invalidates itself.

use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::modifiers::{BonusBreakdown, Metric, StackSet};
use crate::rules::RuleBook;
use crate::state::{ModifierSources, PlayerId, Stat};
use crate::systems::{
    apply_alliance_bonuses, apply_edict_bonuses, apply_income_sources, apply_power_sources,
    bank_interest,
};
use nexus_data::defines::alliance as alliance_defines;
use nexus_data::StructureKind;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashSet};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PowerReport {
    pub offense: i64,
    pub defense: i64,
    pub spy: i64,
    pub sentry: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IncomeReport {
    pub credits: i64,
    pub citizens: i64,
    pub research_data: i64,
    pub protoform: Fixed,
    pub dark_matter: Fixed,
    pub bank_interest: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMetrics {
    pub player: PlayerId,
    pub power: PowerReport,
    pub income: IncomeReport,
    pub breakdown: BonusBreakdown,
}

/// Stateless calculator over a [`RuleBook`].
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'r> {
    rules: &'r RuleBook,
}

impl<'r> Calculator<'r> {
    pub fn new(rules: &'r RuleBook) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r RuleBook {
        self.rules
    }

    #[instrument(skip_all, name = "compute_metrics", fields(player = %sources.player))]
    pub fn compute(&self, sources: &ModifierSources) -> Result<PlayerMetrics, EngineError> {
        validate(sources, self.rules)?;

        let mut stacks = StackSet::new();
        apply_power_sources(&mut stacks, sources, self.rules)?;
        apply_income_sources(&mut stacks, sources);
        if let Some(levels) = sources.alliance {
            apply_alliance_bonuses(&mut stacks, levels, self.rules)?;
        }
        apply_edict_bonuses(&mut stacks, sources.edicts, self.rules)?;

        let breakdown = stacks.resolve();
        let floored = |m: Metric| breakdown.get(&m).map_or(0, |b| b.floored());
        let exact = |m: Metric| breakdown.get(&m).map_or(Fixed::ZERO, |b| b.value);

        let power = PowerReport {
            offense: floored(Metric::Offense),
            defense: floored(Metric::Defense),
            spy: floored(Metric::Spy),
            sentry: floored(Metric::Sentry),
        };
        let income = IncomeReport {
            credits: floored(Metric::Credits),
            citizens: floored(Metric::Citizens),
            research_data: floored(Metric::ResearchData),
            protoform: exact(Metric::Protoform),
            dark_matter: exact(Metric::DarkMatter),
            bank_interest: bank_interest(sources.resources),
        };

        Ok(PlayerMetrics {
            player: sources.player,
            power,
            income,
            breakdown,
        })
    }

    /// Return the cached metrics for `sources.player`, computing them on a miss.
    ///
    /// A hit ignores `sources` entirely; call [`MetricsCache::invalidate`] or
    /// [`MetricsCache::clear`] once the player's state has changed.
    pub fn compute_cached<'c>(
        &self,
        sources: &ModifierSources,
        cache: &'c mut MetricsCache,
    ) -> Result<&'c PlayerMetrics, EngineError> {
        match cache.entries.entry(sources.player) {
            Entry::Occupied(entry) => {
                cache.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let metrics = self.compute(sources)?;
                cache.misses += 1;
                Ok(entry.insert(metrics))
            }
        }
    }
}

/// Caller-owned memo of computed metrics, keyed by player.
#[derive(Debug, Default)]
pub struct MetricsCache {
    entries: FxHashMap<PlayerId, PlayerMetrics>,
    hits: u64,
    misses: u64,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn invalidate(&mut self, player: PlayerId) -> bool {
        self.entries.remove(&player).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Reject malformed sources before any stacking happens.
pub fn validate(sources: &ModifierSources, rules: &RuleBook) -> Result<(), EngineError> {
    let player = sources.player;
    sources.resources.validate()?;

    for (kind, level) in sources.structures.iter() {
        if !(0..=kind.max_level()).contains(&level) {
            return Err(EngineError::invalid(format!(
                "{player}: {kind} level {level} outside 0..={}",
                kind.max_level()
            )));
        }
    }

    if let Some(levels) = sources.alliance {
        for (key, level) in levels.iter() {
            rules.alliance_structure(key)?;
            if !(0..=alliance_defines::MAX_STRUCTURE_LEVEL).contains(&level) {
                return Err(EngineError::invalid(format!(
                    "Alliance structure {key} level {level} outside 0..={}",
                    alliance_defines::MAX_STRUCTURE_LEVEL
                )));
            }
        }
    }

    let mut seen = BTreeSet::new();
    for key in &sources.edicts.active {
        rules.edict(key)?;
        if !seen.insert(key.as_str()) {
            return Err(EngineError::invalid(format!(
                "{player}: edict {key} active twice"
            )));
        }
    }
    let slots = sources.structures.level(StructureKind::Embassy);
    if sources.edicts.len() as i64 > slots {
        return Err(EngineError::invalid(format!(
            "{player}: {} edicts active but only {slots} embassy slots",
            sources.edicts.len()
        )));
    }

    for key in &sources.loadout.owned {
        rules.item(key)?;
    }
    let mut slots_used = HashSet::new();
    for equipped in &sources.loadout.equipped {
        let def = rules.item(&equipped.item)?;
        if def.unit != equipped.unit || def.category != equipped.category {
            return Err(EngineError::invalid(format!(
                "{player}: {} is a {} {}, not a {} {}",
                def.key, def.unit, def.category, equipped.unit, equipped.category
            )));
        }
        if !slots_used.insert((equipped.unit, equipped.category)) {
            return Err(EngineError::invalid(format!(
                "{player}: two items in the {} {} slot",
                equipped.unit, equipped.category
            )));
        }
        if !sources.loadout.owns(&equipped.item) {
            return Err(EngineError::invalid(format!(
                "{player}: {} equipped but not owned",
                equipped.item
            )));
        }
    }

    let progression = sources.progression;
    for stat in [
        Stat::Strength,
        Stat::Constitution,
        Stat::Wealth,
        Stat::Dexterity,
        Stat::Charisma,
    ] {
        if progression.stat(stat) < 0 {
            return Err(EngineError::invalid(format!(
                "{player}: negative {stat} {}",
                progression.stat(stat)
            )));
        }
    }
    if progression.level < 1 || progression.unallocated_points < 0 {
        return Err(EngineError::invalid(format!(
            "{player}: invalid level {} / points {}",
            progression.level, progression.unallocated_points
        )));
    }

    if sources.specialists.generals < 0 || sources.specialists.scientists < 0 {
        return Err(EngineError::invalid(format!(
            "{player}: negative specialist count"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "calculator_tests.rs"]
mod tests;
