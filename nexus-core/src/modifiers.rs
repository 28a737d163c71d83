//! Bonus stacking.
//!
//! Every derived metric is resolved through a [`BonusStack`] in a fixed
//! order:
//!
//! ```text
//! base
//!  + personal flat (structures, equipment, specialists)
//!  + alliance flat × synergy
//!  × (1 + personal% + alliance% × synergy)
//!  × (1 + edict%)
//! ```
//!
//! Percentages within a tier are summed, never compounded. The synergy
//! factor `1 + Σ rate × level` touches only alliance-sourced bonuses, and
//! edicts sit outside it.

use crate::fixed::Fixed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, IntoEnumIterator};

/// A derived quantity the calculator produces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    Offense,
    Defense,
    Spy,
    Sentry,
    Credits,
    Citizens,
    ResearchData,
    Protoform,
    DarkMatter,
}

impl Metric {
    /// Income metrics that share the alliance income/resource pool.
    pub const RESOURCE_INCOME: [Metric; 4] = [
        Metric::Credits,
        Metric::ResearchData,
        Metric::Protoform,
        Metric::DarkMatter,
    ];

    /// Discrete metrics are floored; protoform and dark matter keep full precision.
    pub fn is_discrete(self) -> bool {
        !matches!(self, Metric::Protoform | Metric::DarkMatter)
    }
}

/// Where a contribution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceTier {
    Base,
    Structure,
    Stat,
    Equipment,
    Specialist,
    Alliance,
    Edict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BonusKind {
    Base,
    Flat,
    Percent,
    Synergy,
    /// Equipped but ineligible; contributes nothing.
    Gated,
}

/// One named line of a breakdown. Alliance values are recorded before synergy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub tier: SourceTier,
    pub kind: BonusKind,
    pub label: String,
    pub value: Fixed,
}

/// Accumulates the bonuses for one metric.
#[derive(Debug, Clone)]
pub struct BonusStack {
    metric: Metric,
    base: Fixed,
    personal_flat: Fixed,
    alliance_flat: Fixed,
    personal_percent: Fixed,
    alliance_percent: Fixed,
    synergy: Fixed,
    edict_percent: Fixed,
    contributions: Vec<Contribution>,
}

impl BonusStack {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            base: Fixed::ZERO,
            personal_flat: Fixed::ZERO,
            alliance_flat: Fixed::ZERO,
            personal_percent: Fixed::ZERO,
            alliance_percent: Fixed::ZERO,
            synergy: Fixed::ZERO,
            edict_percent: Fixed::ZERO,
            contributions: Vec::new(),
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn record(&mut self, tier: SourceTier, kind: BonusKind, label: &str, value: Fixed) {
        self.contributions.push(Contribution {
            tier,
            kind,
            label: label.to_string(),
            value,
        });
    }

    /// Step 1. Zero-valued lines are still recorded so the breakdown shows them.
    pub fn add_base(&mut self, label: &str, value: Fixed) {
        self.base += value;
        self.record(SourceTier::Base, BonusKind::Base, label, value);
    }

    /// Steps 2 and 3. Alliance-tier flats go to the synergy-scaled pool.
    pub fn add_flat(&mut self, tier: SourceTier, label: &str, value: Fixed) {
        if value == Fixed::ZERO {
            return;
        }
        if tier == SourceTier::Alliance {
            self.alliance_flat += value;
        } else {
            self.personal_flat += value;
        }
        self.record(tier, BonusKind::Flat, label, value);
    }

    /// Step 4. Alliance-tier percentages go to the synergy-scaled pool;
    /// edict percentages must use [`BonusStack::add_edict`].
    pub fn add_percent(&mut self, tier: SourceTier, label: &str, rate: Fixed) {
        if rate == Fixed::ZERO {
            return;
        }
        match tier {
            SourceTier::Alliance => self.alliance_percent += rate,
            SourceTier::Edict => self.edict_percent += rate,
            _ => self.personal_percent += rate,
        }
        self.record(tier, BonusKind::Percent, label, rate);
    }

    /// Step 5.
    pub fn add_synergy(&mut self, label: &str, rate: Fixed) {
        if rate == Fixed::ZERO {
            return;
        }
        self.synergy += rate;
        self.record(SourceTier::Alliance, BonusKind::Synergy, label, rate);
    }

    /// Step 6.
    pub fn add_edict(&mut self, label: &str, rate: Fixed) {
        self.add_percent(SourceTier::Edict, label, rate);
    }

    pub fn add_gated(&mut self, tier: SourceTier, label: &str) {
        self.record(tier, BonusKind::Gated, label, Fixed::ZERO);
    }

    /// Run steps 1-7 and produce the breakdown.
    pub fn resolve(self) -> MetricBreakdown {
        let synergy_factor = Fixed::ONE + self.synergy;
        let effective_alliance_flat = self.alliance_flat * synergy_factor;
        let effective_alliance_percent = self.alliance_percent * synergy_factor;

        let flat_total = self.base + self.personal_flat + effective_alliance_flat;
        let total_percent = self.personal_percent + effective_alliance_percent;
        let before_edicts = flat_total * (Fixed::ONE + total_percent);
        let value = (before_edicts * (Fixed::ONE + self.edict_percent)).non_negative();

        MetricBreakdown {
            metric: self.metric,
            base: self.base,
            personal_flat: self.personal_flat,
            alliance_flat: self.alliance_flat,
            personal_percent: self.personal_percent,
            alliance_percent: self.alliance_percent,
            synergy_factor,
            effective_alliance_flat,
            effective_alliance_percent,
            total_percent,
            edict_percent: self.edict_percent,
            value,
            contributions: self.contributions,
        }
    }
}

/// Resolved stack for one metric, kept for display and auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBreakdown {
    pub metric: Metric,
    pub base: Fixed,
    pub personal_flat: Fixed,
    /// Alliance flat before synergy.
    pub alliance_flat: Fixed,
    pub personal_percent: Fixed,
    /// Alliance percent before synergy.
    pub alliance_percent: Fixed,
    pub synergy_factor: Fixed,
    pub effective_alliance_flat: Fixed,
    pub effective_alliance_percent: Fixed,
    /// Personal plus effective alliance percent.
    pub total_percent: Fixed,
    pub edict_percent: Fixed,
    /// Exact result, never negative.
    pub value: Fixed,
    pub contributions: Vec<Contribution>,
}

impl MetricBreakdown {
    /// Integer result. Floors, so rounding never creates resources.
    pub fn floored(&self) -> i64 {
        self.value.floor_int()
    }
}

/// Breakdown for every metric of one calculation.
pub type BonusBreakdown = BTreeMap<Metric, MetricBreakdown>;

/// One [`BonusStack`] per metric.
#[derive(Debug, Clone)]
pub struct StackSet {
    stacks: BTreeMap<Metric, BonusStack>,
}

impl Default for StackSet {
    fn default() -> Self {
        Self::new()
    }
}

impl StackSet {
    pub fn new() -> Self {
        Self {
            stacks: Metric::iter().map(|m| (m, BonusStack::new(m))).collect(),
        }
    }

    pub fn stack(&mut self, metric: Metric) -> &mut BonusStack {
        self.stacks
            .entry(metric)
            .or_insert_with(|| BonusStack::new(metric))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BonusStack> {
        self.stacks.values_mut()
    }

    pub fn resolve(self) -> BonusBreakdown {
        self.stacks
            .into_iter()
            .map(|(metric, stack)| (metric, stack.resolve()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(v: f32) -> Fixed {
        Fixed::from_f32(v)
    }

    #[test]
    fn test_percentages_within_tier_add() {
        let mut stack = BonusStack::new(Metric::Credits);
        stack.add_base("workers", Fixed::from_int(1000));
        stack.add_percent(SourceTier::Alliance, "command_nexus", pct(0.05));
        stack.add_percent(SourceTier::Alliance, "research_hub", pct(0.10));
        let b = stack.resolve();

        assert_eq!(b.alliance_percent, pct(0.15));
        assert_eq!(b.value, Fixed::from_int(1150));
    }

    #[test]
    fn test_synergy_scales_only_alliance_pools() {
        let mut stack = BonusStack::new(Metric::Offense);
        stack.add_base("soldiers", Fixed::from_int(100));
        stack.add_flat(SourceTier::Equipment, "pulse_rifle", Fixed::from_int(50));
        stack.add_flat(SourceTier::Alliance, "habitat", Fixed::from_int(5));
        stack.add_percent(SourceTier::Structure, "offense_upgrade", pct(0.10));
        stack.add_percent(SourceTier::Alliance, "command_nexus", pct(0.05));
        stack.add_synergy("warlords_throne", pct(0.60));
        let b = stack.resolve();

        assert_eq!(b.synergy_factor, Fixed::from_raw(16000));
        assert_eq!(b.effective_alliance_flat, Fixed::from_int(8));
        assert_eq!(b.effective_alliance_percent, pct(0.08));
        assert_eq!(b.personal_percent, pct(0.10));
        assert_eq!(b.personal_flat, Fixed::from_int(50));
        // (100 + 50 + 8) × 1.18
        assert_eq!(b.value, Fixed::from_raw(1_864_400));
        assert_eq!(b.floored(), 186);
    }

    #[test]
    fn test_edicts_apply_after_synergy() {
        let mut stack = BonusStack::new(Metric::DarkMatter);
        stack.add_base("economy", Fixed::from_int(2));
        stack.add_percent(SourceTier::Alliance, "research_hub", pct(0.10));
        stack.add_synergy("throne", pct(0.60));
        stack.add_edict("industrial_mandate", pct(0.20));
        let b = stack.resolve();

        // 2 × 1.16 × 1.20
        assert_eq!(b.value, Fixed::from_raw(27_840));
        assert_eq!(b.edict_percent, pct(0.20));
    }

    #[test]
    fn test_negative_result_clamps_to_zero() {
        let mut stack = BonusStack::new(Metric::Credits);
        stack.add_base("base", Fixed::from_int(10));
        stack.add_percent(SourceTier::Stat, "curse", pct(-2.0));
        assert_eq!(stack.resolve().value, Fixed::ZERO);
    }

    #[test]
    fn test_zero_bonuses_not_recorded_but_gated_are() {
        let mut stack = BonusStack::new(Metric::Spy);
        stack.add_flat(SourceTier::Equipment, "nothing", Fixed::ZERO);
        stack.add_gated(SourceTier::Equipment, "neural_scrambler");
        let b = stack.resolve();
        assert_eq!(b.contributions.len(), 1);
        assert_eq!(b.contributions[0].kind, BonusKind::Gated);
    }

    #[test]
    fn test_stack_set_covers_every_metric() {
        let mut set = StackSet::new();
        set.stack(Metric::Citizens)
            .add_base("base", Fixed::from_int(3));
        let breakdown = set.resolve();
        assert_eq!(breakdown.len(), Metric::iter().count());
        assert_eq!(breakdown[&Metric::Citizens].floored(), 3);
        assert_eq!(breakdown[&Metric::Offense].value, Fixed::ZERO);
    }

    #[test]
    fn test_discrete_metrics() {
        assert!(Metric::Credits.is_discrete());
        assert!(Metric::Offense.is_discrete());
        assert!(!Metric::DarkMatter.is_discrete());
        assert!(!Metric::Protoform.is_discrete());
    }
}
