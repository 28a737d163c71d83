//! Alliance structure bonuses.
//!
//! Resolved from the alliance's structure levels at calculation time; nothing
//! is copied onto members. Income and resource percentages share one pool
//! that reaches every resource-income metric. Synergy scales all of them.

use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::modifiers::{Metric, SourceTier, StackSet};
use crate::rules::RuleBook;
use crate::state::AllianceStructureLevels;
use nexus_data::AllianceEffect;

pub fn apply_alliance_bonuses(
    stacks: &mut StackSet,
    levels: &AllianceStructureLevels,
    rules: &RuleBook,
) -> Result<(), EngineError> {
    for (key, level) in levels.iter() {
        let def = rules.alliance_structure(key)?;
        if level == 0 {
            continue;
        }
        for effect in def.effects {
            let percent = |rate: f32| Fixed::from_f32(rate).mul_int(level);
            match *effect {
                AllianceEffect::IncomePercent(rate) | AllianceEffect::ResourcePercent(rate) => {
                    for metric in Metric::RESOURCE_INCOME {
                        stacks
                            .stack(metric)
                            .add_percent(SourceTier::Alliance, def.key, percent(rate));
                    }
                }
                AllianceEffect::OffensePercent(rate) => {
                    stacks
                        .stack(Metric::Offense)
                        .add_percent(SourceTier::Alliance, def.key, percent(rate))
                }
                AllianceEffect::DefensePercent(rate) => {
                    stacks
                        .stack(Metric::Defense)
                        .add_percent(SourceTier::Alliance, def.key, percent(rate))
                }
                AllianceEffect::SpyPercent(rate) => {
                    stacks
                        .stack(Metric::Spy)
                        .add_percent(SourceTier::Alliance, def.key, percent(rate))
                }
                AllianceEffect::SentryPercent(rate) => {
                    stacks
                        .stack(Metric::Sentry)
                        .add_percent(SourceTier::Alliance, def.key, percent(rate))
                }
                AllianceEffect::CitizensFlat(amount) => stacks.stack(Metric::Citizens).add_flat(
                    SourceTier::Alliance,
                    def.key,
                    Fixed::from_int(amount.saturating_mul(level)),
                ),
                AllianceEffect::CreditsFlat(amount) => stacks.stack(Metric::Credits).add_flat(
                    SourceTier::Alliance,
                    def.key,
                    Fixed::from_int(amount.saturating_mul(level)),
                ),
                AllianceEffect::Synergy(rate) => {
                    for stack in stacks.iter_mut() {
                        stack.add_synergy(def.key, percent(rate));
                    }
                }
            }
        }
    }
    Ok(())
}
