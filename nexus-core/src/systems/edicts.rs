//! Edict modifiers. Applied after synergy, outside the alliance pool.

use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::modifiers::{Metric, StackSet};
use crate::rules::RuleBook;
use crate::state::ActiveEdictSet;

pub fn apply_edict_bonuses(
    stacks: &mut StackSet,
    edicts: &ActiveEdictSet,
    rules: &RuleBook,
) -> Result<(), EngineError> {
    for key in &edicts.active {
        let def = rules.edict(key)?;
        let e = &def.effects;
        let targets = [
            (Metric::ResearchData, e.resource_production_percent),
            (Metric::Protoform, e.resource_production_percent),
            (Metric::DarkMatter, e.resource_production_percent),
            (Metric::Credits, e.credit_income_percent),
            (Metric::Citizens, e.citizen_growth_percent),
            (Metric::Offense, e.offense_percent),
            (Metric::Defense, e.defense_percent),
            (Metric::Spy, e.spy_percent),
            (Metric::Sentry, e.sentry_percent),
        ];
        for (metric, rate) in targets {
            stacks
                .stack(metric)
                .add_edict(&def.key, Fixed::from_f32(rate));
        }
    }
    Ok(())
}
