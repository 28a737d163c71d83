//! Per-turn income sources: credits, citizens, research, protoform, dark matter.

use crate::fixed::Fixed;
use crate::modifiers::{Metric, SourceTier, StackSet};
use crate::state::{ModifierSources, ResourceLedger, Stat};
use nexus_data::defines::{economy, population};
use nexus_data::StructureKind;

/// Add every personal income source to `stacks`.
pub fn apply_income_sources(stacks: &mut StackSet, sources: &ModifierSources) {
    let workers = sources.resources.workers;
    let economy_level = sources.structures.level(StructureKind::Economy);

    let credits = stacks.stack(Metric::Credits);
    credits.add_base("stipend", Fixed::from_int(economy::BASE_CREDITS_PER_TURN));
    credits.add_base(
        "workers",
        Fixed::from_int(workers.saturating_mul(economy::CREDITS_PER_WORKER)),
    );
    credits.add_percent(
        SourceTier::Structure,
        &StructureKind::Economy.to_string(),
        Fixed::from_f32(economy::ECONOMY_PERCENT_PER_LEVEL).mul_int(economy_level),
    );
    credits.add_percent(
        SourceTier::Stat,
        &Stat::Wealth.to_string(),
        Fixed::from_f32(economy::WEALTH_PERCENT_PER_POINT).mul_int(sources.progression.wealth),
    );

    let citizens = stacks.stack(Metric::Citizens);
    citizens.add_base("growth", Fixed::from_int(population::BASE_CITIZENS_PER_TURN));
    citizens.add_flat(
        SourceTier::Structure,
        &StructureKind::Population.to_string(),
        Fixed::from_int(
            sources
                .structures
                .level(StructureKind::Population)
                .saturating_mul(population::CITIZENS_PER_POPULATION_LEVEL),
        ),
    );

    stacks.stack(Metric::ResearchData).add_base(
        "scientists",
        Fixed::from_int(
            sources
                .specialists
                .scientists
                .saturating_mul(economy::RESEARCH_PER_SCIENTIST),
        ),
    );

    stacks.stack(Metric::Protoform).add_base(
        "workers",
        Fixed::from_f32(economy::PROTOFORM_PER_WORKER).mul_int(workers),
    );

    stacks.stack(Metric::DarkMatter).add_base(
        &StructureKind::Economy.to_string(),
        Fixed::from_f32(economy::DARK_MATTER_PER_ECONOMY_LEVEL).mul_int(economy_level),
    );
}

/// Interest on banked credits. Takes no bonuses.
pub fn bank_interest(resources: &ResourceLedger) -> i64 {
    Fixed::from_f32(economy::BANK_INTEREST_RATE)
        .mul_int(resources.banked_credits)
        .floor_int()
        .max(0)
}
