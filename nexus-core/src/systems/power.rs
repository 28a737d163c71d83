//! Offense, defense, spy and sentry sources.
//!
//! Each power metric starts from its trained unit count, then adds eligible
//! equipment (`power_per_unit × units`) and structure flats, then the
//! structure upgrade and stat percentages.

use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::modifiers::{BonusStack, Metric, SourceTier, StackSet};
use crate::rules::RuleBook;
use crate::state::{ModifierSources, Stat};
use nexus_data::defines::{combat, specialists, units};
use nexus_data::{StructureKind, UnitKind};

struct PowerSource {
    metric: Metric,
    unit: UnitKind,
    per_unit: i64,
    upgrade: StructureKind,
    upgrade_rate: f32,
    stat: Stat,
}

const POWER_SOURCES: [PowerSource; 4] = [
    PowerSource {
        metric: Metric::Offense,
        unit: UnitKind::Soldier,
        per_unit: units::SOLDIER_OFFENSE,
        upgrade: StructureKind::OffenseUpgrade,
        upgrade_rate: combat::OFFENSE_PERCENT_PER_LEVEL,
        stat: Stat::Strength,
    },
    PowerSource {
        metric: Metric::Defense,
        unit: UnitKind::Guard,
        per_unit: units::GUARD_DEFENSE,
        upgrade: StructureKind::DefenseUpgrade,
        upgrade_rate: combat::DEFENSE_PERCENT_PER_LEVEL,
        stat: Stat::Constitution,
    },
    PowerSource {
        metric: Metric::Spy,
        unit: UnitKind::Spy,
        per_unit: units::SPY_POWER,
        upgrade: StructureKind::SpyUpgrade,
        upgrade_rate: combat::SPY_PERCENT_PER_LEVEL,
        stat: Stat::Dexterity,
    },
    PowerSource {
        metric: Metric::Sentry,
        unit: UnitKind::Sentry,
        per_unit: units::SENTRY_POWER,
        upgrade: StructureKind::SpyUpgrade,
        upgrade_rate: combat::SPY_PERCENT_PER_LEVEL,
        stat: Stat::Dexterity,
    },
];

/// Add every personal power source to `stacks`.
pub fn apply_power_sources(
    stacks: &mut StackSet,
    sources: &ModifierSources,
    rules: &RuleBook,
) -> Result<(), EngineError> {
    for src in &POWER_SOURCES {
        let count = sources.resources.units(src.unit);
        let stack = stacks.stack(src.metric);

        stack.add_base(
            &format!("{}s", src.unit),
            Fixed::from_int(count.saturating_mul(src.per_unit)),
        );
        apply_equipment(stack, sources, rules, src.unit, count)?;

        let level = sources.structures.level(src.upgrade);
        stack.add_percent(
            SourceTier::Structure,
            &src.upgrade.to_string(),
            Fixed::from_f32(src.upgrade_rate).mul_int(level),
        );
        stack.add_percent(
            SourceTier::Stat,
            &src.stat.to_string(),
            Fixed::from_f32(combat::STAT_PERCENT_PER_POINT).mul_int(sources.progression.stat(src.stat)),
        );
    }

    stacks.stack(Metric::Offense).add_flat(
        SourceTier::Specialist,
        "generals",
        Fixed::from_int(
            sources
                .specialists
                .generals
                .saturating_mul(specialists::GENERAL_OFFENSE),
        ),
    );

    stacks.stack(Metric::Defense).add_flat(
        SourceTier::Structure,
        &StructureKind::Fortification.to_string(),
        Fixed::from_int(
            sources
                .structures
                .level(StructureKind::Fortification)
                .saturating_mul(combat::FORTIFICATION_DEFENSE_PER_LEVEL),
        ),
    );

    Ok(())
}

/// Equipped items for `unit`. Ineligible items are recorded as gated.
fn apply_equipment(
    stack: &mut BonusStack,
    sources: &ModifierSources,
    rules: &RuleBook,
    unit: UnitKind,
    count: i64,
) -> Result<(), EngineError> {
    let armory = sources.structures.level(StructureKind::Armory);
    for equipped in sources.loadout.equipped.iter().filter(|e| e.unit == unit) {
        let def = rules.item(&equipped.item)?;
        let prerequisite_met = def.requires.is_none_or(|req| sources.loadout.owns(req));
        if armory < def.armory_level || !prerequisite_met {
            log::debug!(
                "{}: {} gated (armory {}/{}, prerequisite met: {})",
                sources.player,
                def.key,
                armory,
                def.armory_level,
                prerequisite_met
            );
            stack.add_gated(SourceTier::Equipment, def.key);
            continue;
        }
        stack.add_flat(
            SourceTier::Equipment,
            def.key,
            Fixed::from_int(count.saturating_mul(def.power_per_unit)),
        );
    }
    Ok(())
}
