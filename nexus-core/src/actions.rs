//! Player actions.
//!
//! Every command runs inside one store transaction for the acting player and
//! charges its cost strictly: the player either pays in full or nothing
//! changes. Attacks and spy missions commit the target's losses first, then
//! the acting player, then append an immutable report.

use crate::calculator::{Calculator, PlayerMetrics};
use crate::error::EngineError;
use crate::fixed::Fixed;
use crate::input::Command;
use crate::rules::RuleBook;
use crate::state::{
    PlayerId, PlayerRecord, Resource, ResourceDelta, Shortfall, Stat, TurnNumber,
};
use crate::store::{PlayerStore, PlayerTxn, Report};
use crate::systems::progression::grant_experience;
use crate::systems::{
    resolve_battle, resolve_espionage, BattleReport, Combatant, EspionageReport, Mission,
};
use nexus_data::defines::{economy, espionage, units};
use nexus_data::{ItemDef, SpecialistKind, StructureKind, UnitKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{item} requires owning {required}")]
    MissingPrerequisite { item: String, required: String },
    #[error("{item} requires armory level {required}, current level {current}")]
    ArmoryTooLow {
        item: String,
        required: i64,
        current: i64,
    },
    #[error("No free edict slots ({used}/{slots} in use)")]
    NoEdictSlots { used: usize, slots: i64 },
    #[error("Edict {0} is already active")]
    EdictAlreadyActive(String),
    #[error("Edict {0} is not active")]
    EdictNotActive(String),
    #[error("No deposit charges left")]
    NoDepositCharges,
    #[error("Not enough unallocated points: requested {requested}, available {available}")]
    NoUnallocatedPoints { requested: i64, available: i64 },
    #[error("{0} is already at max level")]
    MaxLevelReached(StructureKind),
    #[error("{0} is already owned")]
    AlreadyOwned(String),
    #[error("{0} is not owned")]
    NotOwned(String),
}

/// Price after the charisma discount (1% per point, capped). Rounds in the
/// house's favour.
pub fn discounted_cost(cost: i64, charisma: i64) -> i64 {
    let rate = Fixed::from_f32(economy::CHARISMA_DISCOUNT_PER_POINT)
        .mul_int(charisma.max(0))
        .min(Fixed::from_f32(economy::MAX_CHARISMA_DISCOUNT));
    cost - rate.mul_int(cost).floor_int()
}

fn charge(record: &mut PlayerRecord, cost: i64) -> Result<(), EngineError> {
    let price = discounted_cost(cost, record.progression.charisma);
    record.resources.try_apply(&ResourceDelta::credits(-price))
}

fn positive(what: &str, value: i64) -> Result<(), EngineError> {
    if value <= 0 {
        return Err(EngineError::invalid(format!(
            "{what} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Execute one command for `player`.
pub fn execute_command<S: PlayerStore>(
    store: &S,
    rules: &RuleBook,
    player: PlayerId,
    command: &Command,
    turn: TurnNumber,
) -> Result<(), ActionError> {
    log::debug!("{}: {:?}", player, command);
    match command {
        Command::Attack {
            target,
            attack_turns,
        } => commit_battle(store, rules, player, *target, *attack_turns, turn).map(|_| ()),
        Command::Spy {
            target,
            mission,
            spies,
        } => commit_espionage(store, rules, player, *target, *mission, *spies, turn).map(|_| ()),
        _ => store.transact(player, |txn| apply_command(&mut txn.record, rules, command)),
    }
}

fn apply_command(record: &mut PlayerRecord, rules: &RuleBook, command: &Command) -> Result<(), ActionError> {
    match command {
        Command::UpgradeStructure { structure } => upgrade_structure(record, *structure),
        Command::TrainUnits { unit, count } => train_units(record, *unit, *count),
        Command::HireSpecialist { kind, count } => hire_specialist(record, *kind, *count),
        Command::DepositCredits { amount } => deposit_credits(record, *amount),
        Command::BuyItem { item } => buy_item(record, rules.item(item)?),
        Command::EquipItem { item } => equip_item(record, rules.item(item)?),
        Command::ActivateEdict { edict } => activate_edict(record, rules, edict),
        Command::RevokeEdict { edict } => revoke_edict(record, edict),
        Command::AllocateStat { stat, points } => allocate_stat(record, *stat, *points),
        Command::Attack { .. } | Command::Spy { .. } => Err(EngineError::invalid(
            "Hostile commands need both players",
        )
        .into()),
    }
}

pub fn upgrade_structure(record: &mut PlayerRecord, kind: StructureKind) -> Result<(), ActionError> {
    let current = record.structures.level(kind);
    if current >= kind.max_level() {
        return Err(ActionError::MaxLevelReached(kind));
    }
    charge(record, kind.upgrade_cost(current))?;
    record.structures.set(kind, current + 1);
    log::info!("{}: {} upgraded to level {}", record.id, kind, current + 1);
    Ok(())
}

pub fn train_units(record: &mut PlayerRecord, unit: UnitKind, count: i64) -> Result<(), ActionError> {
    positive("Unit count", count)?;
    let price = discounted_cost(
        count.saturating_mul(units::TRAINING_COST),
        record.progression.charisma,
    );
    let mut delta = ResourceDelta::units(unit, count);
    delta.untrained_citizens = -count;
    delta.credits = -price;
    record.resources.try_apply(&delta)?;
    Ok(())
}

pub fn hire_specialist(
    record: &mut PlayerRecord,
    kind: SpecialistKind,
    count: i64,
) -> Result<(), ActionError> {
    positive("Specialist count", count)?;
    charge(record, kind.hire_cost().saturating_mul(count))?;
    *record.specialists.count_mut(kind) += count;
    Ok(())
}

/// Move credits into the bank. Uses one deposit charge; at most a fixed share
/// of on-hand credits per deposit.
pub fn deposit_credits(record: &mut PlayerRecord, amount: i64) -> Result<(), ActionError> {
    positive("Deposit", amount)?;
    if record.progression.deposit_charges <= 0 {
        return Err(ActionError::NoDepositCharges);
    }
    let limit = Fixed::from_f32(economy::MAX_DEPOSIT_FRACTION)
        .mul_int(record.resources.credits)
        .floor_int();
    if amount > limit {
        return Err(EngineError::invalid(format!(
            "Deposit of {amount} exceeds the limit of {limit}"
        ))
        .into());
    }
    record.resources.try_apply(&ResourceDelta {
        credits: -amount,
        banked_credits: amount,
        ..Default::default()
    })?;
    record.progression.deposit_charges -= 1;
    Ok(())
}

fn check_item_eligible(record: &PlayerRecord, def: &ItemDef) -> Result<(), ActionError> {
    let armory = record.structures.level(StructureKind::Armory);
    if armory < def.armory_level {
        return Err(ActionError::ArmoryTooLow {
            item: def.key.to_string(),
            required: def.armory_level,
            current: armory,
        });
    }
    if let Some(required) = def.requires {
        if !record.loadout.owns(required) {
            return Err(ActionError::MissingPrerequisite {
                item: def.key.to_string(),
                required: required.to_string(),
            });
        }
    }
    Ok(())
}

pub fn buy_item(record: &mut PlayerRecord, def: &ItemDef) -> Result<(), ActionError> {
    if record.loadout.owns(def.key) {
        return Err(ActionError::AlreadyOwned(def.key.to_string()));
    }
    check_item_eligible(record, def)?;
    charge(record, def.cost)?;
    record.loadout.owned.insert(def.key.to_string());
    Ok(())
}

pub fn equip_item(record: &mut PlayerRecord, def: &ItemDef) -> Result<(), ActionError> {
    if !record.loadout.owns(def.key) {
        return Err(ActionError::NotOwned(def.key.to_string()));
    }
    record.loadout.equip(def.unit, def.category, def.key);
    Ok(())
}

pub fn activate_edict(record: &mut PlayerRecord, rules: &RuleBook, key: &str) -> Result<(), ActionError> {
    rules.edict(key)?;
    if record.edicts.is_active(key) {
        return Err(ActionError::EdictAlreadyActive(key.to_string()));
    }
    let slots = record.structures.level(StructureKind::Embassy);
    let used = record.edicts.len();
    if used as i64 >= slots {
        return Err(ActionError::NoEdictSlots { used, slots });
    }
    record.edicts.active.push(key.to_string());
    Ok(())
}

pub fn revoke_edict(record: &mut PlayerRecord, key: &str) -> Result<(), ActionError> {
    if !record.edicts.is_active(key) {
        return Err(ActionError::EdictNotActive(key.to_string()));
    }
    record.edicts.active.retain(|k| k != key);
    Ok(())
}

pub fn allocate_stat(record: &mut PlayerRecord, stat: Stat, points: i64) -> Result<(), ActionError> {
    positive("Points", points)?;
    let available = record.progression.unallocated_points;
    if available < points {
        return Err(ActionError::NoUnallocatedPoints {
            requested: points,
            available,
        });
    }
    record.progression.unallocated_points -= points;
    *record.progression.stat_mut(stat) += points;
    Ok(())
}

fn metrics_for<S: PlayerStore>(
    store: &S,
    rules: &RuleBook,
    record: &PlayerRecord,
) -> Result<PlayerMetrics, EngineError> {
    let alliance = match record.alliance {
        Some(id) => Some(store.alliance(id)?),
        None => None,
    };
    Calculator::new(rules).compute(&record.sources(alliance.as_ref().map(|a| &a.structures)))
}

/// Extra attempts for a hostile commit that hits a concurrent write.
const COMMIT_RETRIES: u32 = 1;

fn transact_retrying<S, T, F>(store: &S, player: PlayerId, f: F) -> Result<T, EngineError>
where
    S: PlayerStore,
    F: Fn(&mut PlayerTxn) -> Result<T, EngineError>,
{
    let mut attempt = 0;
    loop {
        match store.transact(player, &f) {
            Err(e) if e.is_transient() && attempt < COMMIT_RETRIES => {
                attempt += 1;
                log::debug!("{}: retrying after {}", player, e);
            }
            result => return result,
        }
    }
}

/// Amount of a clamped deduction that could not be taken.
fn unpaid(shortfall: &Shortfall, resource: Resource) -> i64 {
    shortfall.get(&resource).map_or(0, |f| f.floor_int())
}

/// Give back losses already committed to `player` after the other side of
/// a hostile action failed.
fn refund<S: PlayerStore>(store: &S, player: PlayerId, delta: &ResourceDelta) {
    let refunded = transact_retrying(store, player, |txn| {
        txn.record.resources.apply_clamped(delta);
        Ok(())
    });
    if let Err(e) = refunded {
        log::error!("{}: losses {:?} not refunded: {}", player, delta, e);
    }
}

/// Resolve an attack from current snapshots and commit it to both players.
///
/// The defender is charged first and the attacker is credited only the
/// plunder actually taken. If the attacker's side then fails, the
/// defender's losses are refunded and no report is written.
pub fn commit_battle<S: PlayerStore>(
    store: &S,
    rules: &RuleBook,
    attacker: PlayerId,
    defender: PlayerId,
    attack_turns: i64,
    turn: TurnNumber,
) -> Result<BattleReport, ActionError> {
    let a = store.player(attacker)?;
    let d = store.player(defender)?;
    let (am, dm) = (metrics_for(store, rules, &a)?, metrics_for(store, rules, &d)?);
    let mut report = resolve_battle(
        Combatant {
            record: &a,
            metrics: &am,
        },
        Combatant {
            record: &d,
            metrics: &dm,
        },
        attack_turns,
        turn,
    )?;

    let (guards_lost, plunder) = transact_retrying(store, defender, |txn| {
        let shortfall = txn.record.resources.apply_clamped(&ResourceDelta {
            guards: -report.defender_guards_lost,
            credits: -report.plunder,
            ..Default::default()
        });
        if !shortfall.is_empty() {
            log::warn!("{}: battle losses clamped {:?}", defender, shortfall);
        }
        Ok((
            report.defender_guards_lost - unpaid(&shortfall, Resource::Guards),
            report.plunder - unpaid(&shortfall, Resource::Credits),
        ))
    })?;
    report.defender_guards_lost = guards_lost;
    report.plunder = plunder;

    let credited = transact_retrying(store, attacker, |txn| {
        let p = &mut txn.record.progression;
        if p.attack_turns < report.attack_turns {
            return Err(EngineError::insufficient(
                Resource::AttackTurns,
                report.attack_turns,
                p.attack_turns,
            ));
        }
        p.attack_turns -= report.attack_turns;
        p.war_prestige += report.war_prestige;
        grant_experience(p, report.experience);
        txn.record.resources.apply_clamped(&ResourceDelta {
            soldiers: -report.attacker_soldiers_lost,
            credits: report.plunder,
            ..Default::default()
        });
        Ok(())
    });
    if let Err(e) = credited {
        refund(
            store,
            defender,
            &ResourceDelta {
                guards: report.defender_guards_lost,
                credits: report.plunder,
                ..Default::default()
            },
        );
        return Err(e.into());
    }

    store.append_report(Report::Battle(report.clone()))?;
    Ok(report)
}

/// Resolve a spy mission from current snapshots and commit it.
///
/// Same ordering as [`commit_battle`]: the target's losses are committed
/// first and refunded if the spy's side fails.
pub fn commit_espionage<S: PlayerStore>(
    store: &S,
    rules: &RuleBook,
    spy: PlayerId,
    target: PlayerId,
    mission: Mission,
    spies_sent: i64,
    turn: TurnNumber,
) -> Result<EspionageReport, ActionError> {
    let s = store.player(spy)?;
    let t = store.player(target)?;
    let (sm, tm) = (metrics_for(store, rules, &s)?, metrics_for(store, rules, &t)?);
    let mut report = resolve_espionage(
        Combatant {
            record: &s,
            metrics: &sm,
        },
        Combatant {
            record: &t,
            metrics: &tm,
        },
        mission,
        spies_sent,
        turn,
    )?;

    if report.workers_killed > 0 {
        let killed = transact_retrying(store, target, |txn| {
            let shortfall = txn.record.resources.apply_clamped(&ResourceDelta {
                workers: -report.workers_killed,
                ..Default::default()
            });
            Ok(report.workers_killed - unpaid(&shortfall, Resource::Workers))
        })?;
        report.workers_killed = killed;
    }

    let charged = transact_retrying(store, spy, |txn| {
        let p = &mut txn.record.progression;
        if p.energy < espionage::MISSION_ENERGY_COST {
            return Err(EngineError::insufficient(
                Resource::Energy,
                espionage::MISSION_ENERGY_COST,
                p.energy,
            ));
        }
        p.energy -= espionage::MISSION_ENERGY_COST;
        txn.record.resources.apply_clamped(&ResourceDelta {
            spies: -report.spies_lost,
            ..Default::default()
        });
        Ok(())
    });
    if let Err(e) = charged {
        if report.workers_killed > 0 {
            refund(
                store,
                target,
                &ResourceDelta {
                    workers: report.workers_killed,
                    ..Default::default()
                },
            );
        }
        return Err(e.into());
    }

    store.append_report(Report::Espionage(report.clone()))?;
    Ok(report)
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
