//! Modifier-source snapshots and player/alliance records.
//!
//! These are plain value objects as delivered by storage. The calculator
//! borrows them through [`ModifierSources`] and never mutates them; the turn
//! processor mutates a transaction-local copy.

use crate::error::EngineError;
use crate::fixed::Fixed;
use nexus_data::defines::alliance as alliance_defines;
use nexus_data::{ItemCategory, SpecialistKind, StructureKind, UnitKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::Display;

pub type TurnNumber = u64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AllianceId(pub u64);

impl std::fmt::Display for AllianceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Every balance or spendable counter an action can run short of.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Credits,
    BankedCredits,
    Gemstones,
    UntrainedCitizens,
    Workers,
    Soldiers,
    Guards,
    Spies,
    Sentries,
    ResearchData,
    Protoform,
    NaquadahCrystals,
    DarkMatter,
    Energy,
    AttackTurns,
    DepositCharges,
    StatPoints,
}

impl Resource {
    /// Ledger field holding trained units of `unit`.
    pub fn for_unit(unit: UnitKind) -> Resource {
        match unit {
            UnitKind::Worker => Resource::Workers,
            UnitKind::Soldier => Resource::Soldiers,
            UnitKind::Guard => Resource::Guards,
            UnitKind::Spy => Resource::Spies,
            UnitKind::Sentry => Resource::Sentries,
        }
    }
}

/// Player balances. No field is ever observably negative.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLedger {
    pub credits: i64,
    pub banked_credits: i64,
    pub gemstones: i64,
    pub untrained_citizens: i64,
    pub workers: i64,
    pub soldiers: i64,
    pub guards: i64,
    pub spies: i64,
    pub sentries: i64,
    pub research_data: i64,
    pub protoform: Fixed,
    pub naquadah_crystals: Fixed,
    pub dark_matter: Fixed,
}

/// Relative change to a [`ResourceLedger`]. Same shape, signed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDelta {
    pub credits: i64,
    pub banked_credits: i64,
    pub gemstones: i64,
    pub untrained_citizens: i64,
    pub workers: i64,
    pub soldiers: i64,
    pub guards: i64,
    pub spies: i64,
    pub sentries: i64,
    pub research_data: i64,
    pub protoform: Fixed,
    pub naquadah_crystals: Fixed,
    pub dark_matter: Fixed,
}

impl ResourceDelta {
    pub fn credits(amount: i64) -> Self {
        Self {
            credits: amount,
            ..Default::default()
        }
    }

    /// Delta changing the trained count of `unit`.
    pub fn units(unit: UnitKind, amount: i64) -> Self {
        let mut delta = Self::default();
        match unit {
            UnitKind::Worker => delta.workers = amount,
            UnitKind::Soldier => delta.soldiers = amount,
            UnitKind::Guard => delta.guards = amount,
            UnitKind::Spy => delta.spies = amount,
            UnitKind::Sentry => delta.sentries = amount,
        }
        delta
    }

    fn discrete(&self) -> [(Resource, i64); 10] {
        [
            (Resource::Credits, self.credits),
            (Resource::BankedCredits, self.banked_credits),
            (Resource::Gemstones, self.gemstones),
            (Resource::UntrainedCitizens, self.untrained_citizens),
            (Resource::Workers, self.workers),
            (Resource::Soldiers, self.soldiers),
            (Resource::Guards, self.guards),
            (Resource::Spies, self.spies),
            (Resource::Sentries, self.sentries),
            (Resource::ResearchData, self.research_data),
        ]
    }

    fn continuous(&self) -> [(Resource, Fixed); 3] {
        [
            (Resource::Protoform, self.protoform),
            (Resource::NaquadahCrystals, self.naquadah_crystals),
            (Resource::DarkMatter, self.dark_matter),
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.discrete().iter().all(|(_, v)| *v == 0)
            && self.continuous().iter().all(|(_, v)| *v == Fixed::ZERO)
    }
}

impl std::ops::AddAssign<&ResourceDelta> for ResourceDelta {
    fn add_assign(&mut self, other: &ResourceDelta) {
        self.credits += other.credits;
        self.banked_credits += other.banked_credits;
        self.gemstones += other.gemstones;
        self.untrained_citizens += other.untrained_citizens;
        self.workers += other.workers;
        self.soldiers += other.soldiers;
        self.guards += other.guards;
        self.spies += other.spies;
        self.sentries += other.sentries;
        self.research_data += other.research_data;
        self.protoform += other.protoform;
        self.naquadah_crystals += other.naquadah_crystals;
        self.dark_matter += other.dark_matter;
    }
}

/// Amounts a clamped update could not deduct.
pub type Shortfall = BTreeMap<Resource, Fixed>;

impl ResourceLedger {
    fn discrete_mut(&mut self) -> [(Resource, &mut i64); 10] {
        [
            (Resource::Credits, &mut self.credits),
            (Resource::BankedCredits, &mut self.banked_credits),
            (Resource::Gemstones, &mut self.gemstones),
            (Resource::UntrainedCitizens, &mut self.untrained_citizens),
            (Resource::Workers, &mut self.workers),
            (Resource::Soldiers, &mut self.soldiers),
            (Resource::Guards, &mut self.guards),
            (Resource::Spies, &mut self.spies),
            (Resource::Sentries, &mut self.sentries),
            (Resource::ResearchData, &mut self.research_data),
        ]
    }

    fn discrete(&self) -> [(Resource, i64); 10] {
        [
            (Resource::Credits, self.credits),
            (Resource::BankedCredits, self.banked_credits),
            (Resource::Gemstones, self.gemstones),
            (Resource::UntrainedCitizens, self.untrained_citizens),
            (Resource::Workers, self.workers),
            (Resource::Soldiers, self.soldiers),
            (Resource::Guards, self.guards),
            (Resource::Spies, self.spies),
            (Resource::Sentries, self.sentries),
            (Resource::ResearchData, self.research_data),
        ]
    }

    fn continuous(&self) -> [(Resource, Fixed); 3] {
        [
            (Resource::Protoform, self.protoform),
            (Resource::NaquadahCrystals, self.naquadah_crystals),
            (Resource::DarkMatter, self.dark_matter),
        ]
    }

    fn continuous_mut(&mut self) -> [(Resource, &mut Fixed); 3] {
        [
            (Resource::Protoform, &mut self.protoform),
            (Resource::NaquadahCrystals, &mut self.naquadah_crystals),
            (Resource::DarkMatter, &mut self.dark_matter),
        ]
    }

    pub fn units(&self, unit: UnitKind) -> i64 {
        match unit {
            UnitKind::Worker => self.workers,
            UnitKind::Soldier => self.soldiers,
            UnitKind::Guard => self.guards,
            UnitKind::Spy => self.spies,
            UnitKind::Sentry => self.sentries,
        }
    }

    /// Apply `delta`, clamping every balance at zero.
    ///
    /// Returns what could not be deducted. Used by the turn processor, where
    /// upkeep may exceed the balance without failing the turn.
    pub fn apply_clamped(&mut self, delta: &ResourceDelta) -> Shortfall {
        let mut shortfall = Shortfall::new();
        for ((resource, balance), (_, change)) in
            self.discrete_mut().into_iter().zip(delta.discrete())
        {
            let next = balance.saturating_add(change);
            if next < 0 {
                shortfall.insert(resource, Fixed::from_int(-next));
                *balance = 0;
            } else {
                *balance = next;
            }
        }
        for ((resource, balance), (_, change)) in
            self.continuous_mut().into_iter().zip(delta.continuous())
        {
            let next = balance.saturating_add(change);
            if next.is_negative() {
                shortfall.insert(resource, -next);
                *balance = Fixed::ZERO;
            } else {
                *balance = next;
            }
        }
        shortfall
    }

    /// Apply `delta` only if no balance would go negative.
    ///
    /// All-or-nothing: on error the ledger is unchanged.
    pub fn try_apply(&mut self, delta: &ResourceDelta) -> Result<(), EngineError> {
        let mut probe = self.clone();
        for ((resource, balance), (_, change)) in
            probe.discrete_mut().into_iter().zip(delta.discrete())
        {
            let next = balance.saturating_add(change);
            if next < 0 {
                return Err(EngineError::insufficient(resource, -change, *balance));
            }
            *balance = next;
        }
        for ((resource, balance), (_, change)) in
            probe.continuous_mut().into_iter().zip(delta.continuous())
        {
            let next = balance.saturating_add(change);
            if next.is_negative() {
                return Err(EngineError::InsufficientResource {
                    resource,
                    required: -change,
                    available: *balance,
                });
            }
            *balance = next;
        }
        *self = probe;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (resource, balance) in self.discrete() {
            if balance < 0 {
                return Err(EngineError::invalid(format!(
                    "{resource} balance is negative: {balance}"
                )));
            }
        }
        for (resource, balance) in self.continuous() {
            if balance.is_negative() {
                return Err(EngineError::invalid(format!(
                    "{resource} balance is negative: {balance}"
                )));
            }
        }
        Ok(())
    }
}

/// Level, experience, stat points and capped counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
    pub level: i64,
    pub experience: i64,
    pub unallocated_points: i64,
    pub strength: i64,
    pub constitution: i64,
    pub wealth: i64,
    pub dexterity: i64,
    pub charisma: i64,
    pub war_prestige: i64,
    pub energy: i64,
    pub attack_turns: i64,
    pub deposit_charges: i64,
    pub net_worth: i64,
    /// Most recent turn applied to this player.
    pub last_processed_turn: Option<TurnNumber>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            unallocated_points: 0,
            strength: 0,
            constitution: 0,
            wealth: 0,
            dexterity: 0,
            charisma: 0,
            war_prestige: 0,
            energy: 0,
            attack_turns: 0,
            deposit_charges: 0,
            net_worth: 0,
            last_processed_turn: None,
        }
    }
}

/// Allocatable stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stat {
    Strength,
    Constitution,
    Wealth,
    Dexterity,
    Charisma,
}

impl ProgressionState {
    pub fn stat(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Constitution => self.constitution,
            Stat::Wealth => self.wealth,
            Stat::Dexterity => self.dexterity,
            Stat::Charisma => self.charisma,
        }
    }

    pub fn stat_mut(&mut self, stat: Stat) -> &mut i64 {
        match stat {
            Stat::Strength => &mut self.strength,
            Stat::Constitution => &mut self.constitution,
            Stat::Wealth => &mut self.wealth,
            Stat::Dexterity => &mut self.dexterity,
            Stat::Charisma => &mut self.charisma,
        }
    }

    pub fn has_processed(&self, turn: TurnNumber) -> bool {
        self.last_processed_turn.is_some_and(|last| last >= turn)
    }
}

/// Personal structure levels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureLevels(BTreeMap<StructureKind, i64>);

impl StructureLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of `kind`; unbuilt structures are level 0.
    pub fn level(&self, kind: StructureKind) -> i64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: StructureKind, level: i64) {
        self.0.insert(kind, level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (StructureKind, i64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn total_levels(&self) -> i64 {
        self.0.values().sum()
    }
}

/// Alliance structure levels keyed by registry key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllianceStructureLevels(BTreeMap<String, i64>);

impl AllianceStructureLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, key: &str) -> i64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: impl Into<String>, level: i64) {
        self.0.insert(key.into(), level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub unit: UnitKind,
    pub category: ItemCategory,
    pub item: String,
}

/// Equipped items per (unit, category) slot plus every item ever bought.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentLoadout {
    pub equipped: Vec<EquippedItem>,
    pub owned: BTreeSet<String>,
}

impl EquipmentLoadout {
    pub fn equipped_in(&self, unit: UnitKind, category: ItemCategory) -> Option<&str> {
        self.equipped
            .iter()
            .find(|e| e.unit == unit && e.category == category)
            .map(|e| e.item.as_str())
    }

    /// Put `item` into its slot, replacing whatever was there.
    pub fn equip(&mut self, unit: UnitKind, category: ItemCategory, item: &str) {
        self.equipped
            .retain(|e| !(e.unit == unit && e.category == category));
        self.equipped.push(EquippedItem {
            unit,
            category,
            item: item.to_string(),
        });
    }

    pub fn owns(&self, item: &str) -> bool {
        self.owned.contains(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveEdictSet {
    pub active: Vec<String>,
}

impl ActiveEdictSet {
    pub fn is_active(&self, key: &str) -> bool {
        self.active.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialistRoster {
    pub generals: i64,
    pub scientists: i64,
}

impl SpecialistRoster {
    pub fn count(&self, kind: SpecialistKind) -> i64 {
        match kind {
            SpecialistKind::General => self.generals,
            SpecialistKind::Scientist => self.scientists,
        }
    }

    pub fn count_mut(&mut self, kind: SpecialistKind) -> &mut i64 {
        match kind {
            SpecialistKind::General => &mut self.generals,
            SpecialistKind::Scientist => &mut self.scientists,
        }
    }
}

/// Everything stored for one player.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub alliance: Option<AllianceId>,
    #[serde(default)]
    pub resources: ResourceLedger,
    #[serde(default)]
    pub progression: ProgressionState,
    #[serde(default)]
    pub structures: StructureLevels,
    #[serde(default)]
    pub loadout: EquipmentLoadout,
    #[serde(default)]
    pub edicts: ActiveEdictSet,
    #[serde(default)]
    pub specialists: SpecialistRoster,
}

impl PlayerRecord {
    pub fn sources<'a>(
        &'a self,
        alliance: Option<&'a AllianceStructureLevels>,
    ) -> ModifierSources<'a> {
        ModifierSources {
            player: self.id,
            resources: &self.resources,
            progression: &self.progression,
            structures: &self.structures,
            loadout: &self.loadout,
            edicts: &self.edicts,
            specialists: &self.specialists,
            alliance,
        }
    }
}

/// Borrowed, read-only inputs for one calculation.
#[derive(Debug, Clone, Copy)]
pub struct ModifierSources<'a> {
    pub player: PlayerId,
    pub resources: &'a ResourceLedger,
    pub progression: &'a ProgressionState,
    pub structures: &'a StructureLevels,
    pub loadout: &'a EquipmentLoadout,
    pub edicts: &'a ActiveEdictSet,
    pub specialists: &'a SpecialistRoster,
    /// Structure levels of the player's alliance, if any.
    pub alliance: Option<&'a AllianceStructureLevels>,
}

/// Which member income an operation accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    CreditDrive,
    Recruitment,
    Research,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "turn")]
pub enum OperationStatus {
    Active,
    Completed(TurnNumber),
    Failed(TurnNumber),
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OperationStatus::Active)
    }
}

/// Time-boxed alliance goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllianceOperation {
    pub id: u32,
    pub name: String,
    pub kind: OperationKind,
    pub target: i64,
    #[serde(default)]
    pub contributed: i64,
    /// Last turn on which contributions still count.
    pub deadline: TurnNumber,
    #[serde(default = "active")]
    pub status: OperationStatus,
}

fn active() -> OperationStatus {
    OperationStatus::Active
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllianceRecord {
    pub id: AllianceId,
    pub name: String,
    #[serde(default)]
    pub structures: AllianceStructureLevels,
    #[serde(default)]
    pub treasury: i64,
    /// Share of member credit income paid into the treasury.
    #[serde(default)]
    pub tax_rate: Fixed,
    #[serde(default)]
    pub operations: Vec<AllianceOperation>,
}

impl AllianceRecord {
    /// Relative treasury update clamped to `[0, TREASURY_CAP]`.
    /// Returns the change actually applied.
    pub fn adjust_treasury(&mut self, delta: i64) -> i64 {
        let before = self.treasury;
        self.treasury = before
            .saturating_add(delta)
            .clamp(0, alliance_defines::TREASURY_CAP);
        self.treasury - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> ResourceLedger {
        ResourceLedger {
            credits: 100,
            protoform: Fixed::from_int(10),
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_clamped_reports_shortfall() {
        let mut l = ledger();
        let shortfall = l.apply_clamped(&ResourceDelta {
            credits: -150,
            protoform: Fixed::from_int(-4),
            ..Default::default()
        });
        assert_eq!(l.credits, 0);
        assert_eq!(l.protoform, Fixed::from_int(6));
        assert_eq!(shortfall.get(&Resource::Credits), Some(&Fixed::from_int(50)));
        assert!(!shortfall.contains_key(&Resource::Protoform));
    }

    #[test]
    fn test_try_apply_is_all_or_nothing() {
        let mut l = ledger();
        let err = l
            .try_apply(&ResourceDelta {
                credits: -50,
                protoform: Fixed::from_int(-11),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientResource {
                resource: Resource::Protoform,
                ..
            }
        ));
        assert_eq!(l, ledger(), "Ledger must be untouched after rejection");

        l.try_apply(&ResourceDelta::credits(-100)).unwrap();
        assert_eq!(l.credits, 0);
    }

    #[test]
    fn test_validate_rejects_negative_balance() {
        let l = ResourceLedger {
            spies: -1,
            ..Default::default()
        };
        assert!(matches!(l.validate(), Err(EngineError::InvalidInput(_))));
        let l = ResourceLedger {
            dark_matter: Fixed::from_raw(-1),
            ..Default::default()
        };
        assert!(matches!(l.validate(), Err(EngineError::InvalidInput(_))));
        assert!(ledger().validate().is_ok());
    }

    #[test]
    fn test_treasury_clamps_to_cap() {
        let mut a = AllianceRecord {
            treasury: alliance_defines::TREASURY_CAP - 10,
            ..Default::default()
        };
        assert_eq!(a.adjust_treasury(100), 10);
        assert_eq!(a.treasury, alliance_defines::TREASURY_CAP);
        assert_eq!(a.adjust_treasury(i64::MIN), -alliance_defines::TREASURY_CAP);
        assert_eq!(a.treasury, 0);
    }

    #[test]
    fn test_equip_replaces_slot() {
        let mut loadout = EquipmentLoadout::default();
        loadout.equip(UnitKind::Soldier, ItemCategory::Weapon, "pulse_rifle");
        loadout.equip(UnitKind::Soldier, ItemCategory::Weapon, "plasma_rifle");
        assert_eq!(loadout.equipped.len(), 1);
        assert_eq!(
            loadout.equipped_in(UnitKind::Soldier, ItemCategory::Weapon),
            Some("plasma_rifle")
        );
    }

    #[test]
    fn test_structure_levels_json_uses_snake_case_keys() {
        let mut levels = StructureLevels::new();
        levels.set(StructureKind::OffenseUpgrade, 3);
        let json = serde_json::to_string(&levels).unwrap();
        assert_eq!(json, r#"{"offense_upgrade":3}"#);
        let back: StructureLevels = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level(StructureKind::OffenseUpgrade), 3);
        assert_eq!(back.level(StructureKind::Economy), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// No sequence of clamped updates leaves a negative balance.
            #[test]
            fn clamped_updates_never_negative(
                steps in proptest::collection::vec((-1_000_000i64..1_000_000, -50_000i64..50_000), 1..40)
            ) {
                let mut l = ResourceLedger::default();
                for (credits, protoform_raw) in steps {
                    l.apply_clamped(&ResourceDelta {
                        credits,
                        soldiers: credits / 7,
                        protoform: Fixed::from_raw(protoform_raw),
                        ..Default::default()
                    });
                    prop_assert!(l.validate().is_ok());
                }
            }

            /// Rejected strict updates never change the ledger.
            #[test]
            fn strict_updates_never_negative(
                steps in proptest::collection::vec(-1_000i64..1_000, 1..40)
            ) {
                let mut l = ResourceLedger::default();
                for credits in steps {
                    let before = l.clone();
                    if l.try_apply(&ResourceDelta::credits(credits)).is_err() {
                        prop_assert_eq!(&l, &before);
                    }
                    prop_assert!(l.credits >= 0);
                }
            }
        }
    }
}
