//! Personal and alliance structure definitions.
//!
//! Personal structures form a closed enum; alliance structures are keyed by
//! string in storage and resolved through [`alliance_structure`], which fails
//! on unknown keys instead of defaulting.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Personal structure type.
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
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StructureKind {
    Economy,
    Population,
    Armory,
    Fortification,
    OffenseUpgrade,
    DefenseUpgrade,
    SpyUpgrade,
    /// Each level opens one edict slot.
    Embassy,
}

impl StructureKind {
    /// Credits for the first level; level `n` costs `base × n²`.
    pub fn base_cost(self) -> i64 {
        match self {
            StructureKind::Economy => 20_000,
            StructureKind::Population => 15_000,
            StructureKind::Armory => 25_000,
            StructureKind::Fortification => 30_000,
            StructureKind::OffenseUpgrade => 40_000,
            StructureKind::DefenseUpgrade => 40_000,
            StructureKind::SpyUpgrade => 35_000,
            StructureKind::Embassy => 50_000,
        }
    }

    pub fn max_level(self) -> i64 {
        match self {
            StructureKind::Embassy => 5,
            StructureKind::Armory => 10,
            _ => 30,
        }
    }

    /// Cost of raising the structure from `current_level` to the next level.
    pub fn upgrade_cost(self, current_level: i64) -> i64 {
        let next = current_level + 1;
        self.base_cost().saturating_mul(next.saturating_mul(next))
    }
}

/// One per-level effect of an alliance structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllianceEffect {
    /// Credit and resource income percent.
    IncomePercent(f32),
    /// Resource income percent; pooled with `IncomePercent`.
    ResourcePercent(f32),
    OffensePercent(f32),
    DefensePercent(f32),
    SpyPercent(f32),
    SentryPercent(f32),
    /// Untrained citizens per turn.
    CitizensFlat(i64),
    /// Credits per turn.
    CreditsFlat(i64),
    /// Multiplies every other alliance bonus by `1 + rate × level`.
    Synergy(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllianceStructureDef {
    pub key: &'static str,
    pub name: &'static str,
    pub effects: &'static [AllianceEffect],
    /// Treasury credits for the first level; level `n` costs `base × n²`.
    pub base_cost: i64,
}

impl AllianceStructureDef {
    pub fn upgrade_cost(&self, current_level: i64) -> i64 {
        let next = current_level + 1;
        self.base_cost.saturating_mul(next.saturating_mul(next))
    }

    pub fn is_synergy(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, AllianceEffect::Synergy(_)))
    }
}

pub const ALLIANCE_STRUCTURES: &[AllianceStructureDef] = &[
    AllianceStructureDef {
        key: "command_nexus",
        name: "Command Nexus",
        effects: &[
            AllianceEffect::IncomePercent(0.05),
            AllianceEffect::OffensePercent(0.05),
        ],
        base_cost: 500_000,
    },
    AllianceStructureDef {
        key: "research_hub",
        name: "Research Hub",
        effects: &[
            AllianceEffect::ResourcePercent(0.10),
            AllianceEffect::DefensePercent(0.10),
        ],
        base_cost: 750_000,
    },
    AllianceStructureDef {
        key: "population_habitat",
        name: "Population Habitat",
        effects: &[AllianceEffect::CitizensFlat(5)],
        base_cost: 400_000,
    },
    AllianceStructureDef {
        key: "shadow_network",
        name: "Shadow Network",
        effects: &[
            AllianceEffect::SpyPercent(0.05),
            AllianceEffect::SentryPercent(0.05),
        ],
        base_cost: 600_000,
    },
    AllianceStructureDef {
        key: "orbital_foundry",
        name: "Orbital Foundry",
        effects: &[AllianceEffect::CreditsFlat(500)],
        base_cost: 450_000,
    },
    AllianceStructureDef {
        key: "warlords_throne",
        name: "Warlord's Throne",
        effects: &[AllianceEffect::Synergy(0.15)],
        base_cost: 2_000_000,
    },
];

/// Resolve an alliance structure key.
pub fn alliance_structure(key: &str) -> Result<&'static AllianceStructureDef, DataError> {
    ALLIANCE_STRUCTURES
        .iter()
        .find(|def| def.key == key)
        .ok_or_else(|| DataError::UnknownAllianceStructure(key.to_string()))
}
