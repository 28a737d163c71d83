//! Armory item catalog.
//!
//! Items are bought once and then equipped into a (unit class, category)
//! slot. An equipped item only counts while the player's armory level meets
//! `armory_level` and the prerequisite item, if any, is still owned.

use crate::error::DataError;
use crate::units::{ItemCategory, UnitKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDef {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: UnitKind,
    pub category: ItemCategory,
    /// Flat power added per unit of `unit` while equipped.
    pub power_per_unit: i64,
    /// Armory level needed for the item to be bought or counted.
    pub armory_level: i64,
    /// Item that must be owned first.
    pub requires: Option<&'static str>,
    /// Purchase price in credits.
    pub cost: i64,
}

pub const ITEMS: &[ItemDef] = &[
    ItemDef {
        key: "pulse_rifle",
        name: "Pulse Rifle",
        unit: UnitKind::Soldier,
        category: ItemCategory::Weapon,
        power_per_unit: 5,
        armory_level: 0,
        requires: None,
        cost: 10_000,
    },
    ItemDef {
        key: "plasma_rifle",
        name: "Plasma Rifle",
        unit: UnitKind::Soldier,
        category: ItemCategory::Weapon,
        power_per_unit: 12,
        armory_level: 2,
        requires: Some("pulse_rifle"),
        cost: 60_000,
    },
    ItemDef {
        key: "assault_plating",
        name: "Assault Plating",
        unit: UnitKind::Soldier,
        category: ItemCategory::Armor,
        power_per_unit: 4,
        armory_level: 1,
        requires: None,
        cost: 20_000,
    },
    ItemDef {
        key: "riot_shield",
        name: "Riot Shield",
        unit: UnitKind::Guard,
        category: ItemCategory::Armor,
        power_per_unit: 5,
        armory_level: 0,
        requires: None,
        cost: 10_000,
    },
    ItemDef {
        key: "barrier_projector",
        name: "Barrier Projector",
        unit: UnitKind::Guard,
        category: ItemCategory::Armor,
        power_per_unit: 12,
        armory_level: 2,
        requires: Some("riot_shield"),
        cost: 60_000,
    },
    ItemDef {
        key: "sentinel_carbine",
        name: "Sentinel Carbine",
        unit: UnitKind::Guard,
        category: ItemCategory::Weapon,
        power_per_unit: 6,
        armory_level: 1,
        requires: None,
        cost: 25_000,
    },
    ItemDef {
        key: "cloaking_field",
        name: "Cloaking Field",
        unit: UnitKind::Spy,
        category: ItemCategory::Gadget,
        power_per_unit: 8,
        armory_level: 1,
        requires: None,
        cost: 30_000,
    },
    ItemDef {
        key: "neural_scrambler",
        name: "Neural Scrambler",
        unit: UnitKind::Spy,
        category: ItemCategory::Gadget,
        power_per_unit: 15,
        armory_level: 3,
        requires: Some("cloaking_field"),
        cost: 90_000,
    },
    ItemDef {
        key: "motion_tracker",
        name: "Motion Tracker",
        unit: UnitKind::Sentry,
        category: ItemCategory::Gadget,
        power_per_unit: 8,
        armory_level: 1,
        requires: None,
        cost: 30_000,
    },
    ItemDef {
        key: "quantum_sensor",
        name: "Quantum Sensor",
        unit: UnitKind::Sentry,
        category: ItemCategory::Gadget,
        power_per_unit: 15,
        armory_level: 3,
        requires: Some("motion_tracker"),
        cost: 90_000,
    },
];

/// Resolve an item key.
pub fn item(key: &str) -> Result<&'static ItemDef, DataError> {
    ITEMS
        .iter()
        .find(|def| def.key == key)
        .ok_or_else(|| DataError::UnknownItem(key.to_string()))
}
