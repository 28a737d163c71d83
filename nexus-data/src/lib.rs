//! Static game definitions for the Nexus rules engine.
//!
//! Tuning constants live in [`defines`]; everything keyed by string in
//! storage (alliance structures, armory items, edicts) is resolved through a
//! lookup that fails on unknown keys.

pub mod armory;
pub mod defines;
pub mod edicts;
pub mod error;
pub mod specialists;
pub mod structures;
pub mod units;

pub use armory::{item, ItemDef};
pub use edicts::{EdictCatalog, EdictDef, EdictEffects};
pub use error::DataError;
pub use specialists::{SpecialistKind, SpecialistUpkeep};
pub use structures::{alliance_structure, AllianceEffect, AllianceStructureDef, StructureKind};
pub use units::{ItemCategory, UnitKind};
