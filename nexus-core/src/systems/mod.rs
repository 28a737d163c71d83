//! Rules systems.
//!
//! The `*_sources` / `*_bonuses` functions feed a [`crate::modifiers::StackSet`]
//! for the calculator; the rest are per-turn ticks and resolvers used by the
//! turn processor and player actions.

pub mod alliance;
pub mod combat;
pub mod edicts;
pub mod espionage;
pub mod income;
pub mod networth;
pub mod operations;
pub mod power;
pub mod progression;
pub mod upkeep;

pub use alliance::apply_alliance_bonuses;
pub use combat::{resolve_battle, BattleReport, Combatant, DefenderView};
pub use edicts::apply_edict_bonuses;
pub use espionage::{resolve_espionage, EspionageReport, Mission};
pub use income::{apply_income_sources, bank_interest};
pub use networth::calculate_net_worth;
pub use operations::{advance_operations, OperationContribution, OperationTransition};
pub use power::apply_power_sources;
pub use progression::{run_progression_tick, ProgressionGain};
pub use upkeep::run_upkeep;
