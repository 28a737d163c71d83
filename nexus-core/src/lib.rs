//! # Nexus Rules Engine
//!
//! Deterministic rules core for a persistent multiplayer strategy game:
//! bonus stacking, per-turn resource processing, combat and espionage.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ PlayerRecord │────▶│  Calculator  │────▶│ PlayerMetrics│
//! │ (+ alliance) │     │ (pure fn)    │     │ (+ breakdown)│
//! └──────┬───────┘     └──────────────┘     └──────┬───────┘
//!        │                                         │
//! ┌──────▼───────┐     ┌──────────────┐     ┌──────▼───────┐
//! │ PlayerStore  │◀────│TurnProcessor │◀────│ upkeep/income│
//! │ (versioned)  │     │ (rayon batch)│     │ progression  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Calculator`] | Pure `(sources, rules) -> metrics` with a full breakdown |
//! | [`TurnProcessor`] | Per-player turn transaction and parallel batches |
//! | [`PlayerStore`] | Optimistically versioned persistence seam |
//! | [`Command`] | Player actions (upgrades, training, attacks, ...) |
//! | [`Fixed`] | Deterministic fixed-point arithmetic |
//!
//! Stacking order for every metric:
//!
//! ```text
//! (base + flat + alliance_flat × synergy)
//!   × (1 + personal% + alliance% × synergy)
//!   × (1 + edict%)
//! ```
//!
//! Results are clamped at zero; discrete metrics are floored.

pub mod actions;
pub mod bounded;
pub mod calculator;
pub mod config;
pub mod error;
pub mod fixed;
pub mod input;
pub mod metrics;
pub mod modifiers;
pub mod rules;
pub mod state;
pub mod store;
pub mod systems;
pub mod testing;
pub mod turn;

pub use actions::{execute_command, ActionError};
pub use bounded::BoundedInt;
pub use calculator::{Calculator, IncomeReport, MetricsCache, PlayerMetrics, PowerReport};
pub use config::EngineConfig;
pub use error::EngineError;
pub use fixed::Fixed;
pub use input::{Command, PlayerInputs};
pub use metrics::TurnMetrics;
pub use modifiers::{BonusBreakdown, BonusStack, Metric, MetricBreakdown};
pub use rules::RuleBook;
pub use state::{
    AllianceId, AllianceRecord, ModifierSources, PlayerId, PlayerRecord, Resource, TurnNumber,
};
pub use store::{MemoryStore, PlayerStore, Report};
pub use turn::{BatchSummary, TurnOutcome, TurnProcessor, TurnReport};
