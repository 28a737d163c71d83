//! Game mechanic constants (defines).
//!
//! Rates are fractional (`0.05` = 5%) and stored as `f32`; the engine converts
//! them to fixed-point once at the call site. Counts are `i64`.

/// Unit base yields
pub mod units {
    /// Offense contributed by each trained soldier
    pub const SOLDIER_OFFENSE: i64 = 10;

    /// Defense contributed by each trained guard
    pub const GUARD_DEFENSE: i64 = 10;

    /// Spy power contributed by each trained spy
    pub const SPY_POWER: i64 = 10;

    /// Sentry power contributed by each trained sentry
    pub const SENTRY_POWER: i64 = 10;

    /// Credits charged to train one unit of any class
    pub const TRAINING_COST: i64 = 2_500;
}

/// Economy constants
pub mod economy {
    /// Credits every player receives per turn just for existing
    pub const BASE_CREDITS_PER_TURN: i64 = 1_000;

    /// Credits produced by each worker per turn
    pub const CREDITS_PER_WORKER: i64 = 50;

    /// Economy structure: credit income bonus per level
    pub const ECONOMY_PERCENT_PER_LEVEL: f32 = 0.05;

    /// Wealth stat: credit income bonus per allocated point
    pub const WEALTH_PERCENT_PER_POINT: f32 = 0.01;

    /// Research data produced by each scientist per turn
    pub const RESEARCH_PER_SCIENTIST: i64 = 25;

    /// Protoform produced by each worker per turn
    pub const PROTOFORM_PER_WORKER: f32 = 0.5;

    /// Dark matter produced per economy structure level per turn
    pub const DARK_MATTER_PER_ECONOMY_LEVEL: f32 = 0.5;

    /// Interest paid on banked credits each turn
    pub const BANK_INTEREST_RATE: f32 = 0.001;

    /// Largest share of on-hand credits a single deposit may move
    pub const MAX_DEPOSIT_FRACTION: f32 = 0.8;

    /// Charisma: purchase discount per allocated point
    pub const CHARISMA_DISCOUNT_PER_POINT: f32 = 0.01;

    /// Charisma discount never exceeds this
    pub const MAX_CHARISMA_DISCOUNT: f32 = 0.25;
}

/// Population constants
pub mod population {
    /// Untrained citizens gained per turn before bonuses
    pub const BASE_CITIZENS_PER_TURN: i64 = 3;

    /// Population structure: citizens per turn per level
    pub const CITIZENS_PER_POPULATION_LEVEL: i64 = 5;
}

/// Combat constants
pub mod combat {
    /// Fortification: flat defense per level
    pub const FORTIFICATION_DEFENSE_PER_LEVEL: i64 = 250;

    /// Offense upgrade: offense bonus per level
    pub const OFFENSE_PERCENT_PER_LEVEL: f32 = 0.10;

    /// Defense upgrade: defense bonus per level
    pub const DEFENSE_PERCENT_PER_LEVEL: f32 = 0.10;

    /// Spy upgrade: spy and sentry bonus per level
    pub const SPY_PERCENT_PER_LEVEL: f32 = 0.10;

    /// Strength/constitution/dexterity: power bonus per allocated point
    pub const STAT_PERCENT_PER_POINT: f32 = 0.01;

    /// Base casualty rate scaled by the power ratio
    pub const BASE_LOSS_RATE: f32 = 0.05;

    /// Casualty rate cap for either side
    pub const MAX_LOSS_RATE: f32 = 0.15;

    /// Plunder share of visible credits per attack turn spent
    pub const PLUNDER_RATE_PER_TURN: f32 = 0.02;

    /// Plunder share cap
    pub const MAX_PLUNDER_RATE: f32 = 0.20;

    /// Attack turns a single battle may spend
    pub const MAX_ATTACK_TURNS_PER_BATTLE: i64 = 10;

    /// Experience per attack turn spent
    pub const XP_PER_ATTACK_TURN: i64 = 20;

    /// War prestige per attack turn spent on a victory
    pub const PRESTIGE_PER_ATTACK_TURN: i64 = 2;
}

/// Espionage constants
pub mod espionage {
    /// Share of spies sent that are lost on a failed mission
    pub const FAILED_MISSION_SPY_LOSS: f32 = 0.25;

    /// Share of defender workers killed by a successful assassination
    pub const ASSASSINATION_RATE: f32 = 0.02;

    /// Energy cost of any spy mission
    pub const MISSION_ENERGY_COST: i64 = 10;
}

/// Specialist constants
pub mod specialists {
    /// Protoform upkeep per general per turn
    pub const GENERAL_UPKEEP_PROTOFORM: i64 = 500;

    /// Flat offense per general
    pub const GENERAL_OFFENSE: i64 = 100;

    /// Credits to hire one general
    pub const GENERAL_HIRE_COST: i64 = 25_000;

    /// Credit upkeep per scientist per turn
    pub const SCIENTIST_UPKEEP_CREDITS: i64 = 250;

    /// Credits to hire one scientist
    pub const SCIENTIST_HIRE_COST: i64 = 10_000;
}

/// Progression constants
pub mod progression {
    /// Energy regained per turn
    pub const ENERGY_PER_TURN: i64 = 10;

    /// Energy cap
    pub const MAX_ENERGY: i64 = 100;

    /// Attack turns gained per turn
    pub const ATTACK_TURNS_PER_TURN: i64 = 1;

    /// Attack turn cap
    pub const MAX_ATTACK_TURNS: i64 = 50;

    /// A deposit charge is regained every this many turns
    pub const DEPOSIT_CHARGE_INTERVAL: u64 = 4;

    /// Deposit charge cap
    pub const MAX_DEPOSIT_CHARGES: i64 = 4;

    /// Passive experience per turn
    pub const XP_PER_TURN: i64 = 5;

    /// Experience needed per level (`level × XP_PER_LEVEL` for the next one)
    pub const XP_PER_LEVEL: i64 = 1_000;

    /// Stat points granted per level gained
    pub const POINTS_PER_LEVEL: i64 = 1;
}

/// Net worth weights
pub mod networth {
    /// Credits (on hand plus banked) per point of net worth
    pub const CREDITS_PER_POINT: i64 = 1_000;

    /// Net worth per worker or untrained citizen
    pub const CIVILIAN_WEIGHT: i64 = 1;

    /// Net worth per soldier or guard
    pub const MILITARY_WEIGHT: i64 = 5;

    /// Net worth per spy or sentry
    pub const COVERT_WEIGHT: i64 = 10;

    /// Net worth per personal structure level
    pub const STRUCTURE_LEVEL_WEIGHT: i64 = 500;

    /// Net worth per player level
    pub const PLAYER_LEVEL_WEIGHT: i64 = 100;
}

/// Alliance constants
pub mod alliance {
    /// Alliance treasuries never exceed this (largest integer a double holds exactly)
    pub const TREASURY_CAP: i64 = 9_007_199_254_740_991;

    /// Highest tax rate an alliance may levy on member credit income
    pub const MAX_TAX_RATE: f32 = 0.25;

    /// Alliance structure levels are capped here
    pub const MAX_STRUCTURE_LEVEL: i64 = 25;
}
