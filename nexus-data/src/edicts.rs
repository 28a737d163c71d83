//! Edict catalog.
//!
//! Edicts are named modifiers a player activates into a limited number of
//! embassy slots. The catalog ships with built-in definitions and can be
//! replaced by a JSON file of the same shape:
//!
//! ```json
//! [{ "key": "industrial_mandate", "name": "Industrial Mandate",
//!    "effects": { "resource_production_percent": 0.20 } }]
//! ```
//!
//! Unknown effect fields are rejected at load time.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Typed effect payload. Every field is a fractional rate; absent fields are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdictEffects {
    /// Research, protoform and dark matter income.
    pub resource_production_percent: f32,
    pub credit_income_percent: f32,
    pub citizen_growth_percent: f32,
    pub offense_percent: f32,
    pub defense_percent: f32,
    pub spy_percent: f32,
    pub sentry_percent: f32,
}

impl EdictEffects {
    fn fields(&self) -> [(&'static str, f32); 7] {
        [
            (
                "resource_production_percent",
                self.resource_production_percent,
            ),
            ("credit_income_percent", self.credit_income_percent),
            ("citizen_growth_percent", self.citizen_growth_percent),
            ("offense_percent", self.offense_percent),
            ("defense_percent", self.defense_percent),
            ("spy_percent", self.spy_percent),
            ("sentry_percent", self.sentry_percent),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdictDef {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub effects: EdictEffects,
}

/// Validated edict registry keyed by edict key.
#[derive(Debug, Clone, Default)]
pub struct EdictCatalog {
    by_key: BTreeMap<String, EdictDef>,
}

impl EdictCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in edict set.
    pub fn builtin() -> Self {
        let defs = [
            (
                "industrial_mandate",
                "Industrial Mandate",
                EdictEffects {
                    resource_production_percent: 0.20,
                    ..Default::default()
                },
            ),
            (
                "prosperity_charter",
                "Prosperity Charter",
                EdictEffects {
                    credit_income_percent: 0.10,
                    ..Default::default()
                },
            ),
            (
                "war_economy",
                "War Economy",
                EdictEffects {
                    offense_percent: 0.10,
                    credit_income_percent: -0.05,
                    ..Default::default()
                },
            ),
            (
                "fortress_doctrine",
                "Fortress Doctrine",
                EdictEffects {
                    defense_percent: 0.15,
                    ..Default::default()
                },
            ),
            (
                "shadow_protocol",
                "Shadow Protocol",
                EdictEffects {
                    spy_percent: 0.10,
                    sentry_percent: 0.10,
                    ..Default::default()
                },
            ),
            (
                "population_drive",
                "Population Drive",
                EdictEffects {
                    citizen_growth_percent: 0.25,
                    ..Default::default()
                },
            ),
        ];

        let mut catalog = Self::new();
        for (key, name, effects) in defs {
            catalog.by_key.insert(
                key.to_string(),
                EdictDef {
                    key: key.to_string(),
                    name: name.to_string(),
                    effects,
                },
            );
        }
        catalog
    }

    /// Add a definition, rejecting duplicates and out-of-range rates.
    pub fn register(&mut self, def: EdictDef) -> Result<(), DataError> {
        for (field, value) in def.effects.fields() {
            // A rate at or below -100% would zero or invert the target.
            if !value.is_finite() || value <= -1.0 {
                return Err(DataError::InvalidEffect {
                    edict: def.key.clone(),
                    field,
                    value,
                });
            }
        }
        if self.by_key.contains_key(&def.key) {
            return Err(DataError::DuplicateEdict(def.key));
        }
        self.by_key.insert(def.key.clone(), def);
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let defs: Vec<EdictDef> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for def in defs {
            catalog.register(def)?;
        }
        log::debug!("Loaded {} edict definitions", catalog.len());
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn get(&self, key: &str) -> Result<&EdictDef, DataError> {
        self.by_key
            .get(key)
            .ok_or_else(|| DataError::UnknownEdict(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdictDef> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
