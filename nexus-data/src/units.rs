//! Citizen classes and equipment slots.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Trained citizen class.
///
/// Each class feeds exactly one metric family: workers feed income, the
/// others feed the power metric of the same name.
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
pub enum UnitKind {
    Worker,
    Soldier,
    Guard,
    Spy,
    Sentry,
}

/// Equipment slot category. A unit class holds at most one item per category.
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
pub enum ItemCategory {
    Weapon,
    Armor,
    Gadget,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_unit_kind_parses_snake_case() {
        assert_eq!(UnitKind::from_str("sentry").unwrap(), UnitKind::Sentry);
        assert!(UnitKind::from_str("Sentry").is_err());
        assert_eq!(UnitKind::Soldier.to_string(), "soldier");
    }

    #[test]
    fn test_unit_kind_serde_matches_display() {
        let json = serde_json::to_string(&ItemCategory::Gadget).unwrap();
        assert_eq!(json, "\"gadget\"");
    }
}
