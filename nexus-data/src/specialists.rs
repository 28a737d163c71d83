//! Hired specialists: generals and scientists.

use crate::defines::specialists as defines;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialistKind {
    General,
    Scientist,
}

/// Per-turn upkeep owed by one specialist, split by resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialistUpkeep {
    pub credits: i64,
    pub protoform: i64,
}

impl SpecialistKind {
    pub fn upkeep(self) -> SpecialistUpkeep {
        match self {
            SpecialistKind::General => SpecialistUpkeep {
                credits: 0,
                protoform: defines::GENERAL_UPKEEP_PROTOFORM,
            },
            SpecialistKind::Scientist => SpecialistUpkeep {
                credits: defines::SCIENTIST_UPKEEP_CREDITS,
                protoform: 0,
            },
        }
    }

    pub fn hire_cost(self) -> i64 {
        match self {
            SpecialistKind::General => defines::GENERAL_HIRE_COST,
            SpecialistKind::Scientist => defines::SCIENTIST_HIRE_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upkeep_is_single_resource() {
        assert_eq!(SpecialistKind::General.upkeep().credits, 0);
        assert_eq!(SpecialistKind::General.upkeep().protoform, 500);
        assert_eq!(SpecialistKind::Scientist.upkeep().protoform, 0);
        assert_eq!(SpecialistKind::Scientist.upkeep().credits, 250);
    }
}
