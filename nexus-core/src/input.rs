use crate::state::{PlayerId, Stat};
use crate::systems::Mission;
use nexus_data::{SpecialistKind, StructureKind, UnitKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInputs {
    pub player: PlayerId,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    // Economy
    UpgradeStructure {
        structure: StructureKind,
    },
    TrainUnits {
        unit: UnitKind,
        count: i64,
    },
    HireSpecialist {
        kind: SpecialistKind,
        count: i64,
    },
    DepositCredits {
        amount: i64,
    },

    // Armory
    BuyItem {
        item: String,
    },
    EquipItem {
        item: String,
    },

    // Edicts
    ActivateEdict {
        edict: String,
    },
    RevokeEdict {
        edict: String,
    },

    // Progression
    AllocateStat {
        stat: Stat,
        points: i64,
    },

    // Hostile
    Attack {
        target: PlayerId,
        attack_turns: i64,
    },
    Spy {
        target: PlayerId,
        mission: Mission,
        spies: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_read_from_json() {
        let json = r#"[
            {"command": "upgrade_structure", "structure": "embassy"},
            {"command": "train_units", "unit": "soldier", "count": 5},
            {"command": "spy", "target": 4, "mission": "assassination", "spies": 10}
        ]"#;
        let commands: Vec<Command> = serde_json::from_str(json).unwrap();
        assert_eq!(
            commands[0],
            Command::UpgradeStructure {
                structure: StructureKind::Embassy
            }
        );
        assert_eq!(
            commands[2],
            Command::Spy {
                target: PlayerId(4),
                mission: Mission::Assassination,
                spies: 10
            }
        );
    }
}
