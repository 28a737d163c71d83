//! Alliance operations.
//!
//! Members' turn income accrues to their alliance's active operations. After
//! every batch, [`advance_operations`] moves each operation along
//! `Active → Completed | Failed`. Terminal states are never left.

use crate::calculator::IncomeReport;
use crate::state::{
    AllianceOperation, AllianceRecord, OperationKind, OperationStatus, TurnNumber,
};
use serde::{Deserialize, Serialize};

/// Relative contribution recorded during a player's turn, applied to the
/// alliance at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContribution {
    pub operation: u32,
    pub amount: i64,
}

fn accepts(op: &AllianceOperation, turn: TurnNumber) -> bool {
    op.status == OperationStatus::Active && turn <= op.deadline
}

/// Contributions a member with `income` makes on `turn`.
pub fn contributions_for(
    operations: &[AllianceOperation],
    income: &IncomeReport,
    turn: TurnNumber,
) -> Vec<OperationContribution> {
    operations
        .iter()
        .filter(|op| accepts(op, turn))
        .map(|op| OperationContribution {
            operation: op.id,
            amount: match op.kind {
                OperationKind::CreditDrive => income.credits,
                OperationKind::Recruitment => income.citizens,
                OperationKind::Research => income.research_data,
            },
        })
        .filter(|c| c.amount > 0)
        .collect()
}

/// Add a contribution. Ignored once the operation is terminal.
pub fn apply_contribution(
    alliance: &mut AllianceRecord,
    contribution: &OperationContribution,
    turn: TurnNumber,
) -> bool {
    match alliance
        .operations
        .iter_mut()
        .find(|op| op.id == contribution.operation)
    {
        Some(op) if accepts(op, turn) => {
            op.contributed = op.contributed.saturating_add(contribution.amount);
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTransition {
    pub operation: u32,
    pub name: String,
    pub status: OperationStatus,
}

/// Resolve every active operation whose outcome is decided at `turn`.
pub fn advance_operations(alliance: &mut AllianceRecord, turn: TurnNumber) -> Vec<OperationTransition> {
    let mut transitions = Vec::new();
    for op in alliance.operations.iter_mut() {
        if op.status.is_terminal() {
            continue;
        }
        let next = if op.contributed >= op.target {
            OperationStatus::Completed(turn)
        } else if turn >= op.deadline {
            OperationStatus::Failed(turn)
        } else {
            continue;
        };
        op.status = next;
        log::info!(
            "{}: operation '{}' {:?} ({}/{})",
            alliance.id,
            op.name,
            next,
            op.contributed,
            op.target
        );
        transitions.push(OperationTransition {
            operation: op.id,
            name: op.name.clone(),
            status: next,
        });
    }
    transitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed;

    fn op(id: u32, kind: OperationKind, target: i64, deadline: TurnNumber) -> AllianceOperation {
        AllianceOperation {
            id,
            name: format!("op{id}"),
            kind,
            target,
            contributed: 0,
            deadline,
            status: OperationStatus::Active,
        }
    }

    fn income(credits: i64, citizens: i64) -> IncomeReport {
        IncomeReport {
            credits,
            citizens,
            research_data: 0,
            protoform: Fixed::ZERO,
            dark_matter: Fixed::ZERO,
            bank_interest: 0,
        }
    }

    #[test]
    fn test_completes_when_target_reached() {
        let mut alliance = AllianceRecord {
            operations: vec![op(1, OperationKind::CreditDrive, 1_500, 5)],
            ..Default::default()
        };
        for c in contributions_for(&alliance.operations, &income(1_000, 3), 1) {
            assert!(apply_contribution(&mut alliance, &c, 1));
        }
        assert!(advance_operations(&mut alliance, 1).is_empty());

        for c in contributions_for(&alliance.operations, &income(1_000, 3), 2) {
            apply_contribution(&mut alliance, &c, 2);
        }
        let transitions = advance_operations(&mut alliance, 2);
        assert_eq!(transitions.len(), 1);
        assert_eq!(alliance.operations[0].status, OperationStatus::Completed(2));
    }

    #[test]
    fn test_fails_after_deadline() {
        let mut alliance = AllianceRecord {
            operations: vec![op(1, OperationKind::Recruitment, 100, 3)],
            ..Default::default()
        };
        advance_operations(&mut alliance, 2);
        assert_eq!(alliance.operations[0].status, OperationStatus::Active);
        advance_operations(&mut alliance, 3);
        assert_eq!(alliance.operations[0].status, OperationStatus::Failed(3));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut alliance = AllianceRecord {
            operations: vec![op(1, OperationKind::CreditDrive, 10, 3)],
            ..Default::default()
        };
        advance_operations(&mut alliance, 3);
        assert_eq!(alliance.operations[0].status, OperationStatus::Failed(3));

        // Late contributions neither count nor revive the operation.
        let late = OperationContribution {
            operation: 1,
            amount: 1_000,
        };
        assert!(!apply_contribution(&mut alliance, &late, 4));
        assert!(advance_operations(&mut alliance, 4).is_empty());
        assert_eq!(alliance.operations[0].contributed, 0);
        assert_eq!(alliance.operations[0].status, OperationStatus::Failed(3));
    }

    #[test]
    fn test_contribution_follows_kind() {
        let ops = vec![
            op(1, OperationKind::CreditDrive, 10, 9),
            op(2, OperationKind::Recruitment, 10, 9),
            op(3, OperationKind::Research, 10, 9),
        ];
        let contributions = contributions_for(&ops, &income(700, 8), 1);
        assert_eq!(
            contributions,
            vec![
                OperationContribution {
                    operation: 1,
                    amount: 700
                },
                OperationContribution {
                    operation: 2,
                    amount: 8
                },
            ]
        );
    }
}
