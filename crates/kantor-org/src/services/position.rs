//! Position-deletion impact check and succession planning.
//!
//! The check computes, without mutating anything, who and what depends
//! on a position. Dependents that would orphan a *person* (assigned
//! users, supervisor references) block the deletion; the position graph
//! itself can be repaired deterministically and only needs a successor
//! decision when the deleted position is a department head.

use std::collections::HashSet;

use kantor_core::{DepartmentId, PositionId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{OrgError, Result};
use crate::snapshot::OrgSnapshot;

/// Impact report for deleting a position. Purely informational; nothing
/// has been changed when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDeletionImpact {
    /// The position under deletion.
    pub position: PositionId,
    /// The department it belongs to.
    pub department: DepartmentId,
    /// Whether the position is a department head.
    pub is_department_head: bool,
    /// Active users holding the position. Non-empty blocks the deletion
    /// until they are reassigned.
    pub assigned_users: Vec<UserId>,
    /// Users whose additional-supervisor list includes a current holder
    /// of the position. Non-empty blocks the deletion.
    pub supervisor_dependents: Vec<UserId>,
    /// Positions reporting to the target. Never blocking, but a
    /// department head with reporting positions needs a successor.
    pub reporting_positions: Vec<PositionId>,
    /// Whether a successor must be chosen before deletion may proceed.
    pub needs_succession: bool,
    /// Where reporting positions are re-pointed when no succession is
    /// needed: the target's own `reports_to`. A visible side effect the
    /// caller must disclose before confirming.
    pub fallback_reports_to: Option<PositionId>,
}

impl PositionDeletionImpact {
    /// Whether the deletion must be refused until dependents are
    /// resolved.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.assigned_users.is_empty() || !self.supervisor_dependents.is_empty()
    }
}

/// The successor decision for deleting a department head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessionChoice {
    /// The reporting position promoted to department head.
    pub new_head: PositionId,
    /// Whether the new head inherits the deleted head's external
    /// ("executive") supervisor link.
    pub inherit_executive_link: bool,
}

/// A single re-point of a position's `reports_to` link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepointAction {
    /// The position whose link changes.
    pub position: PositionId,
    /// Its new `reports_to` value.
    pub new_reports_to: Option<PositionId>,
}

/// The full, apply-ready consequence of deleting a position. The engine
/// reports; the store (or caller) applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDeletionPlan {
    /// The position to remove.
    pub position: PositionId,
    /// The promoted successor, when the target was a department head
    /// with reporting positions.
    pub successor: Option<PositionId>,
    /// Every `reports_to` re-point to apply before removal.
    pub repoint: Vec<RepointAction>,
}

/// Compute the impact of deleting `target`, without mutating anything.
///
/// # Errors
///
/// [`OrgError::UnknownPosition`] when `target` is not in the snapshot.
pub fn check_position_deletion(
    target: PositionId,
    snapshot: &OrgSnapshot,
) -> Result<PositionDeletionImpact> {
    let position = snapshot
        .position(target)
        .ok_or(OrgError::UnknownPosition { id: target })?;

    let assigned_users = snapshot.active_holders(target).to_vec();
    let holders: HashSet<UserId> = assigned_users.iter().copied().collect();

    let supervisor_dependents: Vec<UserId> = snapshot
        .users()
        .iter()
        .filter(|user| user.is_active)
        .filter(|user| user.supervisor_ids.iter().any(|id| holders.contains(id)))
        .map(|user| user.id)
        .collect();

    let reporting_positions: Vec<PositionId> = snapshot
        .positions()
        .iter()
        .filter(|p| p.id != target && p.reports_to == Some(target))
        .map(|p| p.id)
        .collect();

    let is_department_head = snapshot.is_department_head(position);
    let needs_succession = is_department_head && !reporting_positions.is_empty();

    Ok(PositionDeletionImpact {
        position: target,
        department: position.department_id,
        is_department_head,
        assigned_users,
        supervisor_dependents,
        reporting_positions,
        needs_succession,
        fallback_reports_to: position.reports_to,
    })
}

/// Turn an impact check into an apply-ready plan.
///
/// Refuses while dependents block the deletion, and refuses a
/// department-head deletion without a valid successor. A succession
/// choice supplied when none is needed is ignored: reporting positions
/// are re-pointed to the target's own `reports_to` in that case.
///
/// # Errors
///
/// - [`OrgError::UnknownPosition`] for a target not in the snapshot;
/// - [`OrgError::PositionBlocked`] while blocking dependents remain;
/// - [`OrgError::SuccessionRequired`] for a department head with
///   reporting positions and no choice supplied;
/// - [`OrgError::InvalidSuccessor`] when the choice is not one of the
///   reporting positions.
pub fn plan_position_deletion(
    target: PositionId,
    succession: Option<SuccessionChoice>,
    snapshot: &OrgSnapshot,
) -> Result<PositionDeletionPlan> {
    let impact = check_position_deletion(target, snapshot)?;

    if impact.is_blocking() {
        return Err(OrgError::PositionBlocked {
            impact: Box::new(impact),
        });
    }

    let plan = if impact.needs_succession {
        let Some(choice) = succession else {
            return Err(OrgError::SuccessionRequired {
                impact: Box::new(impact),
            });
        };
        if !impact.reporting_positions.contains(&choice.new_head) {
            return Err(OrgError::InvalidSuccessor {
                position: target,
                candidate: choice.new_head,
            });
        }

        let mut repoint = Vec::with_capacity(impact.reporting_positions.len());
        // The successor takes over the head slot, optionally keeping the
        // deleted head's external supervisor link.
        repoint.push(RepointAction {
            position: choice.new_head,
            new_reports_to: if choice.inherit_executive_link {
                impact.fallback_reports_to
            } else {
                None
            },
        });
        for &reporting in &impact.reporting_positions {
            if reporting != choice.new_head {
                repoint.push(RepointAction {
                    position: reporting,
                    new_reports_to: Some(choice.new_head),
                });
            }
        }

        PositionDeletionPlan {
            position: target,
            successor: Some(choice.new_head),
            repoint,
        }
    } else {
        let repoint = impact
            .reporting_positions
            .iter()
            .map(|&reporting| RepointAction {
                position: reporting,
                new_reports_to: impact.fallback_reports_to,
            })
            .collect();
        PositionDeletionPlan {
            position: target,
            successor: None,
            repoint,
        }
    };

    tracing::debug!(
        position = %target,
        successor = ?plan.successor,
        repoints = plan.repoint.len(),
        "planned position deletion"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Department, Position, User};

    struct Org {
        departments: Vec<Department>,
        positions: Vec<Position>,
        users: Vec<User>,
    }

    impl Org {
        fn new() -> Self {
            Self {
                departments: vec![],
                positions: vec![],
                users: vec![],
            }
        }

        fn department(&mut self, name: &str) -> DepartmentId {
            let id = DepartmentId::new();
            self.departments.push(Department {
                id,
                name: name.to_string(),
                parent_id: None,
            });
            id
        }

        fn position(
            &mut self,
            name: &str,
            department: DepartmentId,
            reports_to: Option<PositionId>,
        ) -> PositionId {
            let id = PositionId::new();
            self.positions.push(Position {
                id,
                department_id: department,
                name: name.to_string(),
                reports_to,
            });
            id
        }

        fn user(&mut self, name: &str, position: Option<PositionId>) -> UserId {
            let id = UserId::new();
            self.users.push(User {
                id,
                name: name.to_string(),
                is_active: true,
                department_id: None,
                position_id: position,
                office_id: None,
                supervisor_ids: vec![],
                default_supervisor_disabled: false,
            });
            id
        }

        fn snapshot(&self) -> OrgSnapshot {
            OrgSnapshot::new(
                self.departments.clone(),
                self.positions.clone(),
                self.users.clone(),
            )
            .unwrap()
        }
    }

    #[test]
    fn test_unknown_position_is_an_error() {
        let org = Org::new();
        let result = check_position_deletion(PositionId::new(), &org.snapshot());
        assert!(matches!(result, Err(OrgError::UnknownPosition { .. })));
    }

    #[test]
    fn test_assigned_users_block() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let estimator = org.position("Estimator", sales, None);
        let holder = org.user("Holder", Some(estimator));

        let impact = check_position_deletion(estimator, &org.snapshot()).unwrap();
        assert_eq!(impact.assigned_users, vec![holder]);
        assert!(impact.is_blocking());

        let result = plan_position_deletion(estimator, None, &org.snapshot());
        assert!(matches!(result, Err(OrgError::PositionBlocked { .. })));
    }

    #[test]
    fn test_inactive_holder_does_not_block() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let estimator = org.position("Estimator", sales, None);
        let holder = org.user("Former", Some(estimator));
        org.users.iter_mut().find(|u| u.id == holder).unwrap().is_active = false;

        let impact = check_position_deletion(estimator, &org.snapshot()).unwrap();
        assert!(impact.assigned_users.is_empty());
        assert!(!impact.is_blocking());
    }

    #[test]
    fn test_supervisor_reference_to_holder_blocks() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let estimator = org.position("Estimator", sales, None);
        let clerk = org.position("Clerk", sales, Some(estimator));
        let holder = org.user("Holder", Some(estimator));
        let dependent = org.user("Dependent", Some(clerk));
        org.users
            .iter_mut()
            .find(|u| u.id == dependent)
            .unwrap()
            .supervisor_ids = vec![holder];

        let impact = check_position_deletion(estimator, &org.snapshot()).unwrap();
        assert_eq!(impact.supervisor_dependents, vec![dependent]);
        assert!(impact.is_blocking());
    }

    #[test]
    fn test_department_head_with_reports_needs_succession() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let estimator = org.position("Estimator", sales, None);
        let junior = org.position("Junior Estimator", sales, Some(estimator));
        let coordinator = org.position("Coordinator", sales, Some(estimator));

        let impact = check_position_deletion(estimator, &org.snapshot()).unwrap();
        assert!(impact.is_department_head);
        assert!(impact.needs_succession);
        assert_eq!(impact.reporting_positions, vec![junior, coordinator]);
        assert!(!impact.is_blocking());

        // Without a successor the plan is refused.
        let result = plan_position_deletion(estimator, None, &org.snapshot());
        assert!(matches!(result, Err(OrgError::SuccessionRequired { .. })));
    }

    #[test]
    fn test_succession_repoints_remaining_reports_to_new_head() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let estimator = org.position("Estimator", sales, None);
        let junior = org.position("Junior Estimator", sales, Some(estimator));
        let coordinator = org.position("Coordinator", sales, Some(estimator));

        let plan = plan_position_deletion(
            estimator,
            Some(SuccessionChoice {
                new_head: junior,
                inherit_executive_link: false,
            }),
            &org.snapshot(),
        )
        .unwrap();

        assert_eq!(plan.position, estimator);
        assert_eq!(plan.successor, Some(junior));
        assert_eq!(
            plan.repoint,
            vec![
                RepointAction {
                    position: junior,
                    new_reports_to: None,
                },
                RepointAction {
                    position: coordinator,
                    new_reports_to: Some(junior),
                },
            ]
        );
    }

    #[test]
    fn test_successor_can_inherit_executive_link() {
        let mut org = Org::new();
        let exec = org.department("Executive");
        let sales = org.department("Sales");
        let ceo = org.position("CEO", exec, None);
        let head = org.position("Head of Sales", sales, Some(ceo));
        let junior = org.position("Junior", sales, Some(head));

        let plan = plan_position_deletion(
            head,
            Some(SuccessionChoice {
                new_head: junior,
                inherit_executive_link: true,
            }),
            &org.snapshot(),
        )
        .unwrap();

        assert_eq!(
            plan.repoint,
            vec![RepointAction {
                position: junior,
                new_reports_to: Some(ceo),
            }]
        );
    }

    #[test]
    fn test_successor_must_be_a_reporting_position() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let estimator = org.position("Estimator", sales, None);
        let _junior = org.position("Junior", sales, Some(estimator));
        let unrelated = org.position("Unrelated", sales, None);

        let result = plan_position_deletion(
            estimator,
            Some(SuccessionChoice {
                new_head: unrelated,
                inherit_executive_link: false,
            }),
            &org.snapshot(),
        );
        assert!(matches!(result, Err(OrgError::InvalidSuccessor { .. })));
    }

    #[test]
    fn test_non_head_repoints_to_its_own_parent() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let head = org.position("Head", sales, None);
        let lead = org.position("Lead", sales, Some(head));
        let clerk = org.position("Clerk", sales, Some(lead));

        let plan = plan_position_deletion(lead, None, &org.snapshot()).unwrap();
        assert_eq!(plan.successor, None);
        assert_eq!(
            plan.repoint,
            vec![RepointAction {
                position: clerk,
                new_reports_to: Some(head),
            }]
        );
    }

    #[test]
    fn test_leaf_position_deletes_without_plan_actions() {
        let mut org = Org::new();
        let sales = org.department("Sales");
        let head = org.position("Head", sales, None);
        let clerk = org.position("Clerk", sales, Some(head));

        let plan = plan_position_deletion(clerk, None, &org.snapshot()).unwrap();
        assert!(plan.repoint.is_empty());
        assert_eq!(plan.successor, None);
    }
}
