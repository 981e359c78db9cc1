//! Department-deletion impact check.
//!
//! A department deletes together with all its transitive child
//! departments and every position inside that set. Anything that would
//! orphan a person outside the set blocks; the engine only reports, the
//! caller deletes.

use std::collections::HashSet;

use kantor_core::{DepartmentId, PositionId, UserId};
use serde::Serialize;

use crate::error::{OrgError, Result};
use crate::snapshot::OrgSnapshot;

/// Impact report for deleting a department and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDeletionImpact {
    /// The department under deletion.
    pub department: DepartmentId,
    /// The affected set: the department plus all transitive children,
    /// breadth-first.
    pub affected_departments: Vec<DepartmentId>,
    /// Active users assigned to a department in the affected set.
    /// Non-empty blocks the deletion until they are reassigned.
    pub assigned_users: Vec<UserId>,
    /// Positions outside the affected set whose `reports_to` points
    /// inside it. Non-empty blocks: deleting would sever their edge.
    pub external_reporting_positions: Vec<PositionId>,
    /// Active users outside the affected set whose additional-supervisor
    /// list includes a holder of a position inside it. Non-empty blocks.
    pub external_supervisor_dependents: Vec<UserId>,
    /// Child departments that the deletion cascades to (the affected set
    /// minus the target itself). Informational, for the confirmation UI.
    pub cascade_departments: Vec<DepartmentId>,
    /// Every position inside the affected set, deleted by the cascade.
    pub cascade_positions: Vec<PositionId>,
}

impl DepartmentDeletionImpact {
    /// Whether the deletion must be refused until dependencies outside
    /// the affected set are resolved.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !self.assigned_users.is_empty()
            || !self.external_reporting_positions.is_empty()
            || !self.external_supervisor_dependents.is_empty()
    }
}

/// Compute the impact of deleting `target` and its subtree, without
/// mutating anything.
///
/// The external-dependency scan is single-hop: it flags edges that
/// terminate inside the affected set. Deeper chains degrade to the
/// tolerated `Vacant`/`Missing` variants on later resolution.
///
/// # Errors
///
/// [`OrgError::UnknownDepartment`] when `target` is not in the snapshot.
pub fn check_department_deletion(
    target: DepartmentId,
    snapshot: &OrgSnapshot,
) -> Result<DepartmentDeletionImpact> {
    if snapshot.department(target).is_none() {
        return Err(OrgError::UnknownDepartment { id: target });
    }

    let affected_departments = snapshot.affected_departments(target);
    let affected: HashSet<DepartmentId> = affected_departments.iter().copied().collect();

    let cascade_positions: Vec<PositionId> = snapshot
        .positions()
        .iter()
        .filter(|p| affected.contains(&p.department_id))
        .map(|p| p.id)
        .collect();
    let inside: HashSet<PositionId> = cascade_positions.iter().copied().collect();

    let assigned_users: Vec<UserId> = snapshot
        .users()
        .iter()
        .filter(|user| user.is_active)
        .filter(|user| {
            user.department_id
                .is_some_and(|department| affected.contains(&department))
        })
        .map(|user| user.id)
        .collect();

    let external_reporting_positions: Vec<PositionId> = snapshot
        .positions()
        .iter()
        .filter(|p| !affected.contains(&p.department_id))
        .filter(|p| p.reports_to.is_some_and(|target| inside.contains(&target)))
        .map(|p| p.id)
        .collect();

    // Holders of positions inside the set; references to them from the
    // outside would dangle once the cascade removes their positions.
    let inside_holders: HashSet<UserId> = snapshot
        .users()
        .iter()
        .filter(|user| user.is_active)
        .filter(|user| user.position_id.is_some_and(|p| inside.contains(&p)))
        .map(|user| user.id)
        .collect();

    let external_supervisor_dependents: Vec<UserId> = snapshot
        .users()
        .iter()
        .filter(|user| user.is_active)
        .filter(|user| {
            !user
                .department_id
                .is_some_and(|department| affected.contains(&department))
        })
        .filter(|user| {
            user.supervisor_ids
                .iter()
                .any(|id| inside_holders.contains(id))
        })
        .map(|user| user.id)
        .collect();

    let cascade_departments = affected_departments[1..].to_vec();

    Ok(DepartmentDeletionImpact {
        department: target,
        affected_departments,
        assigned_users,
        external_reporting_positions,
        external_supervisor_dependents,
        cascade_departments,
        cascade_positions,
    })
}
