//! Immutable organization snapshot with per-call indexes.
//!
//! Every resolution call works against an [`OrgSnapshot`] built from the
//! entity lists the external store supplies. Construction builds the
//! child/position/holder indexes once, so the services stay O(n) instead
//! of rescanning the entity lists per lookup.
//!
//! Construction rejects programmer-error inputs (duplicate ids, a
//! department parent cycle). Dangling references are *not* errors: they
//! are tolerated, reported by [`OrgSnapshot::integrity_warnings`], and
//! surfaced as explicit result variants by the services.

use std::collections::{HashMap, HashSet};

use kantor_core::{DepartmentId, PositionId, UserId};
use serde::Serialize;
use thiserror::Error;

use crate::types::{Department, Position, User};

/// Error for inputs a correct caller never produces.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotError {
    /// Two departments share an id.
    #[error("duplicate department id: {id}")]
    DuplicateDepartment {
        /// The duplicated id.
        id: DepartmentId,
    },

    /// Two positions share an id.
    #[error("duplicate position id: {id}")]
    DuplicatePosition {
        /// The duplicated id.
        id: PositionId,
    },

    /// Two users share an id.
    #[error("duplicate user id: {id}")]
    DuplicateUser {
        /// The duplicated id.
        id: UserId,
    },

    /// The department parent graph contains a cycle.
    #[error("department parent cycle involving {id}")]
    DepartmentCycle {
        /// A department on the cycle.
        id: DepartmentId,
    },
}

/// A tolerated inconsistency found in a snapshot.
///
/// Org data can be transiently inconsistent (a position deleted before
/// its holder was reassigned, a supervisor deactivated while still
/// listed). These are reported for rendering as warnings, never raised
/// as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityWarning {
    /// A position reports to a position that no longer exists.
    DanglingReportsTo {
        /// The position holding the stale link.
        position: PositionId,
        /// The id the link points at.
        target: PositionId,
    },
    /// A position belongs to a department that no longer exists.
    DanglingPositionDepartment {
        /// The orphaned position.
        position: PositionId,
        /// The missing department.
        department: DepartmentId,
    },
    /// A department's parent no longer exists.
    DanglingDepartmentParent {
        /// The orphaned department.
        department: DepartmentId,
        /// The missing parent.
        parent: DepartmentId,
    },
    /// A user is assigned to a position that no longer exists.
    DanglingUserPosition {
        /// The user holding the stale assignment.
        user: UserId,
        /// The missing position.
        position: PositionId,
    },
    /// A user is assigned to a department that no longer exists.
    DanglingUserDepartment {
        /// The user holding the stale assignment.
        user: UserId,
        /// The missing department.
        department: DepartmentId,
    },
    /// An additional-supervisor entry does not resolve to any user.
    DanglingAdditionalSupervisor {
        /// The user whose list holds the entry.
        user: UserId,
        /// The unresolvable id.
        supervisor: UserId,
    },
    /// An additional-supervisor entry resolves to an inactive user.
    InactiveAdditionalSupervisor {
        /// The user whose list holds the entry.
        user: UserId,
        /// The inactive supervisor.
        supervisor: UserId,
    },
    /// A user lists themselves as their own additional supervisor.
    SelfSupervision {
        /// The offending user.
        user: UserId,
    },
    /// The default supervisor is disabled but no additional supervisor
    /// remains. The guards make this unreachable through the engine; an
    /// external writer produced it.
    DisabledDefaultWithoutAdditional {
        /// The offending user.
        user: UserId,
    },
}

/// Immutable view of departments, positions, and users with id indexes.
#[derive(Debug, Clone)]
pub struct OrgSnapshot {
    departments: Vec<Department>,
    positions: Vec<Position>,
    users: Vec<User>,

    dept_index: HashMap<DepartmentId, usize>,
    position_index: HashMap<PositionId, usize>,
    user_index: HashMap<UserId, usize>,

    /// Child departments per parent, in input order.
    children: HashMap<DepartmentId, Vec<DepartmentId>>,
    /// Positions per department, in input order.
    dept_positions: HashMap<DepartmentId, Vec<PositionId>>,
    /// Active users per held position, in input order.
    holders: HashMap<PositionId, Vec<UserId>>,
}

impl OrgSnapshot {
    /// Build a snapshot and its indexes from entity lists.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] for duplicate ids or a department
    /// parent cycle. Dangling references are tolerated here and reported
    /// by [`Self::integrity_warnings`].
    pub fn new(
        departments: Vec<Department>,
        positions: Vec<Position>,
        users: Vec<User>,
    ) -> Result<Self, SnapshotError> {
        let mut dept_index = HashMap::with_capacity(departments.len());
        for (i, department) in departments.iter().enumerate() {
            if dept_index.insert(department.id, i).is_some() {
                return Err(SnapshotError::DuplicateDepartment { id: department.id });
            }
        }

        let mut position_index = HashMap::with_capacity(positions.len());
        for (i, position) in positions.iter().enumerate() {
            if position_index.insert(position.id, i).is_some() {
                return Err(SnapshotError::DuplicatePosition { id: position.id });
            }
        }

        let mut user_index = HashMap::with_capacity(users.len());
        for (i, user) in users.iter().enumerate() {
            if user_index.insert(user.id, i).is_some() {
                return Err(SnapshotError::DuplicateUser { id: user.id });
            }
        }

        detect_parent_cycle(&departments, &dept_index)?;

        let mut children: HashMap<DepartmentId, Vec<DepartmentId>> = HashMap::new();
        for department in &departments {
            if let Some(parent) = department.parent_id {
                children.entry(parent).or_default().push(department.id);
            }
        }

        let mut dept_positions: HashMap<DepartmentId, Vec<PositionId>> = HashMap::new();
        for position in &positions {
            dept_positions
                .entry(position.department_id)
                .or_default()
                .push(position.id);
        }

        let mut holders: HashMap<PositionId, Vec<UserId>> = HashMap::new();
        for user in &users {
            if !user.is_active {
                continue;
            }
            if let Some(position_id) = user.position_id {
                if position_index.contains_key(&position_id) {
                    holders.entry(position_id).or_default().push(user.id);
                }
            }
        }

        Ok(Self {
            departments,
            positions,
            users,
            dept_index,
            position_index,
            user_index,
            children,
            dept_positions,
            holders,
        })
    }

    /// Look up a department by id.
    #[must_use]
    pub fn department(&self, id: DepartmentId) -> Option<&Department> {
        self.dept_index.get(&id).map(|&i| &self.departments[i])
    }

    /// Look up a position by id.
    #[must_use]
    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.position_index.get(&id).map(|&i| &self.positions[i])
    }

    /// Look up a user by id.
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.user_index.get(&id).map(|&i| &self.users[i])
    }

    /// All departments, in input order.
    #[must_use]
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// All positions, in input order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// All users, in input order.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Direct child departments of `id`, in input order.
    #[must_use]
    pub fn children_of(&self, id: DepartmentId) -> &[DepartmentId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions belonging to department `id`, in input order.
    #[must_use]
    pub fn positions_in(&self, id: DepartmentId) -> &[PositionId] {
        self.dept_positions
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Active users holding position `id`, in input order.
    #[must_use]
    pub fn active_holders(&self, id: PositionId) -> &[UserId] {
        self.holders.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The department plus all its transitive children, breadth-first.
    ///
    /// The cycle check at construction guarantees termination.
    #[must_use]
    pub fn affected_departments(&self, root: DepartmentId) -> Vec<DepartmentId> {
        let mut affected = vec![root];
        let mut cursor = 0;
        while cursor < affected.len() {
            let current = affected[cursor];
            cursor += 1;
            affected.extend_from_slice(self.children_of(current));
        }
        affected
    }

    /// Whether `position` is a department head: no `reports_to` pointing
    /// within its own department (either none at all, or pointing to an
    /// external position, or dangling).
    #[must_use]
    pub fn is_department_head(&self, position: &Position) -> bool {
        match position.reports_to {
            None => true,
            Some(target) => match self.position(target) {
                // Dangling link: there is no same-department parent.
                None => true,
                Some(parent) => parent.department_id != position.department_id,
            },
        }
    }

    /// Enumerate every tolerated inconsistency in the snapshot.
    ///
    /// The order is deterministic: departments, then positions, then
    /// users, each in input order.
    #[must_use]
    pub fn integrity_warnings(&self) -> Vec<IntegrityWarning> {
        let mut warnings = Vec::new();

        for department in &self.departments {
            if let Some(parent) = department.parent_id {
                if !self.dept_index.contains_key(&parent) {
                    warnings.push(IntegrityWarning::DanglingDepartmentParent {
                        department: department.id,
                        parent,
                    });
                }
            }
        }

        for position in &self.positions {
            if !self.dept_index.contains_key(&position.department_id) {
                warnings.push(IntegrityWarning::DanglingPositionDepartment {
                    position: position.id,
                    department: position.department_id,
                });
            }
            if let Some(target) = position.reports_to {
                if !self.position_index.contains_key(&target) {
                    warnings.push(IntegrityWarning::DanglingReportsTo {
                        position: position.id,
                        target,
                    });
                }
            }
        }

        for user in &self.users {
            if let Some(position_id) = user.position_id {
                if !self.position_index.contains_key(&position_id) {
                    warnings.push(IntegrityWarning::DanglingUserPosition {
                        user: user.id,
                        position: position_id,
                    });
                }
            }
            if let Some(department_id) = user.department_id {
                if !self.dept_index.contains_key(&department_id) {
                    warnings.push(IntegrityWarning::DanglingUserDepartment {
                        user: user.id,
                        department: department_id,
                    });
                }
            }
            for &supervisor in &user.supervisor_ids {
                if supervisor == user.id {
                    warnings.push(IntegrityWarning::SelfSupervision { user: user.id });
                    continue;
                }
                match self.user(supervisor) {
                    None => warnings.push(IntegrityWarning::DanglingAdditionalSupervisor {
                        user: user.id,
                        supervisor,
                    }),
                    Some(resolved) if !resolved.is_active => {
                        warnings.push(IntegrityWarning::InactiveAdditionalSupervisor {
                            user: user.id,
                            supervisor,
                        });
                    }
                    Some(_) => {}
                }
            }
            if user.default_supervisor_disabled && user.supervisor_ids.is_empty() {
                warnings.push(IntegrityWarning::DisabledDefaultWithoutAdditional {
                    user: user.id,
                });
            }
        }

        if !warnings.is_empty() {
            tracing::warn!(count = warnings.len(), "org snapshot has integrity warnings");
        }
        warnings
    }
}

/// Walk every department's parent chain; revisiting a department within
/// one walk means the parent graph is not a forest.
fn detect_parent_cycle(
    departments: &[Department],
    dept_index: &HashMap<DepartmentId, usize>,
) -> Result<(), SnapshotError> {
    let mut known_safe: HashSet<DepartmentId> = HashSet::new();

    for department in departments {
        if known_safe.contains(&department.id) {
            continue;
        }
        let mut path: Vec<DepartmentId> = Vec::new();
        let mut on_path: HashSet<DepartmentId> = HashSet::new();
        let mut current = Some(department.id);

        while let Some(id) = current {
            if known_safe.contains(&id) {
                break;
            }
            if !on_path.insert(id) {
                return Err(SnapshotError::DepartmentCycle { id });
            }
            path.push(id);
            current = dept_index
                .get(&id)
                .and_then(|&i| departments[i].parent_id)
                // A dangling parent ends the chain; that is an integrity
                // warning, not a cycle.
                .filter(|parent| dept_index.contains_key(parent));
        }
        known_safe.extend(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kantor_core::OfficeId;

    fn department(name: &str, parent: Option<DepartmentId>) -> Department {
        Department {
            id: DepartmentId::new(),
            name: name.to_string(),
            parent_id: parent,
        }
    }

    fn position(name: &str, dept: DepartmentId, reports_to: Option<PositionId>) -> Position {
        Position {
            id: PositionId::new(),
            department_id: dept,
            name: name.to_string(),
            reports_to,
        }
    }

    fn user(name: &str, position: Option<PositionId>) -> User {
        User {
            id: UserId::new(),
            name: name.to_string(),
            is_active: true,
            department_id: None,
            position_id: position,
            office_id: None,
            supervisor_ids: vec![],
            default_supervisor_disabled: false,
        }
    }

    #[test]
    fn test_duplicate_department_rejected() {
        let d = department("Sales", None);
        let duplicate = d.clone();
        let result = OrgSnapshot::new(vec![d, duplicate], vec![], vec![]);
        assert!(matches!(
            result,
            Err(SnapshotError::DuplicateDepartment { .. })
        ));
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut a = department("A", None);
        let mut b = department("B", None);
        b.parent_id = Some(a.id);
        a.parent_id = Some(b.id);
        let result = OrgSnapshot::new(vec![a, b], vec![], vec![]);
        assert!(matches!(result, Err(SnapshotError::DepartmentCycle { .. })));
    }

    #[test]
    fn test_self_parent_rejected() {
        let mut a = department("A", None);
        a.parent_id = Some(a.id);
        let result = OrgSnapshot::new(vec![a], vec![], vec![]);
        assert!(matches!(result, Err(SnapshotError::DepartmentCycle { .. })));
    }

    #[test]
    fn test_dangling_parent_is_warning_not_cycle() {
        let a = department("A", Some(DepartmentId::new()));
        let snapshot = OrgSnapshot::new(vec![a], vec![], vec![]).unwrap();
        let warnings = snapshot.integrity_warnings();
        assert!(matches!(
            warnings.as_slice(),
            [IntegrityWarning::DanglingDepartmentParent { .. }]
        ));
    }

    #[test]
    fn test_children_and_positions_indexed_in_order() {
        let root = department("Root", None);
        let first = department("First", Some(root.id));
        let second = department("Second", Some(root.id));
        let p1 = position("Head", root.id, None);
        let p2 = position("Clerk", root.id, Some(p1.id));

        let snapshot = OrgSnapshot::new(
            vec![root.clone(), first.clone(), second.clone()],
            vec![p1.clone(), p2.clone()],
            vec![],
        )
        .unwrap();

        assert_eq!(snapshot.children_of(root.id), &[first.id, second.id]);
        assert_eq!(snapshot.positions_in(root.id), &[p1.id, p2.id]);
        assert!(snapshot.children_of(first.id).is_empty());
    }

    #[test]
    fn test_affected_departments_is_transitive() {
        let root = department("Root", None);
        let child = department("Child", Some(root.id));
        let grandchild = department("Grandchild", Some(child.id));
        let snapshot = OrgSnapshot::new(
            vec![root.clone(), child.clone(), grandchild.clone()],
            vec![],
            vec![],
        )
        .unwrap();

        assert_eq!(
            snapshot.affected_departments(root.id),
            vec![root.id, child.id, grandchild.id]
        );
        assert_eq!(
            snapshot.affected_departments(child.id),
            vec![child.id, grandchild.id]
        );
    }

    #[test]
    fn test_only_active_users_are_holders() {
        let dept = department("Sales", None);
        let pos = position("Estimator", dept.id, None);
        let active = user("Active", Some(pos.id));
        let mut inactive = user("Inactive", Some(pos.id));
        inactive.is_active = false;

        let snapshot = OrgSnapshot::new(
            vec![dept],
            vec![pos.clone()],
            vec![active.clone(), inactive],
        )
        .unwrap();

        assert_eq!(snapshot.active_holders(pos.id), &[active.id]);
    }

    #[test]
    fn test_department_head_variants() {
        let sales = department("Sales", None);
        let exec = department("Executive", None);
        let ceo = position("CEO", exec.id, None);
        let head = position("Sales Head", sales.id, Some(ceo.id));
        let clerk = position("Clerk", sales.id, Some(head.id));
        let orphan = position("Orphan", sales.id, Some(PositionId::new()));

        let snapshot = OrgSnapshot::new(
            vec![sales, exec],
            vec![ceo.clone(), head.clone(), clerk.clone(), orphan.clone()],
            vec![],
        )
        .unwrap();

        // No reports_to at all.
        assert!(snapshot.is_department_head(snapshot.position(ceo.id).unwrap()));
        // Reports to an executive position outside the department.
        assert!(snapshot.is_department_head(snapshot.position(head.id).unwrap()));
        // Reports within the department.
        assert!(!snapshot.is_department_head(snapshot.position(clerk.id).unwrap()));
        // Dangling link: no same-department parent remains.
        assert!(snapshot.is_department_head(snapshot.position(orphan.id).unwrap()));
    }

    #[test]
    fn test_integrity_warning_classes() {
        let dept = department("Sales", None);
        let pos = position("Estimator", dept.id, Some(PositionId::new()));

        let supervisor = user("Supervisor", None);
        let mut inactive_supervisor = user("Former", None);
        inactive_supervisor.is_active = false;

        let mut subject = user("Subject", Some(PositionId::new()));
        subject.department_id = Some(DepartmentId::new());
        subject.office_id = Some(OfficeId::new());
        subject.supervisor_ids = vec![
            subject.id,
            UserId::new(),
            inactive_supervisor.id,
            supervisor.id,
        ];

        let mut corrupted = user("Corrupted", None);
        corrupted.default_supervisor_disabled = true;

        let snapshot = OrgSnapshot::new(
            vec![dept],
            vec![pos],
            vec![supervisor, inactive_supervisor, subject, corrupted],
        )
        .unwrap();

        let warnings = snapshot.integrity_warnings();
        let has = |predicate: fn(&IntegrityWarning) -> bool| warnings.iter().any(predicate);

        assert!(has(|w| matches!(w, IntegrityWarning::DanglingReportsTo { .. })));
        assert!(has(|w| matches!(w, IntegrityWarning::DanglingUserPosition { .. })));
        assert!(has(|w| matches!(w, IntegrityWarning::DanglingUserDepartment { .. })));
        assert!(has(|w| matches!(w, IntegrityWarning::SelfSupervision { .. })));
        assert!(has(
            |w| matches!(w, IntegrityWarning::DanglingAdditionalSupervisor { .. })
        ));
        assert!(has(
            |w| matches!(w, IntegrityWarning::InactiveAdditionalSupervisor { .. })
        ));
        assert!(has(
            |w| matches!(w, IntegrityWarning::DisabledDefaultWithoutAdditional { .. })
        ));
    }

    #[test]
    fn test_clean_snapshot_has_no_warnings() {
        let dept = department("Sales", None);
        let head = position("Head", dept.id, None);
        let clerk = position("Clerk", dept.id, Some(head.id));
        let mut boss = user("Boss", Some(head.id));
        boss.department_id = Some(dept.id);
        let mut worker = user("Worker", Some(clerk.id));
        worker.department_id = Some(dept.id);
        worker.supervisor_ids = vec![boss.id];

        let snapshot = OrgSnapshot::new(vec![dept], vec![head, clerk], vec![boss, worker]).unwrap();
        assert!(snapshot.integrity_warnings().is_empty());
    }
}
