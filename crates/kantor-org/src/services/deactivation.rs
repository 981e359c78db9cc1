//! Deactivation dependency check and reassignment planning.
//!
//! Unlike the structural deletion checks, deactivation is advisory:
//! it always proceeds. The summary exists so the confirmation dialog
//! can show what the user still owns and offer a bulk reassignment in
//! the same step.

use kantor_core::{KantorError, RecordId, UserId};
use serde::Serialize;

use crate::error::{OrgError, Result};
use crate::services::supervisor::{resolve_supervisors, DefaultSupervisor};
use crate::snapshot::OrgSnapshot;
use crate::types::{BusinessRecord, RecordKind};

/// A single record referencing the user under deactivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyItem {
    /// The referencing record.
    pub record: RecordId,
    /// Human-readable label for the dialog.
    pub label: String,
    /// The user owns the record.
    pub as_owner: bool,
    /// The user is assigned to the record.
    pub as_assignee: bool,
}

/// All records of one kind referencing the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    /// The record category.
    pub kind: RecordKind,
    /// Referencing records, in input order.
    pub items: Vec<DependencyItem>,
}

/// Everything that references a user, grouped for the deactivation
/// confirmation dialog. Advisory only: deactivation is never blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySummary {
    /// The user under deactivation.
    pub user: UserId,
    /// Business records referencing the user, grouped by kind in
    /// first-seen order.
    pub groups: Vec<DependencyGroup>,
    /// Active users listing the target as an additional supervisor.
    pub supervised_users: Vec<UserId>,
    /// Active users whose default supervisor currently resolves to the
    /// target. After deactivation they degrade to a vacant default.
    pub default_reports: Vec<UserId>,
}

impl DependencySummary {
    /// Total number of referencing business records.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    /// Whether nothing references the user at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.supervised_users.is_empty()
            && self.default_reports.is_empty()
    }
}

/// A single record handover, produced by [`plan_reassignment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignAction {
    /// The record to hand over.
    pub record: RecordId,
    /// The record category.
    pub kind: RecordKind,
    /// The receiving user. Owner and assignee references to the
    /// deactivated user are both rewritten to this id.
    pub to: UserId,
}

/// Enumerate everything referencing `target`, grouped for display.
///
/// # Errors
///
/// [`OrgError::UnknownUser`] when `target` is not in the snapshot.
pub fn check_user_deactivation(
    target: UserId,
    snapshot: &OrgSnapshot,
    records: &[BusinessRecord],
) -> Result<DependencySummary> {
    if snapshot.user(target).is_none() {
        return Err(OrgError::UnknownUser { id: target });
    }

    let mut groups: Vec<DependencyGroup> = Vec::new();
    for record in records {
        let as_owner = record.owner_id == Some(target);
        let as_assignee = record.assignee_ids.contains(&target);
        if !as_owner && !as_assignee {
            continue;
        }
        let item = DependencyItem {
            record: record.id,
            label: record.label.clone(),
            as_owner,
            as_assignee,
        };
        match groups.iter_mut().find(|group| group.kind == record.kind) {
            Some(group) => group.items.push(item),
            None => groups.push(DependencyGroup {
                kind: record.kind,
                items: vec![item],
            }),
        }
    }

    let supervised_users: Vec<UserId> = snapshot
        .users()
        .iter()
        .filter(|user| user.is_active && user.id != target)
        .filter(|user| user.supervisor_ids.contains(&target))
        .map(|user| user.id)
        .collect();

    let default_reports: Vec<UserId> = snapshot
        .users()
        .iter()
        .filter(|user| user.is_active && user.id != target)
        .filter(|user| {
            matches!(
                &resolve_supervisors(user, snapshot).default_supervisor,
                DefaultSupervisor::Person { user: supervisor } if supervisor.id == target
            )
        })
        .map(|user| user.id)
        .collect();

    let summary = DependencySummary {
        user: target,
        groups,
        supervised_users,
        default_reports,
    };
    tracing::debug!(
        user = %target,
        records = summary.total_records(),
        supervised = summary.supervised_users.len(),
        "computed deactivation dependencies"
    );
    Ok(summary)
}

/// Produce the bulk handover of every summarized record to `new_owner`.
///
/// Optional: deactivation proceeds regardless; this only backs the
/// "reassign everything to X" choice in the confirmation dialog.
///
/// # Errors
///
/// [`OrgError::UnknownUser`] when `new_owner` is not in the snapshot;
/// a validation error when `new_owner` is inactive or is the user being
/// deactivated.
pub fn plan_reassignment(
    summary: &DependencySummary,
    new_owner: UserId,
    snapshot: &OrgSnapshot,
) -> Result<Vec<ReassignAction>> {
    let receiver = snapshot
        .user(new_owner)
        .ok_or(OrgError::UnknownUser { id: new_owner })?;
    if !receiver.is_active {
        return Err(KantorError::ValidationError {
            field: "newOwner".to_string(),
            message: "must be an active user".to_string(),
        }
        .into());
    }
    if new_owner == summary.user {
        return Err(KantorError::ValidationError {
            field: "newOwner".to_string(),
            message: "cannot reassign to the user being deactivated".to_string(),
        }
        .into());
    }

    Ok(summary
        .groups
        .iter()
        .flat_map(|group| {
            group.items.iter().map(|item| ReassignAction {
                record: item.record,
                kind: group.kind,
                to: new_owner,
            })
        })
        .collect())
}
