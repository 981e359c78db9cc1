//! Effective-supervisor resolution and supervisor-list mutations.
//!
//! The resolver computes a user's default (position-derived) supervisor
//! and partitions the explicitly added additional supervisors. It never
//! fails on missing references: every "not found" condition is an
//! explicit variant of [`DefaultSupervisor`] or the dangling list, so
//! callers render warnings instead of error pages.

use kantor_core::{PositionId, UserId};
use serde::Serialize;
use thiserror::Error;

use crate::snapshot::OrgSnapshot;
use crate::types::User;

/// The position-derived supervisor of a user.
///
/// `Missing`, `Vacant`, and `Ambiguous` are degraded-but-informative
/// states, not errors: org data may be transiently inconsistent and the
/// view must still render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DefaultSupervisor {
    /// No default supervisor: the user has no resolvable position, or
    /// the default is disabled.
    None,
    /// The user's position is a department head; nobody stands above it
    /// in its own department.
    DepartmentHead,
    /// The reports-to link points at a position that no longer exists.
    Missing {
        /// The dangling target.
        position: PositionId,
    },
    /// The supervising position exists but no active user holds it.
    Vacant {
        /// The unoccupied position.
        position: PositionId,
    },
    /// Exactly one active user holds the supervising position.
    Person {
        /// The supervisor.
        user: User,
    },
    /// Multiple active users hold the supervising position. The caller
    /// must require an explicit choice; the resolver never guesses.
    Ambiguous {
        /// Every active holder, in snapshot order.
        holders: Vec<User>,
    },
}

impl DefaultSupervisor {
    /// Whether this is the `None` variant.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Result of resolving a user's supervisors against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSupervisors {
    /// The effective default supervisor (`None` when disabled).
    pub default_supervisor: DefaultSupervisor,
    /// What the default would be if it were not disabled, so callers
    /// can render "default (disabled): X".
    pub default_candidate: DefaultSupervisor,
    /// Additional supervisors that resolve to existing active users,
    /// in list order.
    pub additional: Vec<User>,
    /// Additional-supervisor ids that no longer resolve (unknown,
    /// inactive, or self-referential). Reported so the caller can offer
    /// a "clear invalid reference" remediation.
    pub dangling_additional: Vec<UserId>,
}

/// Compute the effective supervisors of `user` against `snapshot`.
#[must_use]
pub fn resolve_supervisors(user: &User, snapshot: &OrgSnapshot) -> EffectiveSupervisors {
    let default_candidate = resolve_default_candidate(user, snapshot);
    let default_supervisor = if user.default_supervisor_disabled {
        DefaultSupervisor::None
    } else {
        default_candidate.clone()
    };

    let mut additional = Vec::new();
    let mut dangling_additional = Vec::new();
    for &id in &user.supervisor_ids {
        match snapshot.user(id) {
            Some(supervisor) if supervisor.is_active && id != user.id => {
                additional.push(supervisor.clone());
            }
            _ => dangling_additional.push(id),
        }
    }

    tracing::debug!(
        user = %user.id,
        additional = additional.len(),
        dangling = dangling_additional.len(),
        "resolved supervisors"
    );

    EffectiveSupervisors {
        default_supervisor,
        default_candidate,
        additional,
        dangling_additional,
    }
}

fn resolve_default_candidate(user: &User, snapshot: &OrgSnapshot) -> DefaultSupervisor {
    // An unset or dangling position assignment yields no default at all;
    // the dangling case is additionally reported by the integrity scan.
    let Some(position) = user.position_id.and_then(|id| snapshot.position(id)) else {
        return DefaultSupervisor::None;
    };

    let Some(target) = position.reports_to else {
        return DefaultSupervisor::DepartmentHead;
    };

    let Some(supervising) = snapshot.position(target) else {
        return DefaultSupervisor::Missing { position: target };
    };

    let mut holders: Vec<User> = snapshot
        .active_holders(supervising.id)
        .iter()
        .filter_map(|&id| snapshot.user(id))
        .cloned()
        .collect();

    match holders.len() {
        0 => DefaultSupervisor::Vacant {
            position: supervising.id,
        },
        1 => DefaultSupervisor::Person {
            user: holders.remove(0),
        },
        _ => DefaultSupervisor::Ambiguous { holders },
    }
}

/// Verdict of the disable-default-supervisor guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum GuardVerdict {
    /// The mutation may proceed.
    Allowed,
    /// The mutation must be refused.
    Denied {
        /// Why it was denied.
        reason: DisableDenial,
    },
}

impl GuardVerdict {
    /// Whether the mutation may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Reason the disable guard denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
pub enum DisableDenial {
    /// Disabling would leave the user with zero supervisors.
    #[error("no additional supervisor would remain as fallback")]
    NoFallbackSupervisor,
}

/// Check whether the default supervisor may be disabled for `user`.
///
/// Denied exactly when no additional supervisor is configured, since the
/// user would otherwise be left with zero supervisors. Re-enabling is
/// always allowed and needs no guard.
#[must_use]
pub fn can_disable_default_supervisor(user: &User) -> GuardVerdict {
    if user.has_additional_supervisors() {
        GuardVerdict::Allowed
    } else {
        GuardVerdict::Denied {
            reason: DisableDenial::NoFallbackSupervisor,
        }
    }
}

/// Reason an additional-supervisor mutation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum SupervisorRejection {
    /// The candidate is already in the list.
    #[error("user {candidate} is already an additional supervisor")]
    AlreadyPresent {
        /// The duplicated candidate.
        candidate: UserId,
    },
    /// A user cannot supervise themselves.
    #[error("a user cannot be their own supervisor")]
    SelfSupervision,
}

/// Append `candidate` to the user's additional supervisors.
///
/// Rejects a duplicate or self-referential candidate; otherwise returns
/// the new list with the candidate appended. Append-only: the existing
/// order is preserved and nothing is sorted.
///
/// # Errors
///
/// [`SupervisorRejection`] when the candidate is already present or is
/// the user themselves. No partial mutation occurs.
pub fn add_additional_supervisor(
    user: &User,
    candidate: UserId,
) -> Result<Vec<UserId>, SupervisorRejection> {
    if candidate == user.id {
        return Err(SupervisorRejection::SelfSupervision);
    }
    if user.supervisor_ids.contains(&candidate) {
        return Err(SupervisorRejection::AlreadyPresent { candidate });
    }
    let mut new_ids = user.supervisor_ids.clone();
    new_ids.push(candidate);
    Ok(new_ids)
}

/// Outcome of removing an additional supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorRemoval {
    /// The supervisor list after removal.
    pub new_ids: Vec<UserId>,
    /// Whether the default supervisor must be re-enabled as a
    /// compensating action: removing the last additional supervisor
    /// while the default is disabled would otherwise leave the user
    /// with zero supervisors.
    pub reenable_default: bool,
}

/// Remove `id` from the user's additional supervisors.
///
/// Removing an id that is not listed is a no-op. Removing the last
/// remaining entry while the default supervisor is disabled sets
/// `reenable_default`; this is automatic, not a caller choice.
#[must_use]
pub fn remove_additional_supervisor(user: &User, id: UserId) -> SupervisorRemoval {
    if !user.supervisor_ids.contains(&id) {
        return SupervisorRemoval {
            new_ids: user.supervisor_ids.clone(),
            reenable_default: false,
        };
    }
    let new_ids: Vec<UserId> = user
        .supervisor_ids
        .iter()
        .copied()
        .filter(|&existing| existing != id)
        .collect();
    let reenable_default = user.default_supervisor_disabled && new_ids.is_empty();
    SupervisorRemoval {
        new_ids,
        reenable_default,
    }
}
