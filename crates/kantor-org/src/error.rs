//! Error types for the org-hierarchy engine.
//!
//! Domain-expected inconsistency (dangling references, ambiguity) never
//! shows up here: those are explicit result variants on the resolution
//! types. This error covers rejected mutation requests, blocked
//! structural edits, and programmer-error inputs.

use kantor_core::{DepartmentId, KantorError, PositionId, UserId};
use thiserror::Error;

use crate::services::department::DepartmentDeletionImpact;
use crate::services::position::PositionDeletionImpact;
use crate::services::supervisor::{DisableDenial, SupervisorRejection};
use crate::snapshot::SnapshotError;

/// Error type for the org-hierarchy engine.
#[derive(Debug, Error)]
pub enum OrgError {
    /// The snapshot input was malformed (duplicate id, parent cycle).
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// A user id that is not in the snapshot at all.
    #[error("unknown user: {id}")]
    UnknownUser {
        /// The unknown id.
        id: UserId,
    },

    /// A position id that is not in the snapshot at all.
    #[error("unknown position: {id}")]
    UnknownPosition {
        /// The unknown id.
        id: PositionId,
    },

    /// A department id that is not in the snapshot at all.
    #[error("unknown department: {id}")]
    UnknownDepartment {
        /// The unknown id.
        id: DepartmentId,
    },

    /// An additional-supervisor mutation was rejected.
    #[error(transparent)]
    Supervisor(#[from] SupervisorRejection),

    /// Disabling the default supervisor was denied by the guard.
    #[error("cannot disable default supervisor for {user}: {reason}")]
    DisableDenied {
        /// The user the disable was requested for.
        user: UserId,
        /// Why the guard denied it.
        reason: DisableDenial,
    },

    /// Position deletion is blocked by dependents that must be
    /// reassigned first.
    #[error(
        "position deletion blocked: {} assigned user(s), {} supervisor dependent(s)",
        impact.assigned_users.len(),
        impact.supervisor_dependents.len()
    )]
    PositionBlocked {
        /// The full impact report for the confirmation UI.
        impact: Box<PositionDeletionImpact>,
    },

    /// The position is a department head with reporting positions; a
    /// successor must be chosen before it can be deleted.
    #[error("position {} is a department head; choose a successor among its reporting positions", impact.position)]
    SuccessionRequired {
        /// The full impact report, including the candidate successors.
        impact: Box<PositionDeletionImpact>,
    },

    /// The chosen successor is not one of the reporting positions.
    #[error("successor {candidate} does not report to {position}")]
    InvalidSuccessor {
        /// The position being deleted.
        position: PositionId,
        /// The rejected successor choice.
        candidate: PositionId,
    },

    /// Department deletion is blocked by dependencies outside the
    /// affected set.
    #[error(
        "department deletion blocked: {} assigned user(s), {} external reporting position(s), {} external supervisor dependent(s)",
        impact.assigned_users.len(),
        impact.external_reporting_positions.len(),
        impact.external_supervisor_dependents.len()
    )]
    DepartmentBlocked {
        /// The full impact report for the confirmation UI.
        impact: Box<DepartmentDeletionImpact>,
    },

    /// A directory-level failure (lookup, uniqueness).
    #[error(transparent)]
    Core(#[from] KantorError),
}

/// Type alias for Results using [`OrgError`].
pub type Result<T> = std::result::Result<T, OrgError>;
