//! Organizational hierarchy engine.
//!
//! This crate provides the reporting-structure domain logic of the
//! kantor platform: who supervises whom, and what has to happen before
//! a structural edit is safe.
//!
//! # Features
//!
//! - Effective-supervisor resolution (position-derived default plus
//!   explicitly added additional supervisors, with disable semantics)
//! - Guards for supervisor mutations (disable fallback rule, duplicate
//!   and self-supervision rejection, forced re-enable on last removal)
//! - Position-deletion impact checks with department-head succession
//!   planning
//! - Recursive department-deletion impact checks with cascade reporting
//! - Advisory deactivation dependency summaries with bulk reassignment
//!   planning
//! - Snapshot integrity scanning for tolerated inconsistencies
//!   (dangling references)
//! - Audit logging for all applied org-structure changes
//!
//! # Services
//!
//! The [`services`] module provides the rule logic:
//! - [`services::supervisor`] - effective-supervisor resolution and
//!   supervisor-list mutations
//! - [`services::position`] - position-deletion impact and succession
//! - [`services::department`] - department-deletion impact and cascade
//! - [`services::deactivation`] - deactivation dependencies and
//!   reassignment
//!
//! All of them are pure functions over an [`OrgSnapshot`]; the only
//! mutable module is [`directory`], whose store re-checks every
//! mutation against a fresh snapshot immediately before applying it.
//!
//! # Audit
//!
//! The [`audit`] module records applied changes:
//! - [`audit::AuditStore`] trait for pluggable storage backends
//! - [`audit::InMemoryAuditStore`] for testing
//! - [`audit::OrgAuditEvent`] for tracking changes

pub mod audit;
pub mod directory;
pub mod error;
pub mod services;
pub mod snapshot;
pub mod types;

// Re-export commonly used types
pub use error::{OrgError, Result};
pub use snapshot::{IntegrityWarning, OrgSnapshot, SnapshotError};
pub use types::{BusinessRecord, Department, Position, RecordKind, User};

// Re-export service types
pub use services::{
    add_additional_supervisor, can_disable_default_supervisor, check_department_deletion,
    check_position_deletion, check_user_deactivation, plan_position_deletion, plan_reassignment,
    remove_additional_supervisor, resolve_supervisors, DefaultSupervisor, DependencyGroup,
    DependencyItem, DependencySummary, DepartmentDeletionImpact, DisableDenial,
    EffectiveSupervisors, GuardVerdict, PositionDeletionImpact, PositionDeletionPlan,
    ReassignAction, RepointAction, SuccessionChoice, SupervisorRejection, SupervisorRemoval,
};

// Re-export store and audit types
pub use audit::{AuditStore, InMemoryAuditStore, OrgAuditAction, OrgAuditEvent, OrgAuditEventInput};
pub use directory::{InMemoryOrgStore, OrgStore};
