//! Entity types for the organizational domain.
//!
//! All entities are plain data supplied by an external store; the engine
//! reads them as an immutable snapshot per call and never mutates them.
//! Wire names follow the platform's camelCase convention, including the
//! legacy `supervisorId` alias on users.

use std::fmt;

use kantor_core::{DepartmentId, OfficeId, PositionId, RecordId, UserId};
use serde::{Deserialize, Serialize};

/// A department in the organizational tree.
///
/// Departments form a parent-pointer forest: at most one parent, no
/// cycles. A department's positions are derived from the position list,
/// not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Unique identifier.
    pub id: DepartmentId,
    /// Department display name.
    pub name: String,
    /// Parent department, `None` for a root department.
    #[serde(rename = "parentDepartmentId")]
    pub parent_id: Option<DepartmentId>,
}

/// A position within a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Unique identifier.
    pub id: PositionId,
    /// The department this position belongs to.
    pub department_id: DepartmentId,
    /// Position display name.
    pub name: String,
    /// The position this one reports to, in the same or another
    /// department. `None` means no supervisor position is defined, which
    /// is read as "department head" when the position has no
    /// same-department parent.
    #[serde(rename = "reportsToPositionId")]
    pub reports_to: Option<PositionId>,
}

/// A member of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserWire")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// User display name.
    pub name: String,
    /// Whether the user is active. Inactive users never hold positions
    /// for resolution purposes and never appear in blocking lists.
    pub is_active: bool,
    /// The department the user is assigned to.
    pub department_id: Option<DepartmentId>,
    /// The position the user holds.
    pub position_id: Option<PositionId>,
    /// The office the user sits in. Offices live in another module of
    /// the platform; the id is carried as opaque data.
    pub office_id: Option<OfficeId>,
    /// Explicitly added additional supervisors, in insertion order.
    pub supervisor_ids: Vec<UserId>,
    /// Whether the position-derived default supervisor is disabled.
    /// Valid only while `supervisor_ids` is non-empty; the guards in the
    /// supervisor service enforce this.
    pub default_supervisor_disabled: bool,
}

impl User {
    /// Whether the user has at least one additional supervisor configured.
    #[must_use]
    pub fn has_additional_supervisors(&self) -> bool {
        !self.supervisor_ids.is_empty()
    }
}

/// Wire representation of [`User`].
///
/// Accepts the legacy single `supervisorId` field as an alias for a
/// one-element `supervisorIds` list. When both are present the explicit
/// list wins and the legacy field is dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    id: UserId,
    name: String,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    department_id: Option<DepartmentId>,
    #[serde(default)]
    position_id: Option<PositionId>,
    #[serde(default)]
    office_id: Option<OfficeId>,
    #[serde(default)]
    supervisor_ids: Vec<UserId>,
    /// Legacy single-supervisor field.
    #[serde(default)]
    supervisor_id: Option<UserId>,
    #[serde(default)]
    default_supervisor_disabled: bool,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        let supervisor_ids = if wire.supervisor_ids.is_empty() {
            wire.supervisor_id.into_iter().collect()
        } else {
            wire.supervisor_ids
        };
        Self {
            id: wire.id,
            name: wire.name,
            is_active: wire.is_active,
            department_id: wire.department_id,
            position_id: wire.position_id,
            office_id: wire.office_id,
            supervisor_ids,
            default_supervisor_disabled: wire.default_supervisor_disabled,
        }
    }
}

/// Category of a business record referencing a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    /// A company the user owns or represents.
    Company,
    /// A client account.
    Client,
    /// A project.
    Project,
    /// An estimate.
    Estimate,
    /// An invoice.
    Invoice,
    /// A task.
    Task,
    /// An address with a sales-rep assignment.
    Address,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company => write!(f, "company"),
            Self::Client => write!(f, "client"),
            Self::Project => write!(f, "project"),
            Self::Estimate => write!(f, "estimate"),
            Self::Invoice => write!(f, "invoice"),
            Self::Task => write!(f, "task"),
            Self::Address => write!(f, "address"),
        }
    }
}

/// A record owned by another module of the platform, consumed only by
/// the deactivation dependency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    /// Unique identifier.
    pub id: RecordId,
    /// Record category.
    pub kind: RecordKind,
    /// Human-readable label for confirmation dialogs.
    pub label: String,
    /// The user owning the record, if any.
    pub owner_id: Option<UserId>,
    /// Users assigned to the record.
    #[serde(default)]
    pub assignee_ids: Vec<UserId>,
}
