//! Audit logging for org-structure changes.
//!
//! Every applied mutation (supervisor edits, structural deletions,
//! deactivation) is recorded with before/after state so administrators
//! can reconstruct who changed the reporting structure and when.
//!
//! # Example
//!
//! ```rust,ignore
//! use kantor_org::audit::{AuditStore, InMemoryAuditStore, OrgAuditAction, OrgAuditEventInput};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryAuditStore::new());
//! let input = OrgAuditEventInput {
//!     action: OrgAuditAction::AdditionalSupervisorAdded,
//!     actor_id: actor,
//!     user_id: Some(subject),
//!     ..Default::default()
//! };
//! let event = store.log_event(input).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kantor_core::{DepartmentId, PositionId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// Action recorded by an org audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrgAuditAction {
    /// The position-derived default supervisor was disabled.
    #[default]
    DefaultSupervisorDisabled,
    /// The position-derived default supervisor was re-enabled.
    DefaultSupervisorEnabled,
    /// An additional supervisor was appended.
    AdditionalSupervisorAdded,
    /// An additional supervisor was removed.
    AdditionalSupervisorRemoved,
    /// Unresolvable additional-supervisor entries were cleared.
    DanglingSupervisorsCleared,
    /// A position was deleted (with its re-point plan applied).
    PositionDeleted,
    /// A department and its subtree were deleted.
    DepartmentDeleted,
    /// A user was deactivated.
    UserDeactivated,
    /// A user was reactivated.
    UserReactivated,
}

impl std::fmt::Display for OrgAuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefaultSupervisorDisabled => write!(f, "default_supervisor_disabled"),
            Self::DefaultSupervisorEnabled => write!(f, "default_supervisor_enabled"),
            Self::AdditionalSupervisorAdded => write!(f, "additional_supervisor_added"),
            Self::AdditionalSupervisorRemoved => write!(f, "additional_supervisor_removed"),
            Self::DanglingSupervisorsCleared => write!(f, "dangling_supervisors_cleared"),
            Self::PositionDeleted => write!(f, "position_deleted"),
            Self::DepartmentDeleted => write!(f, "department_deleted"),
            Self::UserDeactivated => write!(f, "user_deactivated"),
            Self::UserReactivated => write!(f, "user_reactivated"),
        }
    }
}

/// An audit event for an org-structure change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgAuditEvent {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// Action performed.
    pub action: OrgAuditAction,
    /// The user the change was about (if any).
    pub user_id: Option<UserId>,
    /// The position involved (if any).
    pub position_id: Option<PositionId>,
    /// The department involved (if any).
    pub department_id: Option<DepartmentId>,
    /// Who performed the action.
    pub actor_id: UserId,
    /// State before the change (JSON).
    pub before_state: Option<serde_json::Value>,
    /// State after the change (JSON).
    pub after_state: Option<serde_json::Value>,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Additional metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Input for creating an audit event.
#[derive(Debug, Clone, Default)]
pub struct OrgAuditEventInput {
    /// Action performed.
    pub action: OrgAuditAction,
    /// The user the change was about (if any).
    pub user_id: Option<UserId>,
    /// The position involved (if any).
    pub position_id: Option<PositionId>,
    /// The department involved (if any).
    pub department_id: Option<DepartmentId>,
    /// Who performed the action.
    pub actor_id: UserId,
    /// State before the change (JSON).
    pub before_state: Option<serde_json::Value>,
    /// State after the change (JSON).
    pub after_state: Option<serde_json::Value>,
    /// Additional metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Trait for audit-event storage backends.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Record an event.
    async fn log_event(&self, input: OrgAuditEventInput) -> Result<OrgAuditEvent>;

    /// All events, oldest first.
    async fn list_all(&self) -> Result<Vec<OrgAuditEvent>>;

    /// Events with a given action, oldest first.
    async fn list_by_action(&self, action: OrgAuditAction) -> Result<Vec<OrgAuditEvent>>;

    /// Events about a given user, oldest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrgAuditEvent>>;
}

/// In-memory audit store for testing.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    events: Arc<RwLock<Vec<OrgAuditEvent>>>,
}

impl InMemoryAuditStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of recorded events.
    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait::async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn log_event(&self, input: OrgAuditEventInput) -> Result<OrgAuditEvent> {
        let event = OrgAuditEvent {
            id: Uuid::new_v4(),
            action: input.action,
            user_id: input.user_id,
            position_id: input.position_id,
            department_id: input.department_id,
            actor_id: input.actor_id,
            before_state: input.before_state,
            after_state: input.after_state,
            timestamp: Utc::now(),
            metadata: input.metadata,
        };
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn list_all(&self) -> Result<Vec<OrgAuditEvent>> {
        Ok(self.events.read().await.clone())
    }

    async fn list_by_action(&self, action: OrgAuditAction) -> Result<Vec<OrgAuditEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.action == action)
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrgAuditEvent>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.user_id == Some(user_id))
            .cloned()
            .collect())
    }
}
