//! Authoritative entity store.
//!
//! The resolution services are pure functions over a snapshot; this
//! module is the one place entities are owned and mutated. Every
//! mutating operation re-runs its guard or impact check against a
//! freshly built snapshot immediately before applying, so a stale
//! caller-side check can never slip a refused mutation through. There
//! is no partial application: an operation either fully applies and is
//! audited, or returns the refusal.

use std::sync::Arc;

use kantor_core::{DepartmentId, KantorError, PositionId, UserId};
use tokio::sync::RwLock;

use crate::audit::{AuditStore, InMemoryAuditStore, OrgAuditAction, OrgAuditEventInput};
use crate::error::{OrgError, Result};
use crate::services::department::{check_department_deletion, DepartmentDeletionImpact};
use crate::services::position::{plan_position_deletion, PositionDeletionPlan, SuccessionChoice};
use crate::services::supervisor::{
    add_additional_supervisor, can_disable_default_supervisor, remove_additional_supervisor,
    GuardVerdict,
};
use crate::snapshot::OrgSnapshot;
use crate::types::{Department, Position, User};

/// Storage backend for the authoritative org entities.
#[async_trait::async_trait]
pub trait OrgStore: Send + Sync {
    /// Build an immutable snapshot of the current entities.
    async fn snapshot(&self) -> Result<OrgSnapshot>;

    /// Look up a user.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Add a department.
    async fn add_department(&self, department: Department) -> Result<()>;

    /// Add a position.
    async fn add_position(&self, position: Position) -> Result<()>;

    /// Add a user.
    async fn add_user(&self, user: User) -> Result<()>;

    /// Disable or re-enable the position-derived default supervisor.
    ///
    /// Disabling is guarded: it is refused while the user has no
    /// additional supervisor to fall back to. Re-enabling always
    /// succeeds.
    async fn set_default_supervisor_disabled(
        &self,
        user: UserId,
        disabled: bool,
        actor: UserId,
    ) -> Result<User>;

    /// Append an additional supervisor to a user's list.
    async fn add_additional_supervisor(
        &self,
        user: UserId,
        candidate: UserId,
        actor: UserId,
    ) -> Result<User>;

    /// Remove an additional supervisor from a user's list, re-enabling
    /// the default supervisor when the last entry goes away while the
    /// default is disabled.
    async fn remove_additional_supervisor(
        &self,
        user: UserId,
        supervisor: UserId,
        actor: UserId,
    ) -> Result<User>;

    /// Drop additional-supervisor entries that no longer resolve to an
    /// existing active user. The caller-triggered remediation for
    /// dangling references.
    async fn clear_dangling_supervisors(&self, user: UserId, actor: UserId) -> Result<User>;

    /// Delete a position after re-checking its impact, applying the
    /// re-point plan.
    async fn delete_position(
        &self,
        position: PositionId,
        succession: Option<SuccessionChoice>,
        actor: UserId,
    ) -> Result<PositionDeletionPlan>;

    /// Delete a department and its subtree after re-checking its
    /// impact.
    async fn delete_department(
        &self,
        department: DepartmentId,
        actor: UserId,
    ) -> Result<DepartmentDeletionImpact>;

    /// Deactivate a user. Never blocked by dependencies; idempotent.
    async fn deactivate_user(&self, user: UserId, actor: UserId) -> Result<User>;

    /// Reactivate a user. Idempotent.
    async fn reactivate_user(&self, user: UserId, actor: UserId) -> Result<User>;
}

#[derive(Debug, Default)]
struct DirectoryState {
    departments: Vec<Department>,
    positions: Vec<Position>,
    users: Vec<User>,
}

impl DirectoryState {
    fn snapshot(&self) -> Result<OrgSnapshot> {
        Ok(OrgSnapshot::new(
            self.departments.clone(),
            self.positions.clone(),
            self.users.clone(),
        )?)
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| OrgError::Core(KantorError::not_found("User", id)))
    }
}

/// In-memory [`OrgStore`] used by the integration tests and as the
/// reference for persistent implementations.
pub struct InMemoryOrgStore {
    state: RwLock<DirectoryState>,
    audit: Arc<dyn AuditStore>,
}

impl Default for InMemoryOrgStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrgStore {
    /// Create an empty store with its own in-memory audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::with_audit(Arc::new(InMemoryAuditStore::new()))
    }

    /// Create an empty store logging to the given audit backend.
    #[must_use]
    pub fn with_audit(audit: Arc<dyn AuditStore>) -> Self {
        Self {
            state: RwLock::new(DirectoryState::default()),
            audit,
        }
    }

    /// The audit backend this store logs to.
    #[must_use]
    pub fn audit(&self) -> Arc<dyn AuditStore> {
        Arc::clone(&self.audit)
    }
}

#[async_trait::async_trait]
impl OrgStore for InMemoryOrgStore {
    async fn snapshot(&self) -> Result<OrgSnapshot> {
        self.state.read().await.snapshot()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn add_department(&self, department: Department) -> Result<()> {
        let mut state = self.state.write().await;
        if state.departments.iter().any(|d| d.id == department.id) {
            return Err(KantorError::conflict("Department", department.id).into());
        }
        state.departments.push(department);
        Ok(())
    }

    async fn add_position(&self, position: Position) -> Result<()> {
        let mut state = self.state.write().await;
        if state.positions.iter().any(|p| p.id == position.id) {
            return Err(KantorError::conflict("Position", position.id).into());
        }
        state.positions.push(position);
        Ok(())
    }

    async fn add_user(&self, user: User) -> Result<()> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.id == user.id) {
            return Err(KantorError::conflict("User", user.id).into());
        }
        state.users.push(user);
        Ok(())
    }

    async fn set_default_supervisor_disabled(
        &self,
        user: UserId,
        disabled: bool,
        actor: UserId,
    ) -> Result<User> {
        let mut state = self.state.write().await;

        let current = state.user_mut(user)?;
        if disabled {
            if let GuardVerdict::Denied { reason } = can_disable_default_supervisor(current) {
                return Err(OrgError::DisableDenied { user, reason });
            }
        }
        let before = serde_json::to_value(&*current).ok();
        current.default_supervisor_disabled = disabled;
        let after = serde_json::to_value(&*current).ok();
        let updated = current.clone();

        let action = if disabled {
            OrgAuditAction::DefaultSupervisorDisabled
        } else {
            OrgAuditAction::DefaultSupervisorEnabled
        };
        self.audit
            .log_event(OrgAuditEventInput {
                action,
                user_id: Some(user),
                actor_id: actor,
                before_state: before,
                after_state: after,
                ..Default::default()
            })
            .await?;
        tracing::info!(user = %user, disabled, "default supervisor toggled");
        Ok(updated)
    }

    async fn add_additional_supervisor(
        &self,
        user: UserId,
        candidate: UserId,
        actor: UserId,
    ) -> Result<User> {
        let mut state = self.state.write().await;

        let current = state.user_mut(user)?;
        let new_ids = add_additional_supervisor(current, candidate)?;
        let before = serde_json::to_value(&*current).ok();
        current.supervisor_ids = new_ids;
        let after = serde_json::to_value(&*current).ok();
        let updated = current.clone();

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::AdditionalSupervisorAdded,
                user_id: Some(user),
                actor_id: actor,
                before_state: before,
                after_state: after,
                metadata: serde_json::to_value(candidate).ok(),
                ..Default::default()
            })
            .await?;
        tracing::info!(user = %user, candidate = %candidate, "additional supervisor added");
        Ok(updated)
    }

    async fn remove_additional_supervisor(
        &self,
        user: UserId,
        supervisor: UserId,
        actor: UserId,
    ) -> Result<User> {
        let mut state = self.state.write().await;

        let current = state.user_mut(user)?;
        let removal = remove_additional_supervisor(current, supervisor);
        let before = serde_json::to_value(&*current).ok();
        current.supervisor_ids = removal.new_ids;
        if removal.reenable_default {
            // Compensating action: the guard would otherwise leave the
            // user with zero supervisors.
            current.default_supervisor_disabled = false;
        }
        let after = serde_json::to_value(&*current).ok();
        let updated = current.clone();

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::AdditionalSupervisorRemoved,
                user_id: Some(user),
                actor_id: actor,
                before_state: before,
                after_state: after,
                metadata: Some(serde_json::json!({
                    "supervisor": supervisor,
                    "reenabledDefault": removal.reenable_default,
                })),
                ..Default::default()
            })
            .await?;
        tracing::info!(
            user = %user,
            supervisor = %supervisor,
            reenabled_default = removal.reenable_default,
            "additional supervisor removed"
        );
        Ok(updated)
    }

    async fn clear_dangling_supervisors(&self, user: UserId, actor: UserId) -> Result<User> {
        let mut state = self.state.write().await;
        let snapshot = state.snapshot()?;

        let current = state.user_mut(user)?;
        let (kept, removed): (Vec<UserId>, Vec<UserId>) =
            current.supervisor_ids.iter().partition(|&&id| {
                id != user
                    && snapshot
                        .user(id)
                        .is_some_and(|supervisor| supervisor.is_active)
            });
        if removed.is_empty() {
            return Ok(current.clone());
        }

        let before = serde_json::to_value(&*current).ok();
        current.supervisor_ids = kept;
        if current.default_supervisor_disabled && current.supervisor_ids.is_empty() {
            current.default_supervisor_disabled = false;
        }
        let after = serde_json::to_value(&*current).ok();
        let updated = current.clone();

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::DanglingSupervisorsCleared,
                user_id: Some(user),
                actor_id: actor,
                before_state: before,
                after_state: after,
                metadata: serde_json::to_value(&removed).ok(),
                ..Default::default()
            })
            .await?;
        tracing::info!(user = %user, cleared = removed.len(), "dangling supervisors cleared");
        Ok(updated)
    }

    async fn delete_position(
        &self,
        position: PositionId,
        succession: Option<SuccessionChoice>,
        actor: UserId,
    ) -> Result<PositionDeletionPlan> {
        let mut state = self.state.write().await;

        // Re-evaluate against the state as it is now, not as the caller
        // saw it.
        let snapshot = state.snapshot()?;
        let plan = plan_position_deletion(position, succession, &snapshot)?;

        for action in &plan.repoint {
            if let Some(target) = state.positions.iter_mut().find(|p| p.id == action.position) {
                target.reports_to = action.new_reports_to;
            }
        }
        state.positions.retain(|p| p.id != position);

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::PositionDeleted,
                position_id: Some(position),
                actor_id: actor,
                metadata: serde_json::to_value(&plan).ok(),
                ..Default::default()
            })
            .await?;
        tracing::info!(position = %position, repoints = plan.repoint.len(), "position deleted");
        Ok(plan)
    }

    async fn delete_department(
        &self,
        department: DepartmentId,
        actor: UserId,
    ) -> Result<DepartmentDeletionImpact> {
        let mut state = self.state.write().await;

        let snapshot = state.snapshot()?;
        let impact = check_department_deletion(department, &snapshot)?;
        if impact.is_blocking() {
            return Err(OrgError::DepartmentBlocked {
                impact: Box::new(impact),
            });
        }

        let affected: std::collections::HashSet<DepartmentId> =
            impact.affected_departments.iter().copied().collect();
        state
            .departments
            .retain(|d| !affected.contains(&d.id));
        state
            .positions
            .retain(|p| !affected.contains(&p.department_id));

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::DepartmentDeleted,
                department_id: Some(department),
                actor_id: actor,
                metadata: serde_json::to_value(&impact).ok(),
                ..Default::default()
            })
            .await?;
        tracing::info!(
            department = %department,
            departments = impact.affected_departments.len(),
            positions = impact.cascade_positions.len(),
            "department deleted"
        );
        Ok(impact)
    }

    async fn deactivate_user(&self, user: UserId, actor: UserId) -> Result<User> {
        if user == actor {
            return Err(KantorError::ValidationError {
                field: "user".to_string(),
                message: "cannot deactivate your own account".to_string(),
            }
            .into());
        }
        let mut state = self.state.write().await;

        let current = state.user_mut(user)?;
        let before = serde_json::to_value(&*current).ok();
        current.is_active = false;
        let after = serde_json::to_value(&*current).ok();
        let updated = current.clone();

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::UserDeactivated,
                user_id: Some(user),
                actor_id: actor,
                before_state: before,
                after_state: after,
                ..Default::default()
            })
            .await?;
        tracing::info!(user = %user, "user deactivated");
        Ok(updated)
    }

    async fn reactivate_user(&self, user: UserId, actor: UserId) -> Result<User> {
        let mut state = self.state.write().await;

        let current = state.user_mut(user)?;
        let before = serde_json::to_value(&*current).ok();
        current.is_active = true;
        let after = serde_json::to_value(&*current).ok();
        let updated = current.clone();

        self.audit
            .log_event(OrgAuditEventInput {
                action: OrgAuditAction::UserReactivated,
                user_id: Some(user),
                actor_id: actor,
                before_state: before,
                after_state: after,
                ..Default::default()
            })
            .await?;
        tracing::info!(user = %user, "user reactivated");
        Ok(updated)
    }
}
