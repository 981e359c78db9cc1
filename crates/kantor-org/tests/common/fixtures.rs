//! Test fixtures factory for integration tests.
//!
//! Builds org structures with human-readable names so scenarios read
//! like the org charts they model, with predictable lookups for easier
//! debugging.

use std::collections::HashMap;

use kantor_core::{DepartmentId, PositionId, UserId};
use kantor_org::directory::{InMemoryOrgStore, OrgStore};
use kantor_org::snapshot::OrgSnapshot;
use kantor_org::types::{Department, Position, User};

/// Org structure under construction, addressable by name.
#[derive(Debug, Default)]
pub struct OrgFixture {
    departments: Vec<Department>,
    positions: Vec<Position>,
    users: Vec<User>,
    department_ids: HashMap<String, DepartmentId>,
    position_ids: HashMap<String, PositionId>,
    user_ids: HashMap<String, UserId>,
}

impl OrgFixture {
    /// Create an empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a department, optionally under a named parent.
    pub fn add_department(&mut self, name: &str, parent: Option<&str>) -> DepartmentId {
        let id = DepartmentId::new();
        let parent_id = parent.map(|p| self.department(p));
        self.departments.push(Department {
            id,
            name: name.to_string(),
            parent_id,
        });
        self.department_ids.insert(name.to_string(), id);
        id
    }

    /// Add a position in a named department, optionally reporting to a
    /// named position.
    pub fn add_position(
        &mut self,
        name: &str,
        department: &str,
        reports_to: Option<&str>,
    ) -> PositionId {
        let id = PositionId::new();
        let department_id = self.department(department);
        let reports_to = reports_to.map(|p| self.position(p));
        self.positions.push(Position {
            id,
            department_id,
            name: name.to_string(),
            reports_to,
        });
        self.position_ids.insert(name.to_string(), id);
        id
    }

    /// Add an active user, optionally holding a named position. The
    /// user's department follows the position's.
    pub fn add_user(&mut self, name: &str, position: Option<&str>) -> UserId {
        let id = UserId::new();
        let position_id = position.map(|p| self.position(p));
        let department_id = position_id.and_then(|pid| {
            self.positions
                .iter()
                .find(|p| p.id == pid)
                .map(|p| p.department_id)
        });
        self.users.push(User {
            id,
            name: name.to_string(),
            is_active: true,
            department_id,
            position_id,
            office_id: None,
            supervisor_ids: vec![],
            default_supervisor_disabled: false,
        });
        self.user_ids.insert(name.to_string(), id);
        id
    }

    /// Get department ID by name, panics if not found.
    pub fn department(&self, name: &str) -> DepartmentId {
        *self.department_ids.get(name).unwrap_or_else(|| {
            panic!("Department '{}' not found in fixtures", name);
        })
    }

    /// Get position ID by name, panics if not found.
    pub fn position(&self, name: &str) -> PositionId {
        *self.position_ids.get(name).unwrap_or_else(|| {
            panic!("Position '{}' not found in fixtures", name);
        })
    }

    /// Get user ID by name, panics if not found.
    pub fn user(&self, name: &str) -> UserId {
        *self.user_ids.get(name).unwrap_or_else(|| {
            panic!("User '{}' not found in fixtures", name);
        })
    }

    /// Mutable access to a named user, for scenario-specific tweaks.
    pub fn user_mut(&mut self, name: &str) -> &mut User {
        let id = self.user(name);
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .unwrap_or_else(|| panic!("User '{}' not found in fixtures", name))
    }

    /// Build an immutable snapshot of the fixture.
    pub fn snapshot(&self) -> OrgSnapshot {
        OrgSnapshot::new(
            self.departments.clone(),
            self.positions.clone(),
            self.users.clone(),
        )
        .expect("fixture produces a well-formed snapshot")
    }

    /// Seed an in-memory store with the fixture's entities.
    pub async fn into_store(self) -> InMemoryOrgStore {
        let store = InMemoryOrgStore::new();
        for department in self.departments {
            store
                .add_department(department)
                .await
                .expect("fixture departments are unique");
        }
        for position in self.positions {
            store
                .add_position(position)
                .await
                .expect("fixture positions are unique");
        }
        for user in self.users {
            store.add_user(user).await.expect("fixture users are unique");
        }
        store
    }
}
