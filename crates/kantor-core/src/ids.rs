//! Strongly Typed Identifiers
//!
//! This module provides type-safe identifier types for kantor.
//! Using the newtype pattern, these types prevent accidental misuse of
//! different ID types at compile time.
//!
//! # Example
//!
//! ```
//! use kantor_core::{DepartmentId, UserId};
//!
//! let department = DepartmentId::new();
//! let user = UserId::new();
//!
//! // Type safety: cannot pass UserId where DepartmentId is expected
//! fn requires_department(id: DepartmentId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_department(department);
//! // requires_department(user); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for users.
    ///
    /// Identifies a member of the organization: the subject of supervisor
    /// resolution and the referent of additional-supervisor lists.
    ///
    /// # Example
    ///
    /// ```
    /// use kantor_core::UserId;
    /// use uuid::Uuid;
    ///
    /// // Create a new random UserId
    /// let user_id = UserId::new();
    /// println!("User: {}", user_id);
    ///
    /// // Create from existing UUID
    /// let uuid = Uuid::new_v4();
    /// let user_id = UserId::from_uuid(uuid);
    /// assert_eq!(user_id.as_uuid(), &uuid);
    ///
    /// // Parse from string
    /// let user_id: UserId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
    /// ```
    UserId
);

define_id!(
    /// Strongly typed identifier for departments.
    ///
    /// Departments form a parent-pointer forest; a department id may appear
    /// as another department's parent.
    ///
    /// # Example
    ///
    /// ```
    /// use kantor_core::DepartmentId;
    ///
    /// let department_id = DepartmentId::new();
    /// println!("Department: {}", department_id);
    /// ```
    DepartmentId
);

define_id!(
    /// Strongly typed identifier for positions.
    ///
    /// Positions belong to a department and may report to another position,
    /// forming the reporting hierarchy.
    ///
    /// # Example
    ///
    /// ```
    /// use kantor_core::PositionId;
    ///
    /// let position_id = PositionId::new();
    /// println!("Position: {}", position_id);
    /// ```
    PositionId
);

define_id!(
    /// Strongly typed identifier for offices.
    ///
    /// Offices are managed by another module of the platform; the id is
    /// carried on users as opaque data.
    OfficeId
);

define_id!(
    /// Strongly typed identifier for business records.
    ///
    /// Business records (companies, projects, estimates, invoices, ...) are
    /// owned by other modules and only referenced by the deactivation
    /// dependency check.
    RecordId
);
