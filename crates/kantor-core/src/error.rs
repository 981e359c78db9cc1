//! Error Types
//!
//! This module provides standardized error types for kantor.
//!
//! # Example
//!
//! ```
//! use kantor_core::{KantorError, Result};
//!
//! fn find_user(id: &str) -> Result<String> {
//!     if id.is_empty() {
//!         return Err(KantorError::NotFound {
//!             resource: "User".to_string(),
//!             id: None,
//!         });
//!     }
//!     Ok(format!("User {}", id))
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for kantor.
///
/// This enum provides consistent error types that can be used across all
/// kantor crates. Each variant maps to a common error scenario in the
/// directory layer.
///
/// # Variants
///
/// - `NotFound` - Resource not found
/// - `Conflict` - Resource already exists or uniqueness violated
/// - `ValidationError` - Input validation failure
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KantorError {
    /// Requested resource was not found.
    ///
    /// Use when a directory lookup returns no results.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "User", "Position")
        resource: String,
        /// Optional identifier of the resource
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Resource already exists.
    ///
    /// Use when an insert would duplicate an existing identifier.
    #[error("{resource} already exists{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    Conflict {
        /// The type of resource that conflicted
        resource: String,
        /// Optional identifier of the resource
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure.
    ///
    /// Use when caller input fails validation rules.
    #[error("Validation error on field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },
}

impl KantorError {
    /// Convenience constructor for a `NotFound` with a displayable id.
    #[must_use]
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: Some(id.to_string()),
        }
    }

    /// Convenience constructor for a `Conflict` with a displayable id.
    #[must_use]
    pub fn conflict(resource: &str, id: impl ToString) -> Self {
        Self::Conflict {
            resource: resource.to_string(),
            id: Some(id.to_string()),
        }
    }
}

/// Type alias for Results using `KantorError`.
///
/// This provides a convenient shorthand for function signatures:
///
/// ```
/// use kantor_core::{Result, KantorError};
///
/// fn example() -> Result<String> {
///     Ok("success".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, KantorError>;

#[cfg(test)]
mod tests {
    use super::*;

    mod not_found_tests {
        use super::*;

        #[test]
        fn test_display_without_id() {
            let error = KantorError::NotFound {
                resource: "User".to_string(),
                id: None,
            };
            assert_eq!(error.to_string(), "User not found");
        }

        #[test]
        fn test_display_with_id() {
            let error = KantorError::not_found("Position", "pos-123");
            assert_eq!(error.to_string(), "Position not found: pos-123");
        }

        #[test]
        fn test_is_std_error() {
            let error = KantorError::NotFound {
                resource: "Department".to_string(),
                id: None,
            };
            let _: &dyn std::error::Error = &error;
        }
    }

    mod conflict_tests {
        use super::*;

        #[test]
        fn test_display_with_id() {
            let error = KantorError::conflict("User", "u-7");
            assert_eq!(error.to_string(), "User already exists: u-7");
        }
    }

    mod validation_error_tests {
        use super::*;

        #[test]
        fn test_display_includes_field_and_message() {
            let error = KantorError::ValidationError {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            };

            assert_eq!(
                error.to_string(),
                "Validation error on field 'name': must not be empty"
            );
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn test_not_found_serialization() {
            let error = KantorError::not_found("User", "123");
            let json = serde_json::to_string(&error).unwrap();
            assert!(json.contains("\"type\":\"not_found\""));
            assert!(json.contains("\"resource\":\"User\""));
            assert!(json.contains("\"id\":\"123\""));
        }

        #[test]
        fn test_not_found_skips_none_id() {
            let error = KantorError::NotFound {
                resource: "User".to_string(),
                id: None,
            };
            let json = serde_json::to_string(&error).unwrap();
            assert!(!json.contains("\"id\""));
        }

        #[test]
        fn test_validation_error_serialization() {
            let error = KantorError::ValidationError {
                field: "supervisorIds".to_string(),
                message: "invalid".to_string(),
            };
            let json = serde_json::to_string(&error).unwrap();
            assert!(json.contains("\"type\":\"validation_error\""));
            assert!(json.contains("\"field\":\"supervisorIds\""));
        }
    }

    mod result_tests {
        use super::*;

        fn error_function() -> Result<String> {
            Err(KantorError::NotFound {
                resource: "Test".to_string(),
                id: None,
            })
        }

        fn propagating_function() -> Result<String> {
            error_function()?;
            Ok("never reached".to_string())
        }

        #[test]
        fn test_question_mark_propagation() {
            let result = propagating_function();
            assert!(result.is_err());
        }
    }
}
