//! # Service Error Types and Operator Feedback
//!
//! Typed errors for every operation, plus the flat (ok, message) pair the
//! register UI shows operators.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError / ValidationError        DbError                             │
//! │       │                                │                                │
//! │       └──────────────┬─────────────────┘                                │
//! │                      ▼                                                  │
//! │               ServiceError (this module)                                │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │               Feedback { ok, message }                                  │
//! │                                                                         │
//! │  Storage details are logged here and replaced with a calm message;      │
//! │  the operator never sees SQL or a stack trace.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billar_core::{CoreError, ValidationError};
use billar_db::DbError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors returned by service operations.
///
/// Each variant's display string is written for the operator at the
/// register, so converting to [`Feedback`] is just `to_string()`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation before touching the database.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A sale asked for more units than the product has.
    ///
    /// The message names the product and both quantities so the operator
    /// can decide whether to restock or sell fewer units.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A unique field collided with an existing row.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Deletion blocked because ledger rows still reference the entity.
    #[error("{entity} {id} has {dependents} dependent record(s); delete blocked")]
    HasDependents {
        entity: String,
        id: String,
        dependents: i64,
    },

    /// Login rejected. Deliberately does not say which of the two
    /// fields was wrong.
    #[error("Invalid username or password")]
    AuthFailed,

    /// An account cannot delete itself while logged in.
    #[error("You cannot delete the account you are logged in with")]
    SelfDeletion,

    /// A purchase draft was submitted with no lines.
    #[error("Purchase draft is empty; add at least one line")]
    EmptyDraft,

    /// A storage failure whose detail went to the log, not the operator.
    #[error("The operation could not be completed; nothing was saved")]
    Storage,
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Convert database errors to service errors.
///
/// ## Error Mapping
/// ```text
/// DbError::NotFound         → ServiceError::NotFound
/// DbError::UniqueViolation  → ServiceError::Duplicate
/// DbError::HasDependents    → ServiceError::HasDependents
/// Other                     → logged, then ServiceError::Storage
/// ```
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => ServiceError::Duplicate { field, value },
            DbError::HasDependents {
                entity,
                id,
                dependents,
            } => ServiceError::HasDependents {
                entity,
                id,
                dependents,
            },
            other => {
                error!("Storage failure: {}", other);
                ServiceError::Storage
            }
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => ServiceError::InsufficientStock {
                name,
                available,
                requested,
            },
            CoreError::EmptyDraft => ServiceError::EmptyDraft,
            CoreError::Validation(e) => ServiceError::Validation(e),
        }
    }
}

// =============================================================================
// Operator Feedback
// =============================================================================

/// Flat success/failure pair shown at the register.
///
/// Every operation outcome collapses to one of these: outcome types carry a
/// human summary, errors carry their display string.
///
/// ## Example
/// ```
/// use billar_service::Feedback;
///
/// let fb = Feedback::success("Sale recorded: 2 x Fernet 750");
/// assert!(fb.ok);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub ok: bool,
    pub message: String,
}

impl Feedback {
    /// Successful outcome with an operator-facing summary.
    pub fn success(message: impl Into<String>) -> Self {
        Feedback {
            ok: true,
            message: message.into(),
        }
    }

    /// Failed outcome with an operator-facing reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Feedback {
            ok: false,
            message: message.into(),
        }
    }

    /// Collapses an operation result into feedback.
    ///
    /// ## Example
    /// ```
    /// use billar_service::{Feedback, ServiceError, ServiceResult};
    ///
    /// let res: ServiceResult<Feedback> = Err(ServiceError::AuthFailed);
    /// let fb = Feedback::from_result(res);
    /// assert!(!fb.ok);
    /// assert_eq!(fb.message, "Invalid username or password");
    /// ```
    pub fn from_result<T: Into<Feedback>>(result: ServiceResult<T>) -> Feedback {
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => Feedback::failure(err.to_string()),
        }
    }
}

impl From<ServiceError> for Feedback {
    fn from(err: ServiceError) -> Self {
        Feedback::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ServiceError = DbError::not_found("Product", "prod-123").into();
        match err {
            ServiceError::NotFound { entity, id } => {
                assert_eq!(entity, "Product");
                assert_eq!(id, "prod-123");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_db_unique_violation_maps_to_duplicate() {
        let err: ServiceError = DbError::duplicate("username", "caro").into();
        assert_eq!(err.to_string(), "Duplicate username: 'caro' already exists");
    }

    #[test]
    fn test_db_internal_collapses_to_storage() {
        let err: ServiceError = DbError::Internal("disk I/O error".to_string()).into();
        match err {
            ServiceError::Storage => {}
            other => panic!("expected Storage, got {:?}", other),
        }
        // The operator message must not leak the SQLite detail.
        assert!(!err.to_string().contains("disk I/O"));
    }

    #[test]
    fn test_core_insufficient_stock_preserves_fields() {
        let err: ServiceError = CoreError::InsufficientStock {
            name: "Fernet 750".to_string(),
            available: 2,
            requested: 5,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Fernet 750: available 2, requested 5"
        );
    }

    #[test]
    fn test_validation_error_passes_through() {
        let err: ServiceError = CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        })
        .into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn test_feedback_from_error_result() {
        let res: ServiceResult<Feedback> = Err(ServiceError::SelfDeletion);
        let fb = Feedback::from_result(res);
        assert!(!fb.ok);
        assert_eq!(
            fb.message,
            "You cannot delete the account you are logged in with"
        );
    }

    #[test]
    fn test_feedback_success() {
        let fb = Feedback::success("Stock updated to 15");
        assert!(fb.ok);
        assert_eq!(fb.message, "Stock updated to 15");
    }
}
