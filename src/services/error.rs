use thiserror::Error;

use crate::auth::{JwtError, PasswordError};
use crate::database::DatabaseError;

/// Request-scoped failures raised by the service layer.
/// None are retried and none are fatal to the process.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or self-referential input
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// The caller is known but lacks permission
    #[error("{0}")]
    Forbidden(String),

    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthenticated(String),

    /// Operation not valid for the entity's current state
    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password hash error: {0}")]
    Password(#[from] PasswordError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field: Some(field),
        }
    }

    pub fn forbidden() -> Self {
        ServiceError::Forbidden("You do not have permission to perform this action.".to_string())
    }

    pub fn unauthenticated() -> Self {
        ServiceError::Unauthenticated("Authentication credentials were not provided.".to_string())
    }

    pub fn not_found(entity: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", entity))
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(constraint) => {
                ServiceError::Conflict(format!("Record already exists ({})", constraint))
            }
            DatabaseError::ForeignKeyViolation(what) => {
                ServiceError::NotFound(format!("Referenced record not found ({})", what))
            }
            DatabaseError::NotFound(what) => ServiceError::NotFound(format!("{} not found", what)),
            other => ServiceError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: ServiceError = DatabaseError::UniqueViolation("connections_pair_key".into()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn foreign_key_violation_becomes_not_found() {
        let err: ServiceError = DatabaseError::ForeignKeyViolation("profile".into()).into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn infrastructure_errors_pass_through() {
        let err: ServiceError = DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
