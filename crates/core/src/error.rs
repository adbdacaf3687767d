//! Domain error taxonomy shared by every core module.

use hospifin_shared::AppError;
use thiserror::Error;

use crate::access::{Permission, Role};
use crate::lifecycle::{LifecycleAction, ReportStatus};
use crate::report::PeriodKey;
use crate::review::ReviewStatus;
use crate::validation::ValidationError;

/// Result type alias using `DomainError`.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors returned by report, user, settings, and review operations.
///
/// Every variant is a recoverable, user-facing outcome. None are retried.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or out-of-range input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A non-archived report already exists for the period.
    #[error("a report already exists for {key}")]
    DuplicatePeriod {
        /// The colliding period key.
        key: PeriodKey,
    },

    /// The action is not allowed from the report's current status.
    #[error("cannot {action} a report in status {from}")]
    InvalidTransition {
        /// The current status.
        from: ReportStatus,
        /// The attempted action.
        action: LifecycleAction,
    },

    /// A review schedule status change that is not allowed.
    #[error("cannot move review from {from} to {to}")]
    InvalidReviewTransition {
        /// The current review status.
        from: ReviewStatus,
        /// The requested review status.
        to: ReviewStatus,
    },

    /// The actor's role lacks the required permission.
    #[error("role {role} lacks permission {permission}")]
    PermissionDenied {
        /// The actor's role.
        role: Role,
        /// The missing permission.
        permission: Permission,
    },

    /// The referenced record does not resolve to a live record.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Uniqueness conflict outside the report period key.
    #[error("{0}")]
    Conflict(String),

    /// Business rule violation (self-demotion, cross-hospital write).
    #[error("{0}")]
    NotAllowed(String),

    /// Export artifact could not be produced.
    #[error("export failed: {0}")]
    Export(String),

    /// Persistence layer failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::PermissionDenied { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::DuplicatePeriod { .. }
            | Self::InvalidTransition { .. }
            | Self::InvalidReviewTransition { .. }
            | Self::Conflict(_) => 409,
            Self::NotAllowed(_) => 422,
            Self::Export(_) | Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicatePeriod { .. } => "DUPLICATE_PERIOD",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidReviewTransition { .. } => "INVALID_REVIEW_TRANSITION",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::NotAllowed(_) => "NOT_ALLOWED",
            Self::Export(_) => "EXPORT_FAILED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Validation(_) => Self::Validation(message),
            DomainError::PermissionDenied { .. } => Self::Forbidden(message),
            DomainError::NotFound { .. } => Self::NotFound(message),
            DomainError::DuplicatePeriod { .. }
            | DomainError::InvalidTransition { .. }
            | DomainError::InvalidReviewTransition { .. }
            | DomainError::Conflict(_) => Self::Conflict(message),
            DomainError::NotAllowed(_) => Self::BusinessRule(message),
            DomainError::Storage(_) => Self::Database(message),
            DomainError::Export(_) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportPeriod;

    fn duplicate() -> DomainError {
        DomainError::DuplicatePeriod {
            key: PeriodKey::new("hospital-1", ReportPeriod::monthly(2024, 1)),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DomainError::Validation(ValidationError::EmptyField("name")).status_code(),
            400
        );
        assert_eq!(duplicate().status_code(), 409);
        assert_eq!(
            DomainError::InvalidTransition {
                from: ReportStatus::Draft,
                action: LifecycleAction::Approve,
            }
            .status_code(),
            409
        );
        assert_eq!(
            DomainError::PermissionDenied {
                role: Role::Viewer,
                permission: Permission::CreateReport,
            }
            .status_code(),
            403
        );
        assert_eq!(DomainError::not_found("report", "x").status_code(), 404);
        assert_eq!(DomainError::NotAllowed("x".into()).status_code(), 422);
        assert_eq!(DomainError::Storage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            duplicate().to_string(),
            "a report already exists for hospital-1/monthly/2024-M01"
        );
        assert_eq!(
            DomainError::InvalidTransition {
                from: ReportStatus::Draft,
                action: LifecycleAction::Approve,
            }
            .to_string(),
            "cannot approve a report in status draft"
        );
        assert_eq!(
            DomainError::PermissionDenied {
                role: Role::Viewer,
                permission: Permission::CreateReport,
            }
            .to_string(),
            "role viewer lacks permission create_report"
        );
    }

    #[test]
    fn test_into_app_error_keeps_status() {
        let errors = vec![
            DomainError::Validation(ValidationError::EmptyField("name")),
            duplicate(),
            DomainError::PermissionDenied {
                role: Role::Finance,
                permission: Permission::ApproveReport,
            },
            DomainError::not_found("user", "u-1"),
            DomainError::NotAllowed("x".into()),
            DomainError::Storage("x".into()),
        ];

        for err in errors {
            let status = err.status_code();
            let app: AppError = err.into();
            assert_eq!(app.status_code(), status);
        }
    }
}
