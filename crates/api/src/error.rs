//! HTTP error responses.
//!
//! Every failure renders as `{"error": "<code>", "message": "<text>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hospifin_core::DomainError;
use hospifin_core::access::PasswordError;
use hospifin_core::export::ExportError;
use hospifin_shared::{AppError, JwtError};
use serde_json::json;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// 401 with the given code.
    pub fn unauthorized(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 400 for malformed input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// 500 with a generic message; the cause is logged, not returned.
    pub fn internal(cause: &dyn std::fmt::Display) -> Self {
        error!(error = %cause, "internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "An internal error occurred",
        )
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            return Self::internal(&err);
        }
        Self::new(status, &err.error_code().to_lowercase(), err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if !err.is_client_error() {
            return Self::internal(&err);
        }
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, &err.error_code().to_lowercase(), err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::internal(&err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self::internal(&err)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("token_expired", "Token has expired"),
            JwtError::EncodingError(_) => Self::internal(&err),
            JwtError::DecodingError(_) | JwtError::Invalid => {
                Self::unauthorized("invalid_token", "Invalid or malformed token")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use hospifin_core::ValidationError;
    use hospifin_core::access::{Permission, Role};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DomainError::Validation(ValidationError::EmptyField("name")), 400, "validation_error")]
    #[case(DomainError::PermissionDenied { role: Role::Viewer, permission: Permission::CreateReport }, 403, "permission_denied")]
    #[case(DomainError::not_found("report", "r-1"), 404, "not_found")]
    #[case(DomainError::Conflict("taken".to_string()), 409, "conflict")]
    #[case(DomainError::NotAllowed("no".to_string()), 422, "not_allowed")]
    #[case(DomainError::Storage("saving report failed".to_string()), 500, "internal_error")]
    fn test_domain_error_mapping(
        #[case] err: DomainError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        let api = ApiError::from(err);
        assert_eq!(api.status().as_u16(), status);
        assert_eq!(api.code(), code);
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let api = ApiError::from(JwtError::Expired);
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(api.code(), "token_expired");
    }
}
