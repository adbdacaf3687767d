//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every repository speaks in domain types and `DomainError`.

pub mod report;
pub mod review;
pub mod settings;
pub mod user;

pub use report::ReportRepository;
pub use review::{ReviewFilter, ReviewRepository};
pub use settings::SettingsRepository;
pub use user::UserRepository;

use hospifin_core::DomainError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Maps a database error to a domain error, logging the cause.
///
/// Unique violations become `Conflict`; anything else is a `Storage` error
/// whose message names only the failed operation.
pub(crate) fn storage_error(operation: &'static str, err: &DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        tracing::warn!(operation, %detail, "unique constraint violated");
        return DomainError::Conflict(format!("{operation} conflicts with an existing record"));
    }
    tracing::error!(operation, error = %err, "database operation failed");
    DomainError::Storage(format!("{operation} failed"))
}

pub(crate) fn to_json<T: Serialize>(column: &'static str, value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(column, error = %e, "failed to encode column");
        DomainError::Storage(format!("failed to encode {column}"))
    })
}

pub(crate) fn from_json<T: DeserializeOwned>(
    column: &'static str,
    value: Value,
) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(column, error = %e, "failed to decode column");
        DomainError::Storage(format!("stored {column} is malformed"))
    })
}
