//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use hospifin_core::lifecycle::ReportManager;
use hospifin_db::{ReportRepository, ReviewRepository, SettingsRepository, UserRepository};
use hospifin_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Creates the state from a connection and a JWT service.
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
        }
    }

    /// Report operations backed by the database.
    #[must_use]
    pub fn reports(&self) -> ReportManager<ReportRepository> {
        ReportManager::new(ReportRepository::new((*self.db).clone()))
    }

    /// User repository.
    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new((*self.db).clone())
    }

    /// Settings repository.
    #[must_use]
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new((*self.db).clone())
    }

    /// Review repository.
    #[must_use]
    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
