//! Dashboard routes.

use axum::{Json, Router, extract::State, routing::get};
use hospifin_core::dashboard::DashboardStats;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::CurrentActor;

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET /dashboard - Figures of the latest approved period.
async fn get_dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.reports().dashboard(&actor).await?))
}
