//! Hospital settings routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use hospifin_core::settings::{HospitalSettings, SettingsUpdate};
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::CurrentActor;

/// Creates the settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

/// GET /settings - The caller's hospital settings, or defaults when none are stored.
async fn get_settings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<HospitalSettings>> {
    actor.require_view()?;
    let settings = state.settings().find_or_default(&actor.hospital_id).await?;
    Ok(Json(settings))
}

/// PUT /settings - Update the caller's hospital settings.
async fn update_settings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<HospitalSettings>> {
    let repo = state.settings();
    let mut settings = repo.find_or_default(&actor.hospital_id).await?;
    settings.update(&actor, update, Utc::now())?;
    let saved = repo.save(&settings).await?;

    info!(hospital_id = %actor.hospital_id, user_id = %actor.user_id, "settings updated");
    Ok(Json(saved))
}
