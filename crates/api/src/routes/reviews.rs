//! Review schedule routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use chrono::Utc;
use hospifin_core::DomainError;
use hospifin_core::review::{NewReview, ReviewSchedule, ReviewService, ReviewStatus};
use hospifin_db::ReviewFilter;
use hospifin_shared::types::ReviewScheduleId;
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::CurrentActor;

/// Creates the review routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(schedule_review))
        .route("/reviews/{id}", patch(update_review).delete(delete_review))
}

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    /// New status.
    pub status: ReviewStatus,
    /// Replacement notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// GET /reviews - Reviews of the caller's hospital, earliest first.
async fn list_reviews(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(filter): Query<ReviewFilter>,
) -> ApiResult<Json<Vec<ReviewSchedule>>> {
    actor.require_view()?;
    let repo = state.reviews();
    repo.mark_overdue(&actor.hospital_id, Utc::now()).await?;
    Ok(Json(repo.list(&actor.hospital_id, filter).await?))
}

/// POST /reviews - Schedule a review of a report.
async fn schedule_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<NewReview>,
) -> ApiResult<(StatusCode, Json<ReviewSchedule>)> {
    ReviewService::authorize_schedule(&actor)?;
    let report = state.reports().get(&actor, request.report_id).await?;

    let assignee = state.users().find_by_id(request.assigned_to).await?;
    if !assignee.is_some_and(|u| u.is_active && u.hospital_id == actor.hospital_id) {
        return Err(DomainError::not_found("user", request.assigned_to).into());
    }

    let review = ReviewService::schedule(&actor, &report, request, Utc::now())?;
    state.reviews().insert(&review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /reviews/{id} - Move a review to a new status.
async fn update_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReviewScheduleId>,
    Json(body): Json<UpdateReviewRequest>,
) -> ApiResult<Json<ReviewSchedule>> {
    let repo = state.reviews();
    let mut review = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("review", id))?;

    ReviewService::update_status(&actor, &mut review, body.status, body.notes, Utc::now())?;
    repo.save(&review).await?;
    Ok(Json(review))
}

/// DELETE /reviews/{id} - Remove a review.
async fn delete_review(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReviewScheduleId>,
) -> ApiResult<StatusCode> {
    let repo = state.reviews();
    let review = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("review", id))?;

    ReviewService::authorize_delete(&actor, &review)?;
    if !repo.delete(id).await? {
        return Err(DomainError::not_found("review", id).into());
    }
    info!(review_id = %id, user_id = %actor.user_id, "review deleted");
    Ok(StatusCode::NO_CONTENT)
}
