//! User administration routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use hospifin_core::DomainError;
use hospifin_core::access::{Permission, Role, User, UserPolicy};
use hospifin_shared::types::UserId;
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::CurrentActor;

/// Creates the user administration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/role", patch(change_role))
        .route("/users/{id}/deactivate", post(deactivate_user))
}

/// Body of a role change.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// New role.
    pub role: Role,
}

async fn load_target(state: &AppState, id: UserId) -> ApiResult<User> {
    state
        .users()
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("user", id).into())
}

/// GET /users - Users of the caller's hospital.
async fn list_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<User>>> {
    actor.require(Permission::ManageUsers)?;
    Ok(Json(state.users().list_by_hospital(&actor.hospital_id).await?))
}

/// PATCH /users/{id}/role - Change a user's role.
async fn change_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<UserId>,
    Json(body): Json<ChangeRoleRequest>,
) -> ApiResult<Json<User>> {
    actor.require(Permission::ManageUsers)?;
    let target = load_target(&state, id).await?;
    UserPolicy::check_role_change(&actor, &target)?;

    let user = state.users().update_role(id, body.role).await?;
    info!(user_id = %id, role = %user.role, changed_by = %actor.user_id, "user role changed");
    Ok(Json(user))
}

/// POST /users/{id}/deactivate - Disable a user's account.
async fn deactivate_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<UserId>,
) -> ApiResult<Json<User>> {
    actor.require(Permission::ManageUsers)?;
    let target = load_target(&state, id).await?;
    UserPolicy::check_deactivation(&actor, &target)?;

    let user = state.users().deactivate(id).await?;
    info!(user_id = %id, changed_by = %actor.user_id, "user deactivated");
    Ok(Json(user))
}
