//! Authentication routes for login, registration, and the current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use hospifin_core::access::{NewUser, User, UserPolicy, hash_password, normalize_email, verify_password};
use hospifin_shared::AppError;
use hospifin_shared::auth::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use tracing::{info, warn};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::CurrentActor;

/// Public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// Auth routes that need a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("invalid_credentials", "Invalid email or password")
}

fn session(state: &AppState, user: &User) -> ApiResult<LoginResponse> {
    let token = state.jwt_service.generate_session_token(
        user.id.into_inner(),
        &user.email,
        user.role.as_str(),
        &user.hospital_id,
    )?;
    Ok(LoginResponse {
        user: user.info(),
        token,
        expires_in: state.jwt_service.token_expires_in(),
    })
}

/// POST /auth/login - Authenticate a user and issue a session token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = normalize_email(&payload.email);
    let users = state.users();

    let Some(credentials) = users.find_credentials(&email).await? else {
        warn!(email = %email, "login attempt for unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&payload.password, &credentials.password_hash)? {
        warn!(user_id = %credentials.user.id, "login attempt with wrong password");
        return Err(invalid_credentials());
    }

    if !UserPolicy::can_login(&credentials.user) {
        warn!(user_id = %credentials.user.id, "login attempt on inactive account");
        return Err(ApiError::unauthorized(
            "account_disabled",
            "This account has been disabled",
        ));
    }

    let user = users.record_login(credentials.user.id, Utc::now()).await?;
    info!(user_id = %user.id, hospital_id = %user.hospital_id, "user logged in");
    Ok(Json(session(&state, &user)?))
}

/// POST /auth/register - Create an account and sign it in.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let new_user = NewUser::from_request(&payload).map_err(hospifin_core::DomainError::from)?;
    let users = state.users();

    let email_taken = users.email_exists(&new_user.email).await?;
    let has_admin = users.has_active_admin(&new_user.hospital_id).await?;
    UserPolicy::check_registration(&new_user, email_taken, has_admin)?;

    let password_hash = hash_password(&new_user.password)?;
    let user = users.create(&new_user, &password_hash).await?;

    info!(user_id = %user.id, hospital_id = %user.hospital_id, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(session(&state, &user)?)))
}

/// GET /auth/me - The signed-in user.
async fn me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<UserInfo>> {
    state
        .users()
        .find_by_id(actor.user_id)
        .await?
        .map(|user| Json(user.info()))
        .ok_or_else(|| AppError::Unauthorized("user no longer exists".to_string()).into())
}
