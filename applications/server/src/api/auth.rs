/// Authentication API routes
use super::ApiJson;
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use heights_core::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// POST /api/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let user = app_state
        .auth_service
        .register(app_state.users.as_ref(), req)
        .await?;

    let token = app_state.auth_service.issue_token(&user.id)?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ServerError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = app_state
        .users
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ServerError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let password_hash = app_state
        .users
        .password_hash(&user.id)
        .await?
        .ok_or_else(|| ServerError::Auth(INVALID_CREDENTIALS.to_string()))?;

    if !app_state
        .auth_service
        .verify_password(&req.password, &password_hash)?
    {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(ServerError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = app_state.auth_service.issue_token(&user.id)?;

    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<UserProfile>> {
    // A valid token for a deleted account is still unauthorized
    let user = app_state
        .users
        .get_user(auth.user_id())
        .await?
        .ok_or_else(|| ServerError::Auth("User not found".to_string()))?;

    Ok(Json(user))
}
