// src/handlers/auth.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    state::AppState,
    utils::{
        hash::verify_password,
        jwt::{ADMIN_ROLE, sign_jwt},
    },
};

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Authenticates the configured administrator and returns a JWT token.
///
/// Unknown usernames and wrong passwords get the same answer.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let admin = state
        .admin
        .as_ref()
        .ok_or_else(|| AppError::AuthError("Admin login is not configured".to_string()))?;

    let is_valid = admin.username == payload.username
        && verify_password(&payload.password, &admin.password_hash)?;

    if !is_valid {
        tracing::warn!("Rejected admin login for '{}'", payload.username);
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    let token = sign_jwt(
        &admin.username,
        ADMIN_ROLE,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!("Admin '{}' signed in", admin.username);

    Ok(Json(json!({
        "success": true,
        "token": token,
        "type": "Bearer"
    })))
}
