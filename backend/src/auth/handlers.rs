//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request bodies and delegate to [`AuthService`].
//!
//! [`AuthService`]: crate::auth::service::AuthService

use crate::api::common::{ApiError, service_error_to_http};
use crate::auth::models::*;
use crate::auth::session::AuthSession;
use crate::state::AppState;
use axum::{
    extract::{Extension, Json},
    response::Json as ResponseJson,
};

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<TokenPair>, ApiError> {
    state
        .auth
        .login(payload)
        .await
        .map(ResponseJson)
        .map_err(service_error_to_http)
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(state): Extension<AppState>,
    session: AuthSession,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<TokenPair>, ApiError> {
    state
        .auth
        .refresh(&session, &payload.refresh_token)
        .await
        .map(ResponseJson)
        .map_err(service_error_to_http)
}

/// Handle logout request by revoking the caller's token
#[axum::debug_handler]
pub async fn logout(
    Extension(state): Extension<AppState>,
    session: AuthSession,
) -> Result<ResponseJson<serde_json::Value>, ApiError> {
    state
        .auth
        .logout(&session)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(serde_json::json!({
        "message": "Logged out successfully"
    })))
}
