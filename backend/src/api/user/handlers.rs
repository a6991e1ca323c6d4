//! Handler functions for user management API endpoints.
//!
//! Authorization is enforced by the route layers; handlers only call
//! [`UserService`](crate::services::UserService).

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::session::AuthSession;
use crate::database::models::{CreateUser, UpdatePassword, UpdateUser, User};
use crate::state::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};

/// Lists every active user.
#[axum::debug_handler]
pub async fn list_users(
    Extension(state): Extension<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state
        .users
        .list_users()
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(
        users,
        "Users retrieved successfully",
    )))
}

/// Retrieves a user by its ID.
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .get_user(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(user, "User retrieved successfully")))
}

#[axum::debug_handler]
pub async fn create_user(
    Extension(state): Extension<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state
        .users
        .create_user(payload)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!("User created: {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user, "User created successfully")),
    ))
}

#[axum::debug_handler]
pub async fn update_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .update_user(id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(user, "User updated successfully")))
}

/// Changes the caller's own password.
#[axum::debug_handler]
pub async fn update_password(
    Extension(state): Extension<AppState>,
    session: AuthSession,
    Json(payload): Json<UpdatePassword>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .change_password(&session, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(user, "Password updated successfully")))
}

#[axum::debug_handler]
pub async fn soft_delete_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .users
        .soft_delete_user(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success((), "User soft deleted successfully")))
}

#[axum::debug_handler]
pub async fn restore_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .users
        .restore_user(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success((), "User restored successfully")))
}

/// Permanently deletes a user.
#[axum::debug_handler]
pub async fn delete_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .users
        .delete_user(id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success((), "User deleted successfully")))
}
