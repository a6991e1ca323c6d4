//! Handler functions for role assignment API endpoints.

use super::models::UpdateUserRolesRequest;
use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::database::models::{Permission, RoleWithPermissions};
use crate::state::AppState;
use axum::extract::{Extension, Json, Path};

/// Lists the roles of the user with the given id.
#[axum::debug_handler]
pub async fn get_user_roles(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<RoleWithPermissions>>>, ApiError> {
    let roles = state
        .roles
        .get_user_roles(user_id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(
        roles,
        "User roles retrieved successfully",
    )))
}

/// Replaces the roles of the user with the given id.
#[axum::debug_handler]
pub async fn update_user_roles(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRolesRequest>,
) -> Result<Json<ApiResponse<Vec<RoleWithPermissions>>>, ApiError> {
    let roles = state
        .roles
        .sync_user_roles(user_id, &payload.role_ids)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(
        roles,
        "User roles updated successfully",
    )))
}

/// Lists the permissions granted by a role.
#[axum::debug_handler]
pub async fn get_role_permissions(
    Extension(state): Extension<AppState>,
    Path(role_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    let permissions = state
        .roles
        .get_role_permissions(role_id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::ok(permissions)))
}
