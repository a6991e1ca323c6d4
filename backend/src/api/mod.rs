//! Central module for organizing the application's HTTP surface.
//!
//! [`app_router`] assembles the authentication routes and the user and role
//! endpoints and puts the whole tree behind the auth gate.

pub mod common;
pub mod role;
pub mod user;

use crate::api::common::ApiResponse;
use crate::auth::{AuthSession, require_auth, routes::auth_router};
use crate::state::AppState;
use axum::{Extension, Json, Router, middleware, routing::get};

/// Builds the complete application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth_router())
        .merge(user::routes::user_router())
        .merge(role::routes::role_router())
        .layer(middleware::from_fn(require_auth))
        .layer(Extension(state))
}

async fn root_handler(session: AuthSession) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "userId": session.user.id,
        }),
        "Welcome to the AccessGate API",
    ))
}
