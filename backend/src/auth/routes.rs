//! Defines the HTTP routes specifically for authentication.
//!
//! Login is public; refresh and logout run behind the auth gate like every
//! other route.

use crate::auth::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", get(logout))
}
