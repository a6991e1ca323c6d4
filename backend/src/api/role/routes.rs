//! Defines the HTTP routes for role assignment.
//!
//! `/roles/{id}` addresses a user, `/roles/{id}/permissions` a role.

use super::handlers::{get_role_permissions, get_user_roles, update_user_roles};
use crate::auth::authorization::actions;
use crate::auth::middleware::with_action;
use axum::{
    Router,
    routing::{get, put},
};

pub fn role_router() -> Router {
    Router::new()
        .route(
            "/roles/{id}",
            with_action(actions::RETRIEVE_USERS, get(get_user_roles))
                .merge(with_action(actions::UPDATE_USERS, put(update_user_roles))),
        )
        .route(
            "/roles/{id}/permissions",
            with_action(actions::RETRIEVE_USERS, get(get_role_permissions)),
        )
}
