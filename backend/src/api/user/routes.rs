//! Defines the HTTP routes for user management.

use super::handlers::{
    create_user, delete_user, get_user_by_id, list_users, restore_user, soft_delete_user,
    update_password, update_user,
};
use crate::auth::authorization::actions;
use crate::auth::middleware::with_action;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn user_router() -> Router {
    Router::new()
        .route(
            "/users",
            with_action(actions::RETRIEVE_USERS, get(list_users))
                .merge(with_action(actions::CREATE_USERS, post(create_user))),
        )
        .route(
            "/users/password",
            with_action(actions::UPDATE_USERS, put(update_password)),
        )
        .route(
            "/users/soft/{id}",
            with_action(actions::DELETE_USERS, delete(soft_delete_user)),
        )
        .route(
            "/users/restore/{id}",
            with_action(actions::UPDATE_USERS, put(restore_user)),
        )
        .route(
            "/users/{id}",
            with_action(actions::RETRIEVE_USERS, get(get_user_by_id))
                .merge(with_action(actions::UPDATE_USERS, put(update_user)))
                .merge(with_action(actions::DELETE_USERS, delete(delete_user))),
        )
}
