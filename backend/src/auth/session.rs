//! Per-request record of the authenticated caller.
//!
//! The gate middleware inserts an [`AuthSession`] into the request extensions;
//! handlers receive it as an extractor. Nothing outlives the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::api::common::unauthenticated_response;
use crate::database::models::User;

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    /// Raw bearer token the caller authenticated with.
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .ok_or_else(|| unauthenticated_response().into_response())
    }
}
