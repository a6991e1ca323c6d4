//! Middleware for protecting authenticated routes and handling authorization.
//!
//! [`require_auth`] runs in front of every route except the public ones and
//! turns a bearer token into an [`AuthSession`]. [`require_action`] is layered
//! on individual routes that need a named permission.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use chrono::Utc;
use tracing::{debug, error, warn};

use crate::api::common::{server_error_response, service_error_to_http, unauthenticated_response};
use crate::auth::claims::{ensure_not_expired, subject_id};
use crate::auth::session::AuthSession;
use crate::cache::Blacklist;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;
use crate::state::AppState;
use crate::utils::jwt::TokenSigner;

/// Paths reachable without a bearer token.
pub const PUBLIC_PATHS: &[&str] = &["/auth/login"];

const BEARER_PREFIX: &str = "Bearer ";

/// Verifies bearer tokens and resolves the caller.
pub struct AuthGate {
    signer: Arc<TokenSigner>,
    blacklist: Blacklist,
    users: Arc<dyn UserStore>,
}

impl AuthGate {
    pub fn new(signer: Arc<TokenSigner>, blacklist: Blacklist, users: Arc<dyn UserStore>) -> Self {
        Self {
            signer,
            blacklist,
            users,
        }
    }

    /// Runs the gate checks in order and stops at the first failure.
    pub async fn authenticate(&self, header: Option<&str>) -> ServiceResult<AuthSession> {
        let header = header.unwrap_or_default().trim_start();
        let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();
        if token.is_empty() {
            return Err(ServiceError::unauthenticated("Auth header is empty."));
        }

        let claims = self
            .signer
            .validate_token(token)
            .map_err(|_| ServiceError::unauthenticated("Token has invalid content."))?;

        if self.blacklist.is_revoked(token).await? {
            warn!("Rejected request carrying a revoked token");
            return Err(ServiceError::unauthenticated("Provided token is blacklisted."));
        }

        ensure_not_expired(&claims, Utc::now())?;

        let user_id = subject_id(&claims)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::unauthenticated("Token subject no longer exists."))?;

        Ok(AuthSession {
            user,
            token: token.to_string(),
        })
    }
}

/// Authentication middleware applied to the whole router.
pub async fn require_auth(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match state.gate.authenticate(header.as_deref()).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(ServiceError::Unauthenticated { message }) => {
            debug!(reason = %message, "Request rejected by auth gate");
            unauthenticated_response().into_response()
        }
        Err(e) => {
            error!("Auth gate failure: {}", e);
            server_error_response().into_response()
        }
    }
}

/// Action a route requires, supplied as middleware state.
#[derive(Debug, Clone, Copy)]
pub struct RequiredAction(pub &'static str);

/// Authorization middleware; must run behind [`require_auth`].
pub async fn require_action(
    State(RequiredAction(action)): State<RequiredAction>,
    Extension(state): Extension<AppState>,
    session: AuthSession,
    request: Request,
    next: Next,
) -> Response {
    match state.authorizer.ensure_allowed(session.user.id, action).await {
        Ok(()) => next.run(request).await,
        Err(e) => {
            if matches!(e, ServiceError::Unauthorized { .. }) {
                debug!(user_id = session.user.id, action, "Action denied");
            }
            service_error_to_http(e).into_response()
        }
    }
}

/// Guards `route` with [`require_action`] for `action`.
pub fn with_action(action: &'static str, route: MethodRouter) -> MethodRouter {
    route.layer(middleware::from_fn_with_state(
        RequiredAction(action),
        require_action,
    ))
}
