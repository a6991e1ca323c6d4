//! Authentication and authorization.
//!
//! Token issuance and rotation live in `service`, per-request verification in
//! `middleware`, and role-based permission checks in `authorization`.

pub mod authorization;
pub mod claims;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod session;

pub use authorization::AuthorizationResolver;
pub use middleware::{AuthGate, require_auth};
pub use service::{AuthService, TokenLifetimes};
pub use session::AuthSession;
