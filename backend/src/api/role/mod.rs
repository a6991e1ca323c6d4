//! Role assignment endpoints.

pub mod handlers;
pub mod models;
pub mod routes;
