//! Main entry point for the AccessGate backend.
//!
//! This file initializes logging, loads configuration, connects the database
//! and token cache, loads the signing keys and serves the Axum router.

mod api;
mod auth;
mod cache;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod state;
#[cfg(test)]
mod testing;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use cache::{InMemoryCache, RedisCache, TokenCache};
use config::Config;
use database::Database;
use repositories::{RoleRepository, UserRepository};
use state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utils::hasher::PasswordHasher;
use utils::jwt::TokenSigner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config).await?;
    db.migrate().await?;
    let pool = db.pool().clone();

    let cache: Arc<dyn TokenCache> = match &config.redis_url {
        Some(url) => {
            info!("Using Redis token cache");
            Arc::new(RedisCache::connect(url).await.context("failed to connect to Redis")?)
        }
        None => {
            warn!("REDIS_URL not set, token cache is kept in process memory");
            Arc::new(InMemoryCache::new())
        }
    };

    let signer = TokenSigner::from_keys_dir(&config.auth_keys_dir)
        .context("failed to load token signing keys")?;
    info!("Loaded signing keys from {}", config.auth_keys_dir.display());

    let state = AppState::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(RoleRepository::new(pool)),
        cache,
        Arc::new(signer),
        PasswordHasher::new(config.bcrypt_cost),
        auth::TokenLifetimes::from_minutes(
            config.access_token_ttl_minutes,
            config.refresh_token_ttl_minutes,
        ),
    )?;

    if let Some(email) = &config.super_user_email {
        if let Some(password) = state.users.ensure_super_user(email).await? {
            info!(
                "Created super user {} with password {}",
                email, password
            );
        }
    }

    let app = api::app_router(state);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    info!("Starting AccessGate server on port {}", config.server_port);
    axum::serve(listener, app).await?;

    Ok(())
}
