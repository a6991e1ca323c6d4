//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! database and cache URLs, server port, token lifetimes and the directory
//! holding the token signing key pair.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// When absent the token cache lives in process memory.
    pub redis_url: Option<String>,
    pub auth_keys_dir: PathBuf,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub super_user_email: Option<String>,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let redis_url = non_empty_var("REDIS_URL");

        let auth_keys_dir = env::var("AUTH_KEYS_DIR")
            .map(PathBuf::from)
            .context("AUTH_KEYS_DIR not set")?;

        let access_token_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<i64>()
            .context("ACCESS_TOKEN_TTL_MINUTES must be a valid number")?;

        let refresh_token_ttl_minutes = env::var("REFRESH_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "240".to_string())
            .parse::<i64>()
            .context("REFRESH_TOKEN_TTL_MINUTES must be a valid number")?;

        if access_token_ttl_minutes <= 0 || refresh_token_ttl_minutes <= 0 {
            anyhow::bail!("token lifetimes must be positive");
        }

        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .context("BCRYPT_COST must be a valid number")?;

        let super_user_email = non_empty_var("SUPER_USER_EMAIL");

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            redis_url,
            auth_keys_dir,
            access_token_ttl_minutes,
            refresh_token_ttl_minutes,
            bcrypt_cost,
            super_user_email,
            server_port,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
