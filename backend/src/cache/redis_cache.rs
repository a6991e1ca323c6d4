//! Redis-backed token cache (GET/SET, SADD/SISMEMBER/SMEMBERS, EXPIRE).

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use super::TokenCache;
use crate::errors::CacheError;

/// Token cache talking to a Redis server through a reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Opens a managed connection to `redis_url` (e.g. `redis://localhost:6379`).
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        info!("Connected to Redis token cache");
        Ok(Self { connection })
    }
}

#[async_trait]
impl TokenCache for RedisCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn add(&self, set_key: &str, member: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection.clone();
        let added: i64 = conn.sadd(set_key, member).await?;
        Ok(added > 0)
    }

    async fn members(&self, set_key: &str) -> Result<HashSet<String>, CacheError> {
        let mut conn = self.connection.clone();
        Ok(conn.smembers::<_, HashSet<String>>(set_key).await?)
    }

    async fn contains(&self, set_key: &str, member: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection.clone();
        Ok(conn.sismember::<_, _, bool>(set_key, member).await?)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let seconds = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);
        conn.expire::<_, ()>(key, seconds).await?;
        Ok(())
    }
}
