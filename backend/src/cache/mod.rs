//! Token cache: single-slot "current token" keys per subject and the
//! revocation set checked on every authenticated request.
//!
//! Production runs against Redis; without a configured Redis URL the service
//! falls back to the in-process store, which is also what the tests use.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CacheError;

pub mod memory;
pub mod redis_cache;

pub use memory::InMemoryCache;
pub use redis_cache::RedisCache;

/// Name of the set holding revoked token strings.
pub const BLACKLIST_KEY: &str = "auth_tokens_blacklist";

/// Slot holding the last access token issued to `user_id`.
pub fn current_token_key(user_id: i64) -> String {
    format!("{user_id}_current_token")
}

/// Slot holding the last refresh token issued to `user_id`.
pub fn refresh_token_key(user_id: i64) -> String {
    format!("{user_id}_refresh_token")
}

/// Key/value and set operations against the cache store. Every call may fail
/// with [`CacheError::Unavailable`].
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Adds `member` to the set at `set_key`; true when it was not present.
    async fn add(&self, set_key: &str, member: &str) -> Result<bool, CacheError>;

    async fn members(&self, set_key: &str) -> Result<HashSet<String>, CacheError>;

    async fn contains(&self, set_key: &str, member: &str) -> Result<bool, CacheError> {
        Ok(self.members(set_key).await?.contains(member))
    }

    /// Expires the whole entry at `key` after `ttl`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Append-only set of revoked tokens.
///
/// Each revocation pushes the expiry of the whole set out to `retention`, the
/// longest token lifetime. The set therefore only disappears after a quiet
/// period in which every member has expired on its own.
#[derive(Clone)]
pub struct Blacklist {
    cache: Arc<dyn TokenCache>,
    retention: Duration,
}

impl Blacklist {
    pub fn new(cache: Arc<dyn TokenCache>, retention: Duration) -> Self {
        Self { cache, retention }
    }

    /// Revokes `token`. Revoking twice is a no-op that returns false.
    pub async fn revoke(&self, token: &str) -> Result<bool, CacheError> {
        let added = self.cache.add(BLACKLIST_KEY, token).await?;
        self.cache.expire(BLACKLIST_KEY, self.retention).await?;
        Ok(added)
    }

    pub async fn is_revoked(&self, token: &str) -> Result<bool, CacheError> {
        self.cache.contains(BLACKLIST_KEY, token).await
    }
}
