//! In-process token cache.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::TokenCache;
use crate::errors::CacheError;

#[derive(Default)]
struct Entries {
    values: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
    deadlines: HashMap<String, Instant>,
}

impl Entries {
    fn evict_expired(&mut self, key: &str) {
        if let Some(deadline) = self.deadlines.get(key) {
            if Instant::now() >= *deadline {
                self.deadlines.remove(key);
                self.values.remove(key);
                self.sets.remove(key);
            }
        }
    }
}

/// Token cache backed by process memory. State is lost on restart and not
/// shared between instances.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<Entries>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, key: &str) -> Result<MutexGuard<'_, Entries>, CacheError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::Unavailable("in-memory cache lock poisoned".to_string()))?;
        entries.evict_expired(key);
        Ok(entries)
    }
}

#[async_trait]
impl TokenCache for InMemoryCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.lock(key)?;
        // SET clears any pending expiry, as in Redis.
        entries.deadlines.remove(key);
        entries.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.lock(key)?.values.get(key).cloned())
    }

    async fn add(&self, set_key: &str, member: &str) -> Result<bool, CacheError> {
        let mut entries = self.lock(set_key)?;
        Ok(entries
            .sets
            .entry(set_key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn members(&self, set_key: &str) -> Result<HashSet<String>, CacheError> {
        Ok(self.lock(set_key)?.sets.get(set_key).cloned().unwrap_or_default())
    }

    async fn contains(&self, set_key: &str, member: &str) -> Result<bool, CacheError> {
        Ok(self
            .lock(set_key)?
            .sets
            .get(set_key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.lock(key)?;
        if entries.values.contains_key(key) || entries.sets.contains_key(key) {
            entries.deadlines.insert(key.to_string(), Instant::now() + ttl);
        }
        Ok(())
    }
}
