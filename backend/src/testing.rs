//! Shared fixtures for the unit tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::api::app_router;
use crate::auth::models::{LoginRequest, TokenPair};
use crate::auth::{AuthSession, TokenLifetimes};
use crate::cache::{InMemoryCache, TokenCache};
use crate::database::models::{NewUser, User};
use crate::errors::{CacheError, ServiceError};
use crate::repositories::{RoleRepository, RoleStore, UserRepository, UserStore};
use crate::state::AppState;
use crate::utils::hasher::PasswordHasher;
use crate::utils::jwt::TokenSigner;

pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/keys/private-key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/keys/public-key.pem");

/// Lowest cost bcrypt accepts.
const TEST_BCRYPT_COST: u32 = 4;

pub fn test_signer() -> TokenSigner {
    TokenSigner::from_pem(Some(TEST_PRIVATE_KEY.as_bytes()), TEST_PUBLIC_KEY.as_bytes())
        .expect("fixture keys are valid")
}

/// Fresh in-memory database with the schema and seed rows applied. A single
/// connection keeps every query on the same in-memory database.
pub async fn migrated_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    pool
}

pub fn unauthenticated_message(error: ServiceError) -> String {
    match error {
        ServiceError::Unauthenticated { message } => message,
        other => panic!("expected unauthenticated error, got {other:?}"),
    }
}

/// Cache whose every operation fails, as with an unreachable Redis.
pub struct UnavailableCache;

#[async_trait]
impl TokenCache for UnavailableCache {
    async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn add(&self, _set_key: &str, _member: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn members(&self, _set_key: &str) -> Result<HashSet<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

/// Fully wired application state over an in-memory database.
pub struct TestContext {
    pub state: AppState,
    pub cache: Arc<dyn TokenCache>,
    pub signer: Arc<TokenSigner>,
    pub user_store: Arc<dyn UserStore>,
    pub role_store: Arc<dyn RoleStore>,
    hasher: PasswordHasher,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_cache(Arc::new(InMemoryCache::new())).await
    }

    pub async fn with_unavailable_cache() -> Self {
        Self::with_cache(Arc::new(UnavailableCache)).await
    }

    async fn with_cache(cache: Arc<dyn TokenCache>) -> Self {
        let pool = migrated_pool().await;
        let user_store: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
        let role_store: Arc<dyn RoleStore> = Arc::new(RoleRepository::new(pool));
        let signer = Arc::new(test_signer());
        let hasher = PasswordHasher::new(TEST_BCRYPT_COST);

        let state = AppState::new(
            user_store.clone(),
            role_store.clone(),
            cache.clone(),
            signer.clone(),
            hasher.clone(),
            TokenLifetimes::default(),
        )
        .expect("default lifetimes are valid");

        Self {
            state,
            cache,
            signer,
            user_store,
            role_store,
            hasher,
        }
    }

    pub fn router(&self) -> Router {
        app_router(self.state.clone())
    }

    pub async fn create_user(&self, email: &str, password: &str) -> User {
        let password_hash = self.hasher.hash(password, &self.hasher.salt()).unwrap();
        self.user_store
            .create(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .unwrap()
    }

    pub fn login_request(&self, email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Logs in, pausing first so tokens issued back to back get distinct
    /// timestamps and therefore distinct signatures.
    pub async fn login(&self, email: &str, password: &str) -> TokenPair {
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.state
            .auth
            .login(self.login_request(email, password))
            .await
            .unwrap()
    }

    pub fn session_for(&self, user: &User, token: &str) -> AuthSession {
        AuthSession {
            user: user.clone(),
            token: token.to_string(),
        }
    }

    pub async fn role_id(&self, name: &str) -> i64 {
        self.role_store
            .find_role_by_name(name)
            .await
            .unwrap()
            .expect("role is seeded")
            .id
    }

    /// Adds the named role to the user's current roles.
    pub async fn assign_role(&self, user_id: i64, role_name: &str) {
        let mut role_ids: Vec<i64> = self
            .role_store
            .roles_for_user(user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|role| role.id)
            .collect();
        role_ids.push(self.role_id(role_name).await);
        self.role_store
            .sync_user_roles(user_id, &role_ids)
            .await
            .unwrap();
    }
}
