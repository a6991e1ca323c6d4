//! Core business logic for the authentication system.
//!
//! Login, refresh and logout all revolve around two single-slot cache keys per
//! user (current access token, current refresh token) and the revocation set.
//! Issuing a new pair always revokes the access token it supersedes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Duration, Utc};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::claims::{access_claims, ensure_not_expired, refresh_claims};
use crate::auth::models::{LoginRequest, TokenPair};
use crate::auth::session::AuthSession;
use crate::cache::{Blacklist, TokenCache, current_token_key, refresh_token_key};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::UserStore;
use crate::utils::hasher::PasswordHasher;
use crate::utils::jwt::TokenSigner;

const WRONG_CREDENTIALS: &str = "Wrong credentials.";

/// Lifetimes of issued tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenLifetimes {
    pub fn from_minutes(access: i64, refresh: i64) -> Self {
        Self {
            access: Duration::minutes(access),
            refresh: Duration::minutes(refresh),
        }
    }

    /// Longest time any issued token stays valid.
    pub fn longest(&self) -> Duration {
        self.access.max(self.refresh)
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self::from_minutes(60, 240)
    }
}

/// Serializes the read-then-write on a user's cache slots within this process.
#[derive(Default)]
struct SubjectLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl SubjectLocks {
    async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only referenced by the map are idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(user_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Authentication service handling login, token refresh and logout
pub struct AuthService {
    users: Arc<dyn UserStore>,
    cache: Arc<dyn TokenCache>,
    blacklist: Blacklist,
    signer: Arc<TokenSigner>,
    hasher: PasswordHasher,
    lifetimes: TokenLifetimes,
    locks: SubjectLocks,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: Arc<dyn TokenCache>,
        blacklist: Blacklist,
        signer: Arc<TokenSigner>,
        hasher: PasswordHasher,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            users,
            cache,
            blacklist,
            signer,
            hasher,
            lifetimes,
            locks: SubjectLocks::default(),
        }
    }

    /// Authenticates by email and password and issues a fresh token pair.
    ///
    /// Empty fields, an unknown email and a wrong password all fail with the
    /// same message. The access token previously issued to the user, if any,
    /// is revoked.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenPair> {
        if request.validate().is_err() {
            warn!("Login rejected: empty email or password");
            return Err(ServiceError::unauthenticated(WRONG_CREDENTIALS));
        }

        let Some(user) = self.users.find_by_email(&request.email).await? else {
            warn!("Login rejected: unknown email");
            return Err(ServiceError::unauthenticated(WRONG_CREDENTIALS));
        };

        if !self.hasher.check_hash(&user.password_hash, &request.password)? {
            warn!(user_id = user.id, "Login rejected: wrong password");
            return Err(ServiceError::unauthenticated(WRONG_CREDENTIALS));
        }

        let _guard = self.locks.acquire(user.id).await;
        self.revoke_current_token(user.id).await?;
        let pair = self.issue_pair(user.id).await?;

        info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Trades the caller's stored refresh token for a new pair.
    ///
    /// The presented token must equal the one last issued to the caller, carry
    /// a valid signature and not be expired.
    pub async fn refresh(&self, session: &AuthSession, presented: &str) -> ServiceResult<TokenPair> {
        let user_id = session.user.id;
        let _guard = self.locks.acquire(user_id).await;

        let stored = self
            .cache
            .get(&refresh_token_key(user_id))
            .await?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ServiceError::unauthenticated("User does not have a refresh token stored.")
            })?;

        if stored != presented {
            warn!(user_id, "Refresh rejected: token does not match the stored one");
            return Err(ServiceError::unauthenticated("Invalid refresh token."));
        }

        let claims = self
            .signer
            .validate_token(presented)
            .map_err(|_| ServiceError::unauthenticated("Token has invalid content."))?;
        ensure_not_expired(&claims, Utc::now())?;

        self.revoke_current_token(user_id).await?;
        let pair = self.issue_pair(user_id).await?;

        info!(user_id, "Token pair refreshed");
        Ok(pair)
    }

    /// Revokes the token the caller authenticated with. Repeating it is harmless.
    pub async fn logout(&self, session: &AuthSession) -> ServiceResult<()> {
        let newly_revoked = self.blacklist.revoke(&session.token).await?;
        info!(user_id = session.user.id, newly_revoked, "User logged out");
        Ok(())
    }

    async fn revoke_current_token(&self, user_id: i64) -> ServiceResult<()> {
        let current = self.cache.get(&current_token_key(user_id)).await?;
        if let Some(current) = current.filter(|token| !token.is_empty()) {
            self.blacklist.revoke(&current).await?;
        }
        Ok(())
    }

    async fn issue_pair(&self, user_id: i64) -> ServiceResult<TokenPair> {
        let now = Utc::now();
        let access_token = self
            .signer
            .create_token(&access_claims(user_id, now, self.lifetimes.access))?;
        let refresh_token = self
            .signer
            .create_token(&refresh_claims(user_id, now, self.lifetimes.refresh))?;

        self.cache
            .set(&current_token_key(user_id), &access_token)
            .await?;
        self.cache
            .set(&refresh_token_key(user_id), &refresh_token)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
