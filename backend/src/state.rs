//! Shared application state handed to every handler through an `Extension`.

use std::sync::Arc;

use crate::auth::{AuthGate, AuthService, AuthorizationResolver, TokenLifetimes};
use crate::cache::{Blacklist, TokenCache};
use crate::errors::ServiceError;
use crate::repositories::{RoleStore, UserStore};
use crate::services::{RoleService, UserService};
use crate::utils::hasher::PasswordHasher;
use crate::utils::jwt::TokenSigner;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub gate: Arc<AuthGate>,
    pub authorizer: Arc<AuthorizationResolver>,
    pub blacklist: Blacklist,
    pub users: Arc<UserService>,
    pub roles: Arc<RoleService>,
}

impl AppState {
    /// Wires the services around one signer, one cache and the stores.
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        cache: Arc<dyn TokenCache>,
        signer: Arc<TokenSigner>,
        hasher: PasswordHasher,
        lifetimes: TokenLifetimes,
    ) -> Result<Self, ServiceError> {
        let retention = lifetimes
            .longest()
            .to_std()
            .map_err(|_| ServiceError::internal_error("token lifetimes must be positive"))?;
        let blacklist = Blacklist::new(cache.clone(), retention);

        Ok(Self {
            auth: Arc::new(AuthService::new(
                users.clone(),
                cache,
                blacklist.clone(),
                signer.clone(),
                hasher.clone(),
                lifetimes,
            )),
            gate: Arc::new(AuthGate::new(signer, blacklist.clone(), users.clone())),
            authorizer: Arc::new(AuthorizationResolver::new(roles.clone())),
            blacklist,
            users: Arc::new(UserService::new(users.clone(), roles.clone(), hasher)),
            roles: Arc::new(RoleService::new(users, roles)),
        })
    }
}
