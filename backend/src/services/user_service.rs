//! User business logic service.
//!
//! Handles lookups, creation, profile and password changes, (soft) deletion
//! and the startup bootstrap of the super user.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::authorization::SUPER_ROLE;
use crate::auth::session::AuthSession;
use crate::database::models::{CreateUser, NewUser, UpdatePassword, UpdateUser, User, UserChanges};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::{RoleStore, UserStore};
use crate::utils::hasher::PasswordHasher;
use crate::utils::random::generate_password;

const SUPER_USER_NAME: &str = "Super User";
const GENERATED_PASSWORD_LENGTH: usize = 16;

pub struct UserService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, roles: Arc<dyn RoleStore>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            roles,
            hasher,
        }
    }

    /// Retrieves a user, failing with `NotFound` when absent.
    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id.to_string()))
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    /// Creates a new user with full validation.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - An email already taken by another user
    pub async fn create_user(&self, create_user: CreateUser) -> ServiceResult<User> {
        create_user.validate()?;

        if self.users.email_taken(&create_user.email, None).await? {
            return Err(ServiceError::already_exists("User", create_user.email));
        }

        let password_hash = self
            .hasher
            .hash(&create_user.password, &self.hasher.salt())?;

        let user = self
            .users
            .create(NewUser {
                name: create_user.name,
                email: create_user.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Updates name and/or email of an active user.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - An unknown or soft-deleted user
    /// - An email already used by a different user
    pub async fn update_user(&self, id: i64, update_user: UpdateUser) -> ServiceResult<User> {
        update_user.validate()?;
        self.get_user(id).await?;

        if let Some(email) = &update_user.email {
            if self.users.email_taken(email, Some(id)).await? {
                return Err(ServiceError::already_exists("User", email.clone()));
            }
        }

        let changes = UserChanges {
            name: update_user.name,
            email: update_user.email,
        };
        let user = self
            .users
            .update(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id.to_string()))?;

        info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Changes the caller's own password after checking the old one.
    ///
    /// The account is addressed by email; only its owner may change it.
    pub async fn change_password(
        &self,
        session: &AuthSession,
        request: UpdatePassword,
    ) -> ServiceResult<User> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", request.email.clone()))?;

        if user.id != session.user.id {
            warn!(
                caller_id = session.user.id,
                target_id = user.id,
                "Password change rejected: caller is not the account owner"
            );
            return Err(ServiceError::unauthorized("Forbidden."));
        }

        if !self.hasher.check_hash(&user.password_hash, &request.old_password)? {
            return Err(ServiceError::validation("The provided password is incorrect."));
        }

        request.validate()?;

        let password_hash = self
            .hasher
            .hash(&request.new_password, &self.hasher.salt())?;
        if !self.users.update_password(user.id, &password_hash).await? {
            return Err(ServiceError::not_found("User", user.id.to_string()));
        }

        info!(user_id = user.id, "Password changed");
        self.get_user(user.id).await
    }

    /// Hides the user from every lookup; their tokens stop passing the gate.
    pub async fn soft_delete_user(&self, id: i64) -> ServiceResult<()> {
        if !self.users.set_deleted_at(id, Some(Utc::now())).await? {
            return Err(ServiceError::not_found("User", id.to_string()));
        }
        info!(user_id = id, "User soft deleted");
        Ok(())
    }

    pub async fn restore_user(&self, id: i64) -> ServiceResult<()> {
        if !self.users.set_deleted_at(id, None).await? {
            return Err(ServiceError::not_found("User", id.to_string()));
        }
        info!(user_id = id, "User restored");
        Ok(())
    }

    /// Permanently removes the user and their role assignments.
    pub async fn delete_user(&self, id: i64) -> ServiceResult<()> {
        if !self.users.delete(id).await? {
            return Err(ServiceError::not_found("User", id.to_string()));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Creates the super user unless a user with `email` already exists.
    ///
    /// Returns the generated password when a user was created.
    pub async fn ensure_super_user(&self, email: &str) -> ServiceResult<Option<String>> {
        if self.users.email_taken(email, None).await? {
            return Ok(None);
        }

        let super_role = self
            .roles
            .find_role_by_name(SUPER_ROLE)
            .await?
            .ok_or_else(|| ServiceError::internal_error("super role is not seeded"))?;

        let password = generate_password(GENERATED_PASSWORD_LENGTH);
        let user = self
            .users
            .create(NewUser {
                name: SUPER_USER_NAME.to_string(),
                email: email.to_string(),
                password_hash: self.hasher.hash(&password, &self.hasher.salt())?,
            })
            .await?;
        self.roles.sync_user_roles(user.id, &[super_role.id]).await?;

        Ok(Some(password))
    }
}
