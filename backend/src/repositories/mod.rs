//! Persistence collaborators used by the auth pipeline.
//!
//! The services depend only on the `UserStore` and `RoleStore` traits; the
//! SQLite repositories are the production implementations.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::models::{NewUser, Permission, Role, RoleWithPermissions, User, UserChanges};

pub mod role_repository;
pub mod user_repository;

pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;

/// Lookup and creation of users. Soft-deleted users are never returned.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    async fn create(&self, user: NewUser) -> Result<User>;

    /// Applies the present fields to an active user. `None` when no such user.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool>;

    /// Whether any row, soft-deleted included, uses `email`, other than
    /// `excluding`.
    async fn email_taken(&self, email: &str, excluding: Option<i64>) -> Result<bool>;

    /// Stamps or clears `deleted_at`. False when the id does not exist.
    async fn set_deleted_at(&self, id: i64, deleted_at: Option<DateTime<Utc>>) -> Result<bool>;

    /// Removes the row and its role assignments.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Read access to the role/permission graph plus replacement of a user's roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role(&self, id: i64) -> Result<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;

    async fn permissions_for_role(&self, role_id: i64) -> Result<Vec<Permission>>;

    /// Roles assigned to `user_id`, each with its permissions.
    async fn roles_for_user(&self, user_id: i64) -> Result<Vec<RoleWithPermissions>>;

    /// Replaces the roles of `user_id` with the existing roles among `role_ids`.
    /// Unknown ids are skipped.
    async fn sync_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()>;
}
