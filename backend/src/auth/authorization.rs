//! Role-based authorization.
//!
//! A user's effective permissions are the union of the permission names of
//! all roles assigned to them. Holding the `super` role allows every action.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::database::models::RoleWithPermissions;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::RoleStore;

/// Role name that bypasses permission checks, compared case-insensitively.
pub const SUPER_ROLE: &str = "super";

/// Action names guarding the user-management endpoints.
pub mod actions {
    pub const RETRIEVE_USERS: &str = "retrieve users";
    pub const CREATE_USERS: &str = "create users";
    pub const UPDATE_USERS: &str = "update users";
    pub const DELETE_USERS: &str = "delete users";
}

pub fn is_super(roles: &[RoleWithPermissions]) -> bool {
    roles
        .iter()
        .any(|role| role.name.eq_ignore_ascii_case(SUPER_ROLE))
}

/// De-duplicated union of permission names across `roles`.
pub fn effective_permissions(roles: &[RoleWithPermissions]) -> BTreeSet<String> {
    roles
        .iter()
        .flat_map(|role| role.permissions.iter())
        .map(|permission| permission.name.clone())
        .collect()
}

pub fn is_permitted(roles: &[RoleWithPermissions], action: &str) -> bool {
    is_super(roles) || effective_permissions(roles).contains(action)
}

/// Decides whether a user may perform a named action. Roles are loaded fresh
/// on every call.
pub struct AuthorizationResolver {
    roles: Arc<dyn RoleStore>,
}

impl AuthorizationResolver {
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self { roles }
    }

    pub async fn is_allowed(&self, user_id: i64, action: &str) -> ServiceResult<bool> {
        let roles = self.roles.roles_for_user(user_id).await?;
        Ok(is_permitted(&roles, action))
    }

    /// Like [`is_allowed`](Self::is_allowed) but fails with `Unauthorized`.
    pub async fn ensure_allowed(&self, user_id: i64, action: &str) -> ServiceResult<()> {
        if self.is_allowed(user_id, action).await? {
            Ok(())
        } else {
            Err(ServiceError::unauthorized(format!(
                "Action '{action}' is not permitted"
            )))
        }
    }
}
