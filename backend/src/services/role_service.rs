//! Role assignment business logic.

use std::sync::Arc;

use tracing::info;

use crate::database::models::{Permission, RoleWithPermissions};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::{RoleStore, UserStore};

pub struct RoleService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
}

impl RoleService {
    pub fn new(users: Arc<dyn UserStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self { users, roles }
    }

    /// Roles of an existing user, with their permissions.
    pub async fn get_user_roles(&self, user_id: i64) -> ServiceResult<Vec<RoleWithPermissions>> {
        self.ensure_user_exists(user_id).await?;
        Ok(self.roles.roles_for_user(user_id).await?)
    }

    /// Replaces the roles of a user. Unknown role ids are ignored.
    pub async fn sync_user_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
    ) -> ServiceResult<Vec<RoleWithPermissions>> {
        self.ensure_user_exists(user_id).await?;
        self.roles.sync_user_roles(user_id, role_ids).await?;

        let roles = self.roles.roles_for_user(user_id).await?;
        info!(user_id, role_count = roles.len(), "User roles synced");
        Ok(roles)
    }

    pub async fn get_role_permissions(&self, role_id: i64) -> ServiceResult<Vec<Permission>> {
        if self.roles.find_role(role_id).await?.is_none() {
            return Err(ServiceError::not_found("Role", role_id.to_string()));
        }
        Ok(self.roles.permissions_for_role(role_id).await?)
    }

    async fn ensure_user_exists(&self, user_id: i64) -> ServiceResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("User", user_id.to_string())),
        }
    }
}
