//! Database repository for roles, permissions and user-role assignments.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::RoleStore;
use crate::database::models::{Permission, Role, RoleWithPermissions};

/// Repository for role database operations.
///
/// Reads the role/permission graph and rewrites a user's role assignments.
#[derive(Clone)]
pub struct RoleRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl RoleRepository {
    /// Creates a new RoleRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_role(&self, id: i64) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    /// Retrieves the first role with exactly this name.
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name FROM roles WHERE name = ? ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn permissions_for_role(&self, role_id: i64) -> Result<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.name
            FROM roles_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = ?
            ORDER BY p.id
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    async fn roles_for_user(&self, user_id: i64) -> Result<Vec<RoleWithPermissions>> {
        let rows = sqlx::query_as::<_, (i64, String, Option<i64>, Option<String>)>(
            r#"
            SELECT r.id, r.name, p.id, p.name
            FROM users_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN roles_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = ?
            ORDER BY r.id, p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        // Rows arrive grouped by role id.
        let mut roles: Vec<RoleWithPermissions> = Vec::new();
        for (role_id, role_name, permission_id, permission_name) in rows {
            if roles.last().is_none_or(|role| role.id != role_id) {
                roles.push(RoleWithPermissions {
                    id: role_id,
                    name: role_name,
                    permissions: Vec::new(),
                });
            }
            if let (Some(id), Some(name), Some(role)) = (permission_id, permission_name, roles.last_mut()) {
                role.permissions.push(Permission { id, name });
            }
        }

        Ok(roles)
    }

    async fn sync_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM users_roles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for role_id in role_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO users_roles (user_id, role_id) SELECT ?, id FROM roles WHERE id = ?",
            )
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::repositories::{UserRepository, UserStore};
    use crate::testing::migrated_pool;

    async fn seeded() -> (RoleRepository, i64) {
        let pool = migrated_pool().await;
        let user = UserRepository::new(pool.clone())
            .create(NewUser {
                name: "Jane".to_string(),
                email: "jane@domain.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        (RoleRepository::new(pool), user.id)
    }

    #[tokio::test]
    async fn seeded_roles_are_present() {
        let (repo, _) = seeded().await;

        let super_role = repo.find_role_by_name("super").await.unwrap().unwrap();
        assert!(repo.permissions_for_role(super_role.id).await.unwrap().is_empty());

        let common = repo.find_role_by_name("common user").await.unwrap().unwrap();
        let permissions = repo.permissions_for_role(common.id).await.unwrap();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].name, "retrieve users");
    }

    #[tokio::test]
    async fn user_without_roles_has_none() {
        let (repo, user_id) = seeded().await;
        assert!(repo.roles_for_user(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sync_replaces_roles_and_skips_unknown_ids() {
        let (repo, user_id) = seeded().await;
        let super_role = repo.find_role_by_name("super").await.unwrap().unwrap();
        let common = repo.find_role_by_name("common user").await.unwrap().unwrap();

        repo.sync_user_roles(user_id, &[super_role.id, 9_999]).await.unwrap();
        let roles = repo.roles_for_user(user_id).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "super");
        assert!(roles[0].permissions.is_empty());

        repo.sync_user_roles(user_id, &[common.id, common.id]).await.unwrap();
        let roles = repo.roles_for_user(user_id).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "common user");
        assert_eq!(roles[0].permissions[0].name, "retrieve users");
    }

    #[tokio::test]
    async fn unknown_role_is_none() {
        let (repo, _) = seeded().await;
        assert!(repo.find_role(9_999).await.unwrap().is_none());
        assert!(repo.find_role_by_name("nobody").await.unwrap().is_none());
    }
}
