//! Database repository for user lookups, changes and (soft) deletion.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::UserStore;
use crate::database::models::{NewUser, User, UserChanges};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// Retrieves a user by their unique identifier.
    ///
    /// # Returns
    /// `Some(User)` if found and not deleted, `None` otherwise
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their email address.
    ///
    /// # Returns
    /// `Some(User)` if found and not deleted, `None` otherwise
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Creates a new user in the database.
    ///
    /// # Returns
    /// The newly created User with all fields populated
    async fn create(&self, user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(changes.name)
        .bind(changes.email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn email_taken(&self, email: &str, excluding: Option<i64>) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? AND (? IS NULL OR id <> ?))",
        )
        .bind(email)
        .bind(excluding)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn set_deleted_at(&self, id: i64, deleted_at: Option<DateTime<Utc>>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(deleted_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM users_roles WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::migrated_pool;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "John Doe".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_find_by_id_and_email() {
        let repo = UserRepository::new(migrated_pool().await);

        let created = repo.create(new_user("jdoe@domain.com")).await.unwrap();
        assert!(created.id > 0);

        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "jdoe@domain.com");

        let by_email = repo.find_by_email("jdoe@domain.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.password_hash, "$2b$04$hash");
    }

    #[tokio::test]
    async fn unknown_user_is_none() {
        let repo = UserRepository::new(migrated_pool().await);
        assert!(repo.find_by_id(999).await.unwrap().is_none());
        assert!(repo.find_by_email("nobody@domain.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn soft_deleted_users_are_hidden_until_restored() {
        let repo = UserRepository::new(migrated_pool().await);
        let user = repo.create(new_user("gone@domain.com")).await.unwrap();

        assert!(repo.set_deleted_at(user.id, Some(Utc::now())).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
        assert!(repo.find_by_email("gone@domain.com").await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.update(user.id, UserChanges::default()).await.unwrap().is_none());
        // Deleted rows still own their email.
        assert!(repo.email_taken("gone@domain.com", None).await.unwrap());

        assert!(repo.set_deleted_at(user.id, None).await.unwrap());
        assert!(repo.find_by_id(user.id).await.unwrap().is_some());

        assert!(!repo.set_deleted_at(999, None).await.unwrap());
    }

    #[tokio::test]
    async fn update_changes_only_present_fields() {
        let repo = UserRepository::new(migrated_pool().await);
        let user = repo.create(new_user("old@domain.com")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                UserChanges {
                    name: None,
                    email: Some("new@domain.com".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "John Doe");
        assert_eq!(updated.email, "new@domain.com");
        assert!(repo.update(999, UserChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn email_taken_can_exclude_owner() {
        let repo = UserRepository::new(migrated_pool().await);
        let user = repo.create(new_user("me@domain.com")).await.unwrap();

        assert!(repo.email_taken("me@domain.com", None).await.unwrap());
        assert!(!repo.email_taken("me@domain.com", Some(user.id)).await.unwrap());
        assert!(repo.email_taken("me@domain.com", Some(user.id + 1)).await.unwrap());
        assert!(!repo.email_taken("free@domain.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn password_update_and_hard_delete() {
        let repo = UserRepository::new(migrated_pool().await);
        let user = repo.create(new_user("del@domain.com")).await.unwrap();

        assert!(repo.update_password(user.id, "$2b$04$other").await.unwrap());
        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "$2b$04$other");

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(!repo.email_taken("del@domain.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_schema() {
        let repo = UserRepository::new(migrated_pool().await);
        repo.create(new_user("dup@domain.com")).await.unwrap();
        assert!(repo.create(new_user("dup@domain.com")).await.is_err());
    }
}
