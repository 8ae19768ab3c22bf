//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use tracing::debug;
use crate::database::repositories::group::delete_group_rows;
use crate::database::repositories::unique_violation_as_invalid;
use crate::models::user::{User, AccountRole, CreateUserRequest, UpdateUserRequest};
use crate::utils::errors::SocialPlatformError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, SocialPlatformError> {
        let username = request.username;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, is_public, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, first_name, last_name, is_public, profile_completed, role, created_at, updated_at
            "#
        )
        .bind(&username)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.is_public.unwrap_or(true))
        .bind(request.role.unwrap_or(AccountRole::RegisteredUser).as_str())
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_invalid(e, || format!("Username '{}' is already taken", username)))?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, SocialPlatformError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, is_public, profile_completed, role, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, SocialPlatformError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name, is_public, profile_completed, role, created_at, updated_at FROM users WHERE username = $1"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User, SocialPlatformError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                is_public = COALESCE($4, is_public),
                profile_completed = COALESCE($5, profile_completed),
                updated_at = $6
            WHERE id = $1
            RETURNING id, username, first_name, last_name, is_public, profile_completed, role, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.is_public)
        .bind(request.profile_completed)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(SocialPlatformError::UserNotFound { user_id: id })
    }

    /// Delete a user and every row referencing them in one transaction
    pub async fn delete_cascade(&self, id: i64) -> Result<(), SocialPlatformError> {
        let mut tx = self.pool.begin().await?;

        let owned_groups: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT gm.group_id
            FROM group_memberships gm
            WHERE gm.user_id = $1
              AND gm.role = 'Owner'
              AND (SELECT COUNT(*) FROM group_memberships o
                   WHERE o.group_id = gm.group_id AND o.role = 'Owner') = 1
            "#
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for (group_id,) in owned_groups {
            debug!(user_id = id, group_id = group_id, "Deleting solely owned group");
            delete_group_rows(&mut *tx, group_id).await?;
        }

        for statement in [
            "DELETE FROM reactions WHERE user_id = $1",
            "DELETE FROM saved_posts WHERE user_id = $1",
            "DELETE FROM comments WHERE user_id = $1",
            "DELETE FROM reactions WHERE post_id IN (SELECT id FROM posts WHERE user_id = $1)",
            "DELETE FROM saved_posts WHERE post_id IN (SELECT id FROM posts WHERE user_id = $1)",
            "DELETE FROM comments WHERE post_id IN (SELECT id FROM posts WHERE user_id = $1)",
        ] {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM posts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM messages WHERE sender_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM conversation_participants WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM group_memberships WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM follow_requests WHERE follower_id = $1 OR following_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(SocialPlatformError::UserNotFound { user_id: id });
        }

        tx.commit().await?;
        Ok(())
    }
}
