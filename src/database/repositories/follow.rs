//! Follow request repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::database::repositories::unique_violation_as_invalid;
use crate::models::follow::{FollowRequest, FollowStatus};
use crate::utils::errors::SocialPlatformError;

#[derive(Clone)]
pub struct FollowRepository {
    pool: PgPool,
}

impl FollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a follow request
    pub async fn create(&self, follower_id: i64, following_id: i64, status: FollowStatus) -> Result<FollowRequest, SocialPlatformError> {
        let request = sqlx::query_as::<_, FollowRequest>(
            r#"
            INSERT INTO follow_requests (follower_id, following_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, follower_id, following_id, status, created_at, updated_at
            "#
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_invalid(e, || {
            format!("User {} already has a follow edge to user {}", follower_id, following_id)
        }))?;

        Ok(request)
    }

    /// Find the edge between two users
    pub async fn find_by_pair(&self, follower_id: i64, following_id: i64) -> Result<Option<FollowRequest>, SocialPlatformError> {
        let request = sqlx::query_as::<_, FollowRequest>(
            "SELECT id, follower_id, following_id, status, created_at, updated_at FROM follow_requests WHERE follower_id = $1 AND following_id = $2"
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Find follow request by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<FollowRequest>, SocialPlatformError> {
        let request = sqlx::query_as::<_, FollowRequest>(
            "SELECT id, follower_id, following_id, status, created_at, updated_at FROM follow_requests WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Update request status
    pub async fn set_status(&self, id: i64, status: FollowStatus) -> Result<FollowRequest, SocialPlatformError> {
        let request = sqlx::query_as::<_, FollowRequest>(
            r#"
            UPDATE follow_requests
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, follower_id, following_id, status, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        request.ok_or(SocialPlatformError::FollowRequestNotFound { request_id: id })
    }

    /// Delete follow request
    pub async fn delete(&self, id: i64) -> Result<(), SocialPlatformError> {
        sqlx::query("DELETE FROM follow_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Edges where the user is on either side
    pub async fn touching(&self, user_id: i64) -> Result<Vec<FollowRequest>, SocialPlatformError> {
        let requests = sqlx::query_as::<_, FollowRequest>(
            "SELECT id, follower_id, following_id, status, created_at, updated_at FROM follow_requests WHERE follower_id = $1 OR following_id = $1 ORDER BY id"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Edges pointing at the user
    pub async fn incoming(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>, SocialPlatformError> {
        let requests = sqlx::query_as::<_, FollowRequest>(
            "SELECT id, follower_id, following_id, status, created_at, updated_at FROM follow_requests WHERE following_id = $1 AND status = $2 ORDER BY id"
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Edges leaving the user
    pub async fn outgoing(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>, SocialPlatformError> {
        let requests = sqlx::query_as::<_, FollowRequest>(
            "SELECT id, follower_id, following_id, status, created_at, updated_at FROM follow_requests WHERE follower_id = $1 AND status = $2 ORDER BY id"
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
