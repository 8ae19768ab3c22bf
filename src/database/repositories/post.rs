//! Post and comment repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::database::repositories::unique_violation_as_invalid;
use crate::models::post::{Post, Comment, CommentSentiment};
use crate::models::reaction::{Reaction, ReactionType, SavedPost};
use crate::utils::errors::SocialPlatformError;

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post
    pub async fn create(&self, user_id: i64, description: &str) -> Result<Post, SocialPlatformError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, description, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, description, created_at
            "#
        )
        .bind(user_id)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Find post by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Post>, SocialPlatformError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, user_id, description, created_at FROM posts WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Posts by any of the given authors, newest first
    pub async fn get_by_authors(&self, user_ids: &[i64]) -> Result<Vec<Post>, SocialPlatformError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, user_id, description, created_at FROM posts WHERE user_id = ANY($1) ORDER BY created_at DESC, id DESC"
        )
        .bind(user_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Delete a post after its reactions, saves and comments
    pub async fn delete_cascade(&self, id: i64) -> Result<(), SocialPlatformError> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM reactions WHERE post_id = $1",
            "DELETE FROM saved_posts WHERE post_id = $1",
            "DELETE FROM comments WHERE post_id = $1",
        ] {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Create a comment
    pub async fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        body: &str,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment, SocialPlatformError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, body, created_at, sentiment_label, sentiment_confidence, sentiment_analyzed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, post_id, user_id, body, created_at, edited_at, sentiment_label, sentiment_confidence, sentiment_analyzed_at
            "#
        )
        .bind(post_id)
        .bind(user_id)
        .bind(body)
        .bind(Utc::now())
        .bind(sentiment.as_ref().map(|s| s.label.clone()))
        .bind(sentiment.as_ref().map(|s| s.confidence))
        .bind(sentiment.as_ref().map(|s| s.analyzed_at))
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Find comment by ID
    pub async fn find_comment(&self, id: i64) -> Result<Option<Comment>, SocialPlatformError> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, user_id, body, created_at, edited_at, sentiment_label, sentiment_confidence, sentiment_analyzed_at FROM comments WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Update comment body and sentiment
    pub async fn update_comment(
        &self,
        id: i64,
        body: &str,
        edited_at: DateTime<Utc>,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment, SocialPlatformError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET body = $2,
                edited_at = $3,
                sentiment_label = $4,
                sentiment_confidence = $5,
                sentiment_analyzed_at = $6
            WHERE id = $1
            RETURNING id, post_id, user_id, body, created_at, edited_at, sentiment_label, sentiment_confidence, sentiment_analyzed_at
            "#
        )
        .bind(id)
        .bind(body)
        .bind(edited_at)
        .bind(sentiment.as_ref().map(|s| s.label.clone()))
        .bind(sentiment.as_ref().map(|s| s.confidence))
        .bind(sentiment.as_ref().map(|s| s.analyzed_at))
        .fetch_optional(&self.pool)
        .await?;

        comment.ok_or(SocialPlatformError::CommentNotFound { comment_id: id })
    }

    /// Delete comment
    pub async fn delete_comment(&self, id: i64) -> Result<(), SocialPlatformError> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Comments on a post, oldest first
    pub async fn get_comments(&self, post_id: i64) -> Result<Vec<Comment>, SocialPlatformError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, user_id, body, created_at, edited_at, sentiment_label, sentiment_confidence, sentiment_analyzed_at FROM comments WHERE post_id = $1 ORDER BY created_at, id"
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Find a user's reaction to a post
    pub async fn find_reaction(&self, post_id: i64, user_id: i64) -> Result<Option<Reaction>, SocialPlatformError> {
        let reaction = sqlx::query_as::<_, Reaction>(
            "SELECT id, post_id, user_id, reaction_type, created_at FROM reactions WHERE post_id = $1 AND user_id = $2"
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reaction)
    }

    /// Create a reaction
    pub async fn create_reaction(
        &self,
        post_id: i64,
        user_id: i64,
        reaction_type: ReactionType,
    ) -> Result<Reaction, SocialPlatformError> {
        let reaction = sqlx::query_as::<_, Reaction>(
            r#"
            INSERT INTO reactions (post_id, user_id, reaction_type, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, reaction_type, created_at
            "#
        )
        .bind(post_id)
        .bind(user_id)
        .bind(reaction_type.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_invalid(e, || {
            format!("User {} already reacted to post {}", user_id, post_id)
        }))?;

        Ok(reaction)
    }

    /// Change the type of an existing reaction
    pub async fn set_reaction_type(&self, id: i64, reaction_type: ReactionType) -> Result<Reaction, SocialPlatformError> {
        let reaction = sqlx::query_as::<_, Reaction>(
            r#"
            UPDATE reactions SET reaction_type = $2
            WHERE id = $1
            RETURNING id, post_id, user_id, reaction_type, created_at
            "#
        )
        .bind(id)
        .bind(reaction_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        reaction.ok_or_else(|| SocialPlatformError::InvalidInput(format!("Reaction {} no longer exists", id)))
    }

    /// Delete reaction
    pub async fn delete_reaction(&self, id: i64) -> Result<(), SocialPlatformError> {
        sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Reactions on a post grouped by type
    pub async fn reaction_counts(&self, post_id: i64) -> Result<Vec<(ReactionType, i64)>, SocialPlatformError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT reaction_type, COUNT(*) FROM reactions WHERE post_id = $1 GROUP BY reaction_type"
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for (reaction_type, count) in rows {
            counts.push((ReactionType::try_from(reaction_type)?, count));
        }
        Ok(counts)
    }

    /// Find a user's save of a post
    pub async fn find_saved(&self, user_id: i64, post_id: i64) -> Result<Option<SavedPost>, SocialPlatformError> {
        let saved = sqlx::query_as::<_, SavedPost>(
            "SELECT id, user_id, post_id, saved_at FROM saved_posts WHERE user_id = $1 AND post_id = $2"
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(saved)
    }

    /// Save a post for a user
    pub async fn create_saved(&self, user_id: i64, post_id: i64) -> Result<SavedPost, SocialPlatformError> {
        let saved = sqlx::query_as::<_, SavedPost>(
            r#"
            INSERT INTO saved_posts (user_id, post_id, saved_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, post_id, saved_at
            "#
        )
        .bind(user_id)
        .bind(post_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation_as_invalid(e, || {
            format!("User {} already saved post {}", user_id, post_id)
        }))?;

        Ok(saved)
    }

    /// Delete saved post
    pub async fn delete_saved(&self, id: i64) -> Result<(), SocialPlatformError> {
        sqlx::query("DELETE FROM saved_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Posts saved by a user, most recently saved first
    pub async fn get_saved_by_user(&self, user_id: i64) -> Result<Vec<Post>, SocialPlatformError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, p.description, p.created_at
            FROM saved_posts s
            JOIN posts p ON p.id = s.post_id
            WHERE s.user_id = $1
            ORDER BY s.saved_at DESC, s.id DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
