//! Conversation and message repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::models::conversation::{Conversation, ConversationParticipant, Message};
use crate::utils::errors::SocialPlatformError;

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find conversation by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Conversation>, SocialPlatformError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, group_id, created_at FROM conversations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Find the conversation attached to a group
    pub async fn find_by_group(&self, group_id: i64) -> Result<Option<Conversation>, SocialPlatformError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, group_id, created_at FROM conversations WHERE group_id = $1"
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Find the 1:1 conversation between two users
    pub async fn find_direct(&self, user_a: i64, user_b: i64) -> Result<Option<Conversation>, SocialPlatformError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT c.id, c.group_id, c.created_at
            FROM conversations c
            WHERE c.group_id IS NULL
              AND EXISTS (SELECT 1 FROM conversation_participants p WHERE p.conversation_id = c.id AND p.user_id = $1)
              AND EXISTS (SELECT 1 FROM conversation_participants p WHERE p.conversation_id = c.id AND p.user_id = $2)
              AND (SELECT COUNT(*) FROM conversation_participants p WHERE p.conversation_id = c.id) = 2
            ORDER BY c.id
            LIMIT 1
            "#
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    /// Create a 1:1 conversation with both participants
    pub async fn create_direct(&self, user_a: i64, user_b: i64) -> Result<Conversation, SocialPlatformError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (group_id, created_at) VALUES (NULL, $1) RETURNING id, group_id, created_at"
        )
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in [user_a, user_b] {
            sqlx::query(
                "INSERT INTO conversation_participants (conversation_id, user_id, last_entry) VALUES ($1, $2, $3)"
            )
            .bind(conversation.id)
            .bind(user_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(conversation)
    }

    /// Get conversation participants
    pub async fn get_participants(&self, conversation_id: i64) -> Result<Vec<ConversationParticipant>, SocialPlatformError> {
        let participants = sqlx::query_as::<_, ConversationParticipant>(
            "SELECT id, conversation_id, user_id, last_entry FROM conversation_participants WHERE conversation_id = $1 ORDER BY id"
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Record when a participant last opened the conversation
    pub async fn touch_participant(&self, conversation_id: i64, user_id: i64, at: DateTime<Utc>) -> Result<(), SocialPlatformError> {
        sqlx::query("UPDATE conversation_participants SET last_entry = $3 WHERE conversation_id = $1 AND user_id = $2")
            .bind(conversation_id)
            .bind(user_id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get conversations a user participates in
    pub async fn get_user_conversations(&self, user_id: i64) -> Result<Vec<Conversation>, SocialPlatformError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT c.id, c.group_id, c.created_at
            FROM conversations c
            JOIN conversation_participants p ON p.conversation_id = c.id
            WHERE p.user_id = $1
            ORDER BY c.id
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    /// Get messages, oldest first
    pub async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>, SocialPlatformError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, sender_id, content, is_read, sent_at FROM messages WHERE conversation_id = $1 ORDER BY sent_at, id"
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Store recomputed read flags
    pub async fn set_read_flags(&self, changes: &[(i64, bool)]) -> Result<(), SocialPlatformError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for &(message_id, is_read) in changes {
            sqlx::query("UPDATE messages SET is_read = $2 WHERE id = $1")
                .bind(message_id)
                .bind(is_read)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Create a message
    pub async fn create_message(&self, conversation_id: i64, sender_id: i64, content: &str) -> Result<Message, SocialPlatformError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content, is_read, sent_at)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING id, conversation_id, sender_id, content, is_read, sent_at
            "#
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Find message by ID
    pub async fn find_message(&self, id: i64) -> Result<Option<Message>, SocialPlatformError> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, sender_id, content, is_read, sent_at FROM messages WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    /// Replace message content
    pub async fn update_message(&self, id: i64, content: &str) -> Result<Message, SocialPlatformError> {
        let message = sqlx::query_as::<_, Message>(
            "UPDATE messages SET content = $2 WHERE id = $1 RETURNING id, conversation_id, sender_id, content, is_read, sent_at"
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        message.ok_or(SocialPlatformError::MessageNotFound { message_id: id })
    }

    /// Delete message
    pub async fn delete_message(&self, id: i64) -> Result<(), SocialPlatformError> {
        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
