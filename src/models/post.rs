//! Post and comment models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub sentiment_label: Option<String>,
    pub sentiment_confidence: Option<f64>,
    pub sentiment_analyzed_at: Option<DateTime<Utc>>,
}

/// Sentiment fields written alongside a comment body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSentiment {
    pub label: String,
    pub confidence: f64,
    pub analyzed_at: DateTime<Utc>,
}

/// Post together with its comments, oldest comment first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithComments {
    pub post: Post,
    pub comments: Vec<Comment>,
}
