//! Error handling for SocialPlatform
//!
//! This module defines the main error type used throughout the crate and maps
//! every variant onto the HTTP-equivalent status a caller should surface.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for SocialPlatform
#[derive(Error, Debug)]
pub enum SocialPlatformError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: i64 },

    #[error("Follow request not found: {request_id}")]
    FollowRequestNotFound { request_id: i64 },

    #[error("User {follower_id} does not follow user {following_id}")]
    FollowNotFound { follower_id: i64, following_id: i64 },

    #[error("Group membership not found: {membership_id}")]
    MembershipNotFound { membership_id: i64 },

    #[error("User {user_id} is not a member of group {group_id}")]
    NotGroupMember { group_id: i64, user_id: i64 },

    #[error("Conversation not found: {conversation_id}")]
    ConversationNotFound { conversation_id: i64 },

    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: i64 },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: i64 },

    #[error("Comment not found: {comment_id}")]
    CommentNotFound { comment_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    #[error("Content rejected by moderation: {reason}")]
    ContentRejected { reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for SocialPlatform operations
pub type Result<T> = std::result::Result<T, SocialPlatformError>;

impl SocialPlatformError {
    /// HTTP status a request handler should answer with for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SocialPlatformError::UserNotFound { .. }
            | SocialPlatformError::GroupNotFound { .. }
            | SocialPlatformError::FollowRequestNotFound { .. }
            | SocialPlatformError::FollowNotFound { .. }
            | SocialPlatformError::MembershipNotFound { .. }
            | SocialPlatformError::NotGroupMember { .. }
            | SocialPlatformError::ConversationNotFound { .. }
            | SocialPlatformError::MessageNotFound { .. }
            | SocialPlatformError::PostNotFound { .. }
            | SocialPlatformError::CommentNotFound { .. } => StatusCode::NOT_FOUND,
            SocialPlatformError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            SocialPlatformError::InvalidInput(_)
            | SocialPlatformError::InvalidDecision(_)
            | SocialPlatformError::InvalidStateTransition { .. }
            | SocialPlatformError::ContentRejected { .. } => StatusCode::BAD_REQUEST,
            SocialPlatformError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SocialPlatformError::Database(_)
            | SocialPlatformError::Migration(_)
            | SocialPlatformError::Config(_)
            | SocialPlatformError::Http(_)
            | SocialPlatformError::Serialization(_)
            | SocialPlatformError::Io(_)
            | SocialPlatformError::UrlParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SocialPlatformError::Database(_) => false,
            SocialPlatformError::Migration(_) => false,
            SocialPlatformError::Config(_) => false,
            SocialPlatformError::Http(_) => true,
            SocialPlatformError::Io(_) => true,
            SocialPlatformError::ServiceUnavailable(_) => true,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SocialPlatformError::Database(_) => ErrorSeverity::Critical,
            SocialPlatformError::Migration(_) => ErrorSeverity::Critical,
            SocialPlatformError::Config(_) => ErrorSeverity::Critical,
            SocialPlatformError::PermissionDenied(_) => ErrorSeverity::Warning,
            SocialPlatformError::ContentRejected { .. } => ErrorSeverity::Warning,
            SocialPlatformError::InvalidInput(_)
            | SocialPlatformError::InvalidDecision(_)
            | SocialPlatformError::InvalidStateTransition { .. } => ErrorSeverity::Info,
            e if e.status_code() == StatusCode::NOT_FOUND => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SocialPlatformError::UserNotFound { user_id: 1 }.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            SocialPlatformError::PermissionDenied("nope".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            SocialPlatformError::InvalidDecision("maybe".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SocialPlatformError::Config("missing".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_severity() {
        assert_eq!(SocialPlatformError::GroupNotFound { group_id: 3 }.severity(), ErrorSeverity::Info);
        assert_eq!(
            SocialPlatformError::PermissionDenied("x".to_string()).severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(SocialPlatformError::Config("x".to_string()).severity().to_string(), "CRITICAL");
        assert!(SocialPlatformError::ServiceUnavailable("down".to_string()).is_recoverable());
        assert!(!SocialPlatformError::InvalidInput("bad".to_string()).is_recoverable());
    }
}
