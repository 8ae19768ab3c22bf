//! Database repositories module
//!
//! This module contains all PostgreSQL repository implementations for data access

pub mod user;
pub mod follow;
pub mod group;
pub mod conversation;
pub mod post;

// Re-export repositories
pub use user::UserRepository;
pub use follow::FollowRepository;
pub use group::GroupRepository;
pub use conversation::ConversationRepository;
pub use post::PostRepository;

use crate::utils::errors::SocialPlatformError;

/// Report a unique-constraint violation as invalid input; other errors pass through
pub(crate) fn unique_violation_as_invalid(err: sqlx::Error, message: impl FnOnce() -> String) -> SocialPlatformError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => SocialPlatformError::InvalidInput(message()),
        other => SocialPlatformError::Database(other),
    }
}
