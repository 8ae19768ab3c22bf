//! Services module
//!
//! This module contains the business logic services. Each one is generic over
//! the [`SocialStore`] it persists through and takes the caller's
//! [`AuthContext`] explicitly.

pub mod auth;
pub mod conversation;
pub mod follow;
pub mod group;
pub mod moderation;
pub mod post;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, AuthContext, Permission};
pub use conversation::ConversationService;
pub use follow::FollowService;
pub use group::GroupService;
pub use moderation::{ModerationService, ModerationResult, SentimentResult};
pub use post::PostService;
pub use user::{UserService, ProfileView};

use crate::config::settings::Settings;
use crate::database::store::{SocialStore, UserStore};
use crate::models::User;
use crate::utils::errors::{SocialPlatformError, Result};

/// Load a user or fail with `UserNotFound`
pub(crate) async fn require_user<S: UserStore + ?Sized>(store: &S, user_id: i64) -> Result<User> {
    store
        .find_user(user_id)
        .await?
        .ok_or(SocialPlatformError::UserNotFound { user_id })
}

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory<S: SocialStore> {
    pub auth_service: AuthService,
    pub user_service: UserService<S>,
    pub follow_service: FollowService<S>,
    pub group_service: GroupService<S>,
    pub conversation_service: ConversationService<S>,
    pub post_service: PostService<S>,
    pub moderation_service: ModerationService,
}

impl<S: SocialStore> ServiceFactory<S> {
    /// Create a new ServiceFactory with all services sharing one store
    pub fn new(store: S, settings: Settings) -> Result<Self> {
        let auth_service = AuthService::new(settings.clone());
        let moderation_service = ModerationService::new(&settings)?;

        Ok(Self {
            user_service: UserService::new(store.clone(), auth_service.clone()),
            follow_service: FollowService::new(store.clone(), auth_service.clone()),
            group_service: GroupService::new(store.clone(), auth_service.clone()),
            conversation_service: ConversationService::new(store.clone()),
            post_service: PostService::new(store, auth_service.clone(), moderation_service.clone()),
            auth_service,
            moderation_service,
        })
    }
}
