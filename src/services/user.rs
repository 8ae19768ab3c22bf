//! User service implementation
//!
//! This service handles registration, profile management, profile views and
//! account deletion.

use serde::{Deserialize, Serialize};
use tracing::{info, warn, debug};
use crate::database::store::SocialStore;
use crate::models::user::{User, CreateUserRequest, UpdateUserRequest};
use crate::policy::{resolve_visibility, ProfileVisibility};
use crate::services::auth::{AuthContext, AuthService};
use crate::services::require_user;
use crate::utils::errors::{SocialPlatformError, Result};
use crate::utils::helpers::{optional_text, require_text};
use crate::utils::logging::{log_admin_action, log_user_action};

/// A user as seen by a particular viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub user: User,
    pub visibility: ProfileVisibility,
}

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService<S: SocialStore> {
    store: S,
    auth: AuthService,
}

impl<S: SocialStore> UserService<S> {
    /// Create a new UserService instance
    pub fn new(store: S, auth: AuthService) -> Self {
        Self { store, auth }
    }

    /// Register a new user
    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        let username = require_text(&request.username, "Username")?;
        debug!(username = %username, "Registering user");

        if self.store.find_user_by_username(&username).await?.is_some() {
            warn!(username = %username, "Username already taken");
            return Err(SocialPlatformError::InvalidInput(format!("Username already taken: {}", username)));
        }

        let user = self
            .store
            .create_user(CreateUserRequest {
                username,
                first_name: optional_text(request.first_name),
                last_name: optional_text(request.last_name),
                is_public: request.is_public,
                role: request.role,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "New user registered successfully");
        Ok(user)
    }

    /// Get user by ID
    pub async fn get(&self, user_id: i64) -> Result<User> {
        require_user(&self.store, user_id).await
    }

    /// Build the request context for a stored user
    pub async fn context_for(&self, user_id: i64) -> Result<AuthContext> {
        let user = require_user(&self.store, user_id).await?;
        Ok(self.auth.context_for(&user))
    }

    /// Update names and the public flag. Blank names leave the stored value untouched.
    pub async fn update_profile(&self, actor: &AuthContext, user_id: i64, request: UpdateUserRequest) -> Result<User> {
        if !actor.is_self_or_admin(user_id) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the account owner can edit this profile".to_string(),
            ));
        }
        require_user(&self.store, user_id).await?;

        let update = UpdateUserRequest {
            first_name: optional_text(request.first_name),
            last_name: optional_text(request.last_name),
            is_public: request.is_public,
            profile_completed: None,
        };

        let user = self.store.update_user(user_id, update).await?;
        info!(user_id = user_id, actor_id = actor.user_id, is_public = user.is_public, "User profile updated successfully");
        Ok(user)
    }

    /// Fill in both names and mark the profile complete
    pub async fn complete_profile(
        &self,
        actor: &AuthContext,
        user_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<User> {
        if !actor.is_self_or_admin(user_id) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the account owner can complete this profile".to_string(),
            ));
        }
        require_user(&self.store, user_id).await?;

        let update = UpdateUserRequest {
            first_name: Some(require_text(first_name, "First name")?),
            last_name: Some(require_text(last_name, "Last name")?),
            is_public: None,
            profile_completed: Some(true),
        };

        let user = self.store.update_user(user_id, update).await?;
        log_user_action(user_id, "complete_profile", None);
        Ok(user)
    }

    /// Load a profile together with what the viewer may see of it
    pub async fn view_profile(&self, viewer: Option<&AuthContext>, target_id: i64) -> Result<ProfileView> {
        let user = require_user(&self.store, target_id).await?;
        let edges = self.store.follows_touching(target_id).await?;
        let visibility = resolve_visibility(viewer, &user, self.auth.is_admin(&user), &edges);

        debug!(
            target_id = target_id,
            viewer_id = viewer.map(|v| v.user_id),
            can_view = visibility.can_view_full_profile,
            "Profile resolved"
        );
        Ok(ProfileView { user, visibility })
    }

    /// Delete an account and everything that references it
    pub async fn delete_account(&self, actor: &AuthContext, user_id: i64) -> Result<()> {
        if !actor.is_self_or_admin(user_id) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the account owner or an administrator can delete this account".to_string(),
            ));
        }
        require_user(&self.store, user_id).await?;

        self.store.delete_user_cascade(user_id).await?;

        if actor.user_id == user_id {
            log_user_action(user_id, "delete_account", None);
        } else {
            log_admin_action(actor.user_id, "delete_account", Some(&user_id.to_string()), None);
        }
        Ok(())
    }
}
