//! Follow service implementation
//!
//! Applies the follow state machine: toggling, answering pending requests,
//! removing followers and listing the relationship in both directions.

use tracing::{debug, info};
use crate::database::store::SocialStore;
use crate::models::{FollowDecision, FollowRequest, FollowStatus};
use crate::policy::follow::{check_participants, respond_transition, toggle_transition, FollowAction};
use crate::services::auth::{AuthContext, AuthService, Permission};
use crate::services::require_user;
use crate::utils::errors::{SocialPlatformError, Result};
use crate::utils::logging::log_follow_transition;

#[derive(Clone)]
pub struct FollowService<S: SocialStore> {
    store: S,
    auth: AuthService,
}

impl<S: SocialStore> FollowService<S> {
    pub fn new(store: S, auth: AuthService) -> Self {
        Self { store, auth }
    }

    /// Follow, unfollow, cancel or re-request depending on the current edge.
    ///
    /// Returns the edge as it stands afterwards, or `None` when it was removed.
    pub async fn toggle_follow(&self, actor: &AuthContext, target_id: i64) -> Result<Option<FollowRequest>> {
        let target = require_user(&self.store, target_id).await?;
        check_participants(actor, target.id, self.auth.is_admin(&target))?;

        let existing = self.store.find_follow(actor.user_id, target.id).await?;
        let previous = existing.as_ref().map(|e| e.status);
        let action = toggle_transition(target.is_public, previous);
        debug!(actor_id = actor.user_id, target_id = target.id, action = ?action, "Follow toggle decided");

        let result = match (action, existing) {
            (FollowAction::Create(status), _) => {
                Some(self.store.create_follow(actor.user_id, target.id, status).await?)
            }
            (FollowAction::SetStatus(status), Some(edge)) => {
                Some(self.store.set_follow_status(edge.id, status).await?)
            }
            (FollowAction::Remove, Some(edge)) => {
                self.store.delete_follow(edge.id).await?;
                None
            }
            // The transition table only yields these for an existing edge
            (_, None) => {
                return Err(SocialPlatformError::FollowNotFound {
                    follower_id: actor.user_id,
                    following_id: target.id,
                })
            }
        };

        log_follow_transition(
            actor.user_id,
            target.id,
            previous.map(|s| s.as_str()),
            action.resulting_status().map(|s| s.as_str()),
        );
        Ok(result)
    }

    /// Accept or reject a pending request addressed to the actor
    pub async fn respond_to_request(&self, actor: &AuthContext, request_id: i64, decision: &str) -> Result<FollowRequest> {
        let request = self
            .store
            .find_follow_by_id(request_id)
            .await?
            .ok_or(SocialPlatformError::FollowRequestNotFound { request_id })?;

        if request.following_id != actor.user_id {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the receiving user can answer a follow request".to_string(),
            ));
        }
        actor.require(Permission::Follow)?;

        let decision: FollowDecision = decision.parse()?;
        let next = respond_transition(request.status, decision)?;

        let updated = self.store.set_follow_status(request.id, next).await?;
        log_follow_transition(
            request.follower_id,
            request.following_id,
            Some(request.status.as_str()),
            Some(next.as_str()),
        );
        Ok(updated)
    }

    /// Drop an accepted follower
    pub async fn remove_follower(&self, actor: &AuthContext, follower_id: i64) -> Result<()> {
        actor.require(Permission::Follow)?;

        let edge = self
            .store
            .find_follow(follower_id, actor.user_id)
            .await?
            .filter(FollowRequest::is_accepted)
            .ok_or(SocialPlatformError::FollowNotFound {
                follower_id,
                following_id: actor.user_id,
            })?;

        self.store.delete_follow(edge.id).await?;
        info!(user_id = actor.user_id, follower_id = follower_id, "Follower removed");
        log_follow_transition(follower_id, actor.user_id, Some(FollowStatus::Accepted.as_str()), None);
        Ok(())
    }

    /// Pending requests waiting for the actor's decision
    pub async fn pending_requests(&self, actor: &AuthContext) -> Result<Vec<FollowRequest>> {
        self.store.incoming_follows(actor.user_id, FollowStatus::Pending).await
    }

    /// Accepted edges pointing at the user
    pub async fn followers(&self, user_id: i64) -> Result<Vec<FollowRequest>> {
        require_user(&self.store, user_id).await?;
        self.store.incoming_follows(user_id, FollowStatus::Accepted).await
    }

    /// Accepted edges leaving the user
    pub async fn following(&self, user_id: i64) -> Result<Vec<FollowRequest>> {
        require_user(&self.store, user_id).await?;
        self.store.outgoing_follows(user_id, FollowStatus::Accepted).await
    }
}
