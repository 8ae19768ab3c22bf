//! Group service implementation
//!
//! Group creation, the join/approve flow, leaving and kicking with the
//! last-owner cascade, and membership listings.

use std::collections::HashSet;
use tracing::{debug, info};
use crate::database::store::SocialStore;
use crate::models::{CreateGroupRequest, Group, GroupMembership, JoinDecision, MembershipRole};
use crate::policy::membership::{
    can_manage_members, grants_conversation_access, join_role, leave_outcome, pending_response, permissions,
    GroupPermissions, LeaveOutcome,
};
use crate::services::auth::{AuthContext, AuthService, Permission};
use crate::services::require_user;
use crate::utils::errors::{SocialPlatformError, Result};
use crate::utils::helpers::{optional_text, require_text};
use crate::utils::logging::log_group_event;

#[derive(Clone)]
pub struct GroupService<S: SocialStore> {
    store: S,
    auth: AuthService,
}

impl<S: SocialStore> GroupService<S> {
    pub fn new(store: S, auth: AuthService) -> Self {
        Self { store, auth }
    }

    async fn require_group(&self, group_id: i64) -> Result<Group> {
        self.store
            .find_group(group_id)
            .await?
            .ok_or(SocialPlatformError::GroupNotFound { group_id })
    }

    async fn owner_count(&self, group_id: i64) -> Result<usize> {
        Ok(self
            .store
            .group_memberships(group_id)
            .await?
            .iter()
            .filter(|m| m.role == MembershipRole::Owner)
            .count())
    }

    /// Remove a member, deleting the whole group when they were its sole Owner
    async fn depart(&self, membership: &GroupMembership) -> Result<LeaveOutcome> {
        let outcome = leave_outcome(membership.role, self.owner_count(membership.group_id).await?);
        match outcome {
            LeaveOutcome::DeleteGroup => {
                self.store.delete_group_cascade(membership.group_id).await?;
                log_group_event(membership.group_id, "group_deleted", Some(membership.user_id), Some("last owner departed"));
            }
            LeaveOutcome::RemoveMember => {
                self.store.remove_membership(membership.group_id, membership.user_id).await?;
            }
        }
        Ok(outcome)
    }

    /// Create a group owned by the actor
    pub async fn create_group(&self, actor: &AuthContext, request: CreateGroupRequest) -> Result<(Group, GroupMembership)> {
        actor.require(Permission::JoinGroups)?;
        let request = CreateGroupRequest {
            name: require_text(&request.name, "Group name")?,
            description: optional_text(request.description),
        };

        let (group, membership) = self.store.create_group(request, actor.user_id).await?;
        info!(group_id = group.id, owner_id = actor.user_id, name = %group.name, "Group created");
        Ok((group, membership))
    }

    /// Ask to join a group. Administrators become Owners straight away.
    pub async fn join(&self, actor: &AuthContext, group_id: i64) -> Result<GroupMembership> {
        actor.require(Permission::JoinGroups)?;
        self.require_group(group_id).await?;

        if let Some(existing) = self.store.find_membership(group_id, actor.user_id).await? {
            debug!(group_id = group_id, user_id = actor.user_id, role = %existing.role, "Already holds a role");
            return Ok(existing);
        }

        let role = join_role(actor.is_admin);
        let membership = self
            .store
            .insert_membership(group_id, actor.user_id, role, grants_conversation_access(role))
            .await?;

        log_group_event(group_id, "join", Some(actor.user_id), Some(role.as_str()));
        Ok(membership)
    }

    /// Accept or decline a pending join request.
    ///
    /// Returns the promoted membership, or `None` when the request was declined.
    pub async fn respond_to_join(
        &self,
        actor: &AuthContext,
        membership_id: i64,
        decision: &str,
    ) -> Result<Option<GroupMembership>> {
        actor.require(Permission::JoinGroups)?;
        let membership = self
            .store
            .find_membership_by_id(membership_id)
            .await?
            .ok_or(SocialPlatformError::MembershipNotFound { membership_id })?;

        let actor_role = self
            .store
            .find_membership(membership.group_id, actor.user_id)
            .await?
            .map(|m| m.role);
        if !can_manage_members(actor, actor_role) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only a group owner can answer join requests".to_string(),
            ));
        }

        let decision: JoinDecision = decision.parse()?;
        match pending_response(membership.role, decision)? {
            Some(role) => {
                let updated = self
                    .store
                    .set_membership_role(membership.id, role, grants_conversation_access(role))
                    .await?;
                log_group_event(membership.group_id, "join_accepted", Some(membership.user_id), None);
                Ok(Some(updated))
            }
            None => {
                self.store.remove_membership(membership.group_id, membership.user_id).await?;
                log_group_event(membership.group_id, "join_declined", Some(membership.user_id), None);
                Ok(None)
            }
        }
    }

    /// Leave a group
    pub async fn leave(&self, actor: &AuthContext, group_id: i64) -> Result<LeaveOutcome> {
        let membership = self
            .store
            .find_membership(group_id, actor.user_id)
            .await?
            .ok_or(SocialPlatformError::NotGroupMember { group_id, user_id: actor.user_id })?;

        let outcome = self.depart(&membership).await?;
        log_group_event(group_id, "leave", Some(actor.user_id), None);
        Ok(outcome)
    }

    /// Remove another user from a group
    pub async fn kick(&self, actor: &AuthContext, group_id: i64, target_id: i64) -> Result<LeaveOutcome> {
        actor.require(Permission::JoinGroups)?;
        self.require_group(group_id).await?;

        let actor_role = self.store.find_membership(group_id, actor.user_id).await?.map(|m| m.role);
        if !can_manage_members(actor, actor_role) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only a group owner or an administrator can remove members".to_string(),
            ));
        }
        if target_id == actor.user_id {
            return Err(SocialPlatformError::PermissionDenied(
                "Use leave to remove yourself from a group".to_string(),
            ));
        }

        let membership = self
            .store
            .find_membership(group_id, target_id)
            .await?
            .ok_or(SocialPlatformError::NotGroupMember { group_id, user_id: target_id })?;

        let outcome = self.depart(&membership).await?;
        log_group_event(group_id, "kick", Some(target_id), Some(&format!("by {}", actor.user_id)));
        Ok(outcome)
    }

    /// Add a user directly as a Member
    pub async fn add_member(&self, actor: &AuthContext, group_id: i64, user_id: i64) -> Result<GroupMembership> {
        actor.require(Permission::JoinGroups)?;
        self.require_group(group_id).await?;

        let actor_role = self.store.find_membership(group_id, actor.user_id).await?.map(|m| m.role);
        if actor_role != Some(MembershipRole::Owner) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only a group owner can add members".to_string(),
            ));
        }

        let target = require_user(&self.store, user_id).await?;
        if self.auth.is_admin(&target) {
            return Err(SocialPlatformError::PermissionDenied(
                "Administrators cannot be added as members".to_string(),
            ));
        }

        let membership = match self.store.find_membership(group_id, user_id).await? {
            Some(existing) if existing.role == MembershipRole::Pending => {
                self.store.set_membership_role(existing.id, MembershipRole::Member, true).await?
            }
            Some(existing) => {
                return Err(SocialPlatformError::InvalidInput(format!(
                    "User {} is already {} of group {}",
                    user_id, existing.role, group_id
                )))
            }
            None => {
                self.store
                    .insert_membership(group_id, user_id, MembershipRole::Member, true)
                    .await?
            }
        };

        log_group_event(group_id, "member_added", Some(user_id), Some(&format!("by {}", actor.user_id)));
        Ok(membership)
    }

    /// Groups the actor holds no role in
    pub async fn groups_not_joined(&self, actor: &AuthContext) -> Result<Vec<Group>> {
        let joined: HashSet<i64> = self
            .store
            .user_memberships(actor.user_id)
            .await?
            .into_iter()
            .map(|m| m.group_id)
            .collect();

        Ok(self
            .store
            .list_groups()
            .await?
            .into_iter()
            .filter(|g| !joined.contains(&g.id))
            .collect())
    }

    /// Pending join requests across the groups the actor owns
    pub async fn pending_join_requests(&self, actor: &AuthContext) -> Result<Vec<GroupMembership>> {
        let owned: Vec<i64> = self
            .store
            .user_memberships(actor.user_id)
            .await?
            .into_iter()
            .filter(|m| m.role == MembershipRole::Owner)
            .map(|m| m.group_id)
            .collect();

        let mut pending = Vec::new();
        for group_id in owned {
            pending.extend(
                self.store
                    .group_memberships(group_id)
                    .await?
                    .into_iter()
                    .filter(|m| m.role == MembershipRole::Pending),
            );
        }
        Ok(pending)
    }

    /// Every membership of a group, Pending included
    pub async fn members(&self, group_id: i64) -> Result<Vec<GroupMembership>> {
        self.require_group(group_id).await?;
        self.store.group_memberships(group_id).await
    }

    /// Role of the actor in a group and what it allows
    pub async fn permissions(&self, actor: &AuthContext, group_id: i64) -> Result<GroupPermissions> {
        self.require_group(group_id).await?;
        let role = self.store.find_membership(group_id, actor.user_id).await?.map(|m| m.role);
        Ok(permissions(role, actor.is_admin))
    }
}
