//! In-process store
//!
//! Keeps every table in a `BTreeMap` behind one mutex, so each store call
//! (cascades included) is atomic with respect to the others. Ids come from a
//! single counter shared by all tables.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::database::store::{ConversationStore, FollowStore, GroupStore, PostStore, UserStore};
use crate::models::*;
use crate::utils::errors::{SocialPlatformError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    users: BTreeMap<i64, User>,
    follows: BTreeMap<i64, FollowRequest>,
    groups: BTreeMap<i64, Group>,
    memberships: BTreeMap<i64, GroupMembership>,
    conversations: BTreeMap<i64, Conversation>,
    participants: BTreeMap<i64, ConversationParticipant>,
    messages: BTreeMap<i64, Message>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    reactions: BTreeMap<i64, Reaction>,
    saved_posts: BTreeMap<i64, SavedPost>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn add_participant(&mut self, conversation_id: i64, user_id: i64) {
        let exists = self
            .participants
            .values()
            .any(|p| p.conversation_id == conversation_id && p.user_id == user_id);
        if exists {
            return;
        }

        let id = self.next_id();
        self.participants.insert(id, ConversationParticipant {
            id,
            conversation_id,
            user_id,
            last_entry: Utc::now(),
        });
    }

    fn group_conversation_id(&self, group_id: i64) -> Option<i64> {
        self.conversations
            .values()
            .find(|c| c.group_id == Some(group_id))
            .map(|c| c.id)
    }

    fn set_conversation_access(&mut self, group_id: i64, user_id: i64, access: bool) {
        if let Some(conversation_id) = self.group_conversation_id(group_id) {
            if access {
                self.add_participant(conversation_id, user_id);
            } else {
                self.participants
                    .retain(|_, p| !(p.conversation_id == conversation_id && p.user_id == user_id));
            }
        }
    }

    fn remove_group(&mut self, group_id: i64) {
        self.memberships.retain(|_, m| m.group_id != group_id);
        if let Some(conversation_id) = self.group_conversation_id(group_id) {
            self.participants.retain(|_, p| p.conversation_id != conversation_id);
            self.messages.retain(|_, m| m.conversation_id != conversation_id);
            self.conversations.remove(&conversation_id);
        }
        self.groups.remove(&group_id);
    }

    /// Drop everything hanging off the given posts
    fn remove_post_rows(&mut self, post_ids: &BTreeSet<i64>) {
        self.reactions.retain(|_, r| !post_ids.contains(&r.post_id));
        self.saved_posts.retain(|_, s| !post_ids.contains(&s.post_id));
        self.comments.retain(|_, c| !post_ids.contains(&c.post_id));
    }

    fn conversation_members(&self, conversation_id: i64) -> BTreeSet<i64> {
        self.participants
            .values()
            .filter(|p| p.conversation_id == conversation_id)
            .map(|p| p.user_id)
            .collect()
    }
}

/// Store keeping all rows in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of follow requests in which the user appears on either side
    pub fn follow_rows_for(&self, user_id: i64) -> usize {
        self.state()
            .follows
            .values()
            .filter(|f| f.follower_id == user_id || f.following_id == user_id)
            .count()
    }

    /// Rows in any table that still reference the user
    pub fn rows_referencing_user(&self, user_id: i64) -> usize {
        let state = self.state();
        state.follows.values().filter(|f| f.follower_id == user_id || f.following_id == user_id).count()
            + state.memberships.values().filter(|m| m.user_id == user_id).count()
            + state.participants.values().filter(|p| p.user_id == user_id).count()
            + state.messages.values().filter(|m| m.sender_id == user_id).count()
            + state.posts.values().filter(|p| p.user_id == user_id).count()
            + state.comments.values().filter(|c| c.user_id == user_id).count()
            + state.reactions.values().filter(|r| r.user_id == user_id).count()
            + state.saved_posts.values().filter(|s| s.user_id == user_id).count()
    }

    /// Comments, reactions and saves whose post no longer exists
    pub fn orphaned_post_rows(&self) -> usize {
        let state = self.state();
        let orphaned = |post_id: &i64| !state.posts.contains_key(post_id);
        state.comments.values().filter(|c| orphaned(&c.post_id)).count()
            + state.reactions.values().filter(|r| orphaned(&r.post_id)).count()
            + state.saved_posts.values().filter(|s| orphaned(&s.post_id)).count()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        let mut state = self.state();
        if state.users.values().any(|u| u.username == request.username) {
            return Err(SocialPlatformError::InvalidInput(format!(
                "Username already taken: {}",
                request.username
            )));
        }

        let id = state.next_id();
        let now = Utc::now();
        let user = User {
            id,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            is_public: request.is_public.unwrap_or(true),
            profile_completed: false,
            role: request.role.unwrap_or(AccountRole::RegisteredUser),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.state().users.values().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, user_id: i64, request: UpdateUserRequest) -> Result<User> {
        let mut state = self.state();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or(SocialPlatformError::UserNotFound { user_id })?;

        if let Some(first_name) = request.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = request.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(is_public) = request.is_public {
            user.is_public = is_public;
        }
        if let Some(profile_completed) = request.profile_completed {
            user.profile_completed = profile_completed;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user_cascade(&self, user_id: i64) -> Result<()> {
        let mut state = self.state();
        if !state.users.contains_key(&user_id) {
            return Err(SocialPlatformError::UserNotFound { user_id });
        }

        let owned: Vec<i64> = state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id && m.role == MembershipRole::Owner)
            .map(|m| m.group_id)
            .collect();
        for group_id in owned {
            let owners = state
                .memberships
                .values()
                .filter(|m| m.group_id == group_id && m.role == MembershipRole::Owner)
                .count();
            if owners <= 1 {
                debug!(user_id = user_id, group_id = group_id, "Deleting solely owned group");
                state.remove_group(group_id);
            }
        }

        let post_ids: BTreeSet<i64> = state
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();

        state.reactions.retain(|_, r| r.user_id != user_id);
        state.saved_posts.retain(|_, s| s.user_id != user_id);
        state.comments.retain(|_, c| c.user_id != user_id);
        state.remove_post_rows(&post_ids);
        state.posts.retain(|_, p| p.user_id != user_id);
        state.messages.retain(|_, m| m.sender_id != user_id);
        state.participants.retain(|_, p| p.user_id != user_id);
        state.memberships.retain(|_, m| m.user_id != user_id);
        state.follows.retain(|_, f| f.follower_id != user_id && f.following_id != user_id);
        state.users.remove(&user_id);

        Ok(())
    }
}

#[async_trait]
impl FollowStore for MemoryStore {
    async fn find_follow(&self, follower_id: i64, following_id: i64) -> Result<Option<FollowRequest>> {
        Ok(self
            .state()
            .follows
            .values()
            .find(|f| f.connects(follower_id, following_id))
            .cloned())
    }

    async fn find_follow_by_id(&self, request_id: i64) -> Result<Option<FollowRequest>> {
        Ok(self.state().follows.get(&request_id).cloned())
    }

    async fn create_follow(&self, follower_id: i64, following_id: i64, status: FollowStatus) -> Result<FollowRequest> {
        let mut state = self.state();
        if state.follows.values().any(|f| f.connects(follower_id, following_id)) {
            return Err(SocialPlatformError::InvalidInput(format!(
                "Follow request {} -> {} already exists",
                follower_id, following_id
            )));
        }

        let id = state.next_id();
        let now = Utc::now();
        let request = FollowRequest {
            id,
            follower_id,
            following_id,
            status,
            created_at: now,
            updated_at: now,
        };
        state.follows.insert(id, request.clone());
        Ok(request)
    }

    async fn set_follow_status(&self, request_id: i64, status: FollowStatus) -> Result<FollowRequest> {
        let mut state = self.state();
        let request = state
            .follows
            .get_mut(&request_id)
            .ok_or(SocialPlatformError::FollowRequestNotFound { request_id })?;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }

    async fn delete_follow(&self, request_id: i64) -> Result<()> {
        self.state().follows.remove(&request_id);
        Ok(())
    }

    async fn follows_touching(&self, user_id: i64) -> Result<Vec<FollowRequest>> {
        Ok(self
            .state()
            .follows
            .values()
            .filter(|f| f.follower_id == user_id || f.following_id == user_id)
            .cloned()
            .collect())
    }

    async fn incoming_follows(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>> {
        Ok(self
            .state()
            .follows
            .values()
            .filter(|f| f.following_id == user_id && f.status == status)
            .cloned()
            .collect())
    }

    async fn outgoing_follows(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>> {
        Ok(self
            .state()
            .follows
            .values()
            .filter(|f| f.follower_id == user_id && f.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn create_group(&self, request: CreateGroupRequest, owner_id: i64) -> Result<(Group, GroupMembership)> {
        let mut state = self.state();
        let now = Utc::now();

        let group_id = state.next_id();
        let group = Group {
            id: group_id,
            name: request.name,
            description: request.description,
            created_at: now,
        };
        state.groups.insert(group_id, group.clone());

        let conversation_id = state.next_id();
        state.conversations.insert(conversation_id, Conversation {
            id: conversation_id,
            group_id: Some(group_id),
            created_at: now,
        });

        let membership_id = state.next_id();
        let membership = GroupMembership {
            id: membership_id,
            group_id,
            user_id: owner_id,
            role: MembershipRole::Owner,
            joined_at: now,
        };
        state.memberships.insert(membership_id, membership.clone());
        state.add_participant(conversation_id, owner_id);

        Ok((group, membership))
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.state().groups.get(&group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.state().groups.values().cloned().collect())
    }

    async fn find_membership(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMembership>> {
        Ok(self
            .state()
            .memberships
            .values()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_membership_by_id(&self, membership_id: i64) -> Result<Option<GroupMembership>> {
        Ok(self.state().memberships.get(&membership_id).cloned())
    }

    async fn insert_membership(
        &self,
        group_id: i64,
        user_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership> {
        let mut state = self.state();
        if state.memberships.values().any(|m| m.group_id == group_id && m.user_id == user_id) {
            return Err(SocialPlatformError::InvalidInput(format!(
                "User {} already has a role in group {}",
                user_id, group_id
            )));
        }

        let id = state.next_id();
        let membership = GroupMembership {
            id,
            group_id,
            user_id,
            role,
            joined_at: Utc::now(),
        };
        state.memberships.insert(id, membership.clone());
        state.set_conversation_access(group_id, user_id, conversation_access);
        Ok(membership)
    }

    async fn set_membership_role(
        &self,
        membership_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership> {
        let mut state = self.state();
        let membership = state
            .memberships
            .get_mut(&membership_id)
            .ok_or(SocialPlatformError::MembershipNotFound { membership_id })?;
        membership.role = role;
        let membership = membership.clone();

        state.set_conversation_access(membership.group_id, membership.user_id, conversation_access);
        Ok(membership)
    }

    async fn remove_membership(&self, group_id: i64, user_id: i64) -> Result<()> {
        let mut state = self.state();
        state.memberships.retain(|_, m| !(m.group_id == group_id && m.user_id == user_id));
        state.set_conversation_access(group_id, user_id, false);
        Ok(())
    }

    async fn delete_group_cascade(&self, group_id: i64) -> Result<()> {
        self.state().remove_group(group_id);
        Ok(())
    }

    async fn group_memberships(&self, group_id: i64) -> Result<Vec<GroupMembership>> {
        Ok(self
            .state()
            .memberships
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn user_memberships(&self, user_id: i64) -> Result<Vec<GroupMembership>> {
        Ok(self
            .state()
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find_conversation(&self, conversation_id: i64) -> Result<Option<Conversation>> {
        Ok(self.state().conversations.get(&conversation_id).cloned())
    }

    async fn find_group_conversation(&self, group_id: i64) -> Result<Option<Conversation>> {
        Ok(self
            .state()
            .conversations
            .values()
            .find(|c| c.group_id == Some(group_id))
            .cloned())
    }

    async fn find_direct_conversation(&self, user_a: i64, user_b: i64) -> Result<Option<Conversation>> {
        let state = self.state();
        let wanted: BTreeSet<i64> = [user_a, user_b].into_iter().collect();
        Ok(state
            .conversations
            .values()
            .filter(|c| c.is_direct())
            .find(|c| state.conversation_members(c.id) == wanted)
            .cloned())
    }

    async fn create_direct_conversation(&self, user_a: i64, user_b: i64) -> Result<Conversation> {
        let mut state = self.state();
        let id = state.next_id();
        let conversation = Conversation {
            id,
            group_id: None,
            created_at: Utc::now(),
        };
        state.conversations.insert(id, conversation.clone());
        state.add_participant(id, user_a);
        state.add_participant(id, user_b);
        Ok(conversation)
    }

    async fn participants(&self, conversation_id: i64) -> Result<Vec<ConversationParticipant>> {
        Ok(self
            .state()
            .participants
            .values()
            .filter(|p| p.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn touch_participant(&self, conversation_id: i64, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state();
        if let Some(participant) = state
            .participants
            .values_mut()
            .find(|p| p.conversation_id == conversation_id && p.user_id == user_id)
        {
            participant.last_entry = at;
        }
        Ok(())
    }

    async fn user_conversations(&self, user_id: i64) -> Result<Vec<Conversation>> {
        let state = self.state();
        let ids: BTreeSet<i64> = state
            .participants
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.conversation_id)
            .collect();
        Ok(ids.iter().filter_map(|id| state.conversations.get(id).cloned()).collect())
    }

    async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .state()
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.sent_at, m.id));
        Ok(messages)
    }

    async fn set_read_flags(&self, changes: &[(i64, bool)]) -> Result<()> {
        let mut state = self.state();
        for (message_id, is_read) in changes {
            if let Some(message) = state.messages.get_mut(message_id) {
                message.is_read = *is_read;
            }
        }
        Ok(())
    }

    async fn create_message(&self, conversation_id: i64, sender_id: i64, content: &str) -> Result<Message> {
        let mut state = self.state();
        let id = state.next_id();
        let message = Message {
            id,
            conversation_id,
            sender_id,
            content: content.to_string(),
            is_read: false,
            sent_at: Utc::now(),
        };
        state.messages.insert(id, message.clone());
        Ok(message)
    }

    async fn find_message(&self, message_id: i64) -> Result<Option<Message>> {
        Ok(self.state().messages.get(&message_id).cloned())
    }

    async fn update_message(&self, message_id: i64, content: &str) -> Result<Message> {
        let mut state = self.state();
        let message = state
            .messages
            .get_mut(&message_id)
            .ok_or(SocialPlatformError::MessageNotFound { message_id })?;
        message.content = content.to_string();
        Ok(message.clone())
    }

    async fn delete_message(&self, message_id: i64) -> Result<()> {
        self.state().messages.remove(&message_id);
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, user_id: i64, description: &str) -> Result<Post> {
        let mut state = self.state();
        let id = state.next_id();
        let post = Post {
            id,
            user_id,
            description: description.to_string(),
            created_at: Utc::now(),
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        Ok(self.state().posts.get(&post_id).cloned())
    }

    async fn posts_by_users(&self, user_ids: &[i64]) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .state()
            .posts
            .values()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn delete_post_cascade(&self, post_id: i64) -> Result<()> {
        let mut state = self.state();
        state.remove_post_rows(&BTreeSet::from([post_id]));
        state.posts.remove(&post_id);
        Ok(())
    }

    async fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        body: &str,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment> {
        let mut state = self.state();
        let id = state.next_id();
        let comment = Comment {
            id,
            post_id,
            user_id,
            body: body.to_string(),
            created_at: Utc::now(),
            edited_at: None,
            sentiment_label: sentiment.as_ref().map(|s| s.label.clone()),
            sentiment_confidence: sentiment.as_ref().map(|s| s.confidence),
            sentiment_analyzed_at: sentiment.as_ref().map(|s| s.analyzed_at),
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        Ok(self.state().comments.get(&comment_id).cloned())
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        body: &str,
        edited_at: DateTime<Utc>,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment> {
        let mut state = self.state();
        let comment = state
            .comments
            .get_mut(&comment_id)
            .ok_or(SocialPlatformError::CommentNotFound { comment_id })?;
        comment.body = body.to_string();
        comment.edited_at = Some(edited_at);
        comment.sentiment_label = sentiment.as_ref().map(|s| s.label.clone());
        comment.sentiment_confidence = sentiment.as_ref().map(|s| s.confidence);
        comment.sentiment_analyzed_at = sentiment.as_ref().map(|s| s.analyzed_at);
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        self.state().comments.remove(&comment_id);
        Ok(())
    }

    async fn post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(self
            .state()
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn find_reaction(&self, post_id: i64, user_id: i64) -> Result<Option<Reaction>> {
        Ok(self
            .state()
            .reactions
            .values()
            .find(|r| r.post_id == post_id && r.user_id == user_id)
            .cloned())
    }

    async fn create_reaction(&self, post_id: i64, user_id: i64, reaction_type: ReactionType) -> Result<Reaction> {
        let mut state = self.state();
        if state.reactions.values().any(|r| r.post_id == post_id && r.user_id == user_id) {
            return Err(SocialPlatformError::InvalidInput(format!(
                "User {} already reacted to post {}",
                user_id, post_id
            )));
        }

        let id = state.next_id();
        let reaction = Reaction {
            id,
            post_id,
            user_id,
            reaction_type,
            created_at: Utc::now(),
        };
        state.reactions.insert(id, reaction.clone());
        Ok(reaction)
    }

    async fn set_reaction_type(&self, reaction_id: i64, reaction_type: ReactionType) -> Result<Reaction> {
        let mut state = self.state();
        let reaction = state
            .reactions
            .get_mut(&reaction_id)
            .ok_or_else(|| SocialPlatformError::InvalidInput(format!("Reaction {} no longer exists", reaction_id)))?;
        reaction.reaction_type = reaction_type;
        Ok(reaction.clone())
    }

    async fn delete_reaction(&self, reaction_id: i64) -> Result<()> {
        self.state().reactions.remove(&reaction_id);
        Ok(())
    }

    async fn reaction_counts(&self, post_id: i64) -> Result<Vec<(ReactionType, i64)>> {
        let mut counts: BTreeMap<ReactionType, i64> = BTreeMap::new();
        for reaction in self.state().reactions.values().filter(|r| r.post_id == post_id) {
            *counts.entry(reaction.reaction_type).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn find_saved_post(&self, user_id: i64, post_id: i64) -> Result<Option<SavedPost>> {
        Ok(self
            .state()
            .saved_posts
            .values()
            .find(|s| s.user_id == user_id && s.post_id == post_id)
            .cloned())
    }

    async fn create_saved_post(&self, user_id: i64, post_id: i64) -> Result<SavedPost> {
        let mut state = self.state();
        if state.saved_posts.values().any(|s| s.user_id == user_id && s.post_id == post_id) {
            return Err(SocialPlatformError::InvalidInput(format!(
                "User {} already saved post {}",
                user_id, post_id
            )));
        }

        let id = state.next_id();
        let saved = SavedPost {
            id,
            user_id,
            post_id,
            saved_at: Utc::now(),
        };
        state.saved_posts.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete_saved_post(&self, saved_id: i64) -> Result<()> {
        self.state().saved_posts.remove(&saved_id);
        Ok(())
    }

    async fn saved_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let state = self.state();
        let mut saved: Vec<&SavedPost> = state.saved_posts.values().filter(|s| s.user_id == user_id).collect();
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(b.id.cmp(&a.id)));
        Ok(saved
            .into_iter()
            .filter_map(|s| state.posts.get(&s.post_id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, username: &str) -> User {
        store
            .create_user(CreateUserRequest {
                username: username.to_string(),
                first_name: None,
                last_name: None,
                is_public: None,
                role: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_username_is_unique() {
        let store = MemoryStore::new();
        user(&store, "ana").await;
        let err = store
            .create_user(CreateUserRequest {
                username: "ana".to_string(),
                first_name: None,
                last_name: None,
                is_public: None,
                role: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SocialPlatformError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_follow_pair_is_unique() {
        let store = MemoryStore::new();
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;

        store.create_follow(a.id, b.id, FollowStatus::Pending).await.unwrap();
        assert!(store.create_follow(a.id, b.id, FollowStatus::Accepted).await.is_err());
        assert!(store.create_follow(b.id, a.id, FollowStatus::Accepted).await.is_ok());
    }

    #[tokio::test]
    async fn test_group_creation_grants_owner_access() {
        let store = MemoryStore::new();
        let owner = user(&store, "owner").await;
        let (group, membership) = store
            .create_group(CreateGroupRequest { name: "Chess".to_string(), description: None }, owner.id)
            .await
            .unwrap();

        assert_eq!(membership.role, MembershipRole::Owner);
        let conversation = store.find_group_conversation(group.id).await.unwrap().unwrap();
        let participants = store.participants(conversation.id).await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].user_id, owner.id);
    }

    #[tokio::test]
    async fn test_direct_conversation_matches_exact_pair() {
        let store = MemoryStore::new();
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let c = user(&store, "c").await;

        let conversation = store.create_direct_conversation(a.id, b.id).await.unwrap();
        let found = store.find_direct_conversation(b.id, a.id).await.unwrap().unwrap();
        assert_eq!(found.id, conversation.id);
        assert!(store.find_direct_conversation(a.id, c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reaction_pair_is_unique_and_counted_by_type() {
        let store = MemoryStore::new();
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let post = store.create_post(a.id, "hello").await.unwrap();

        store.create_reaction(post.id, a.id, ReactionType::Angry).await.unwrap();
        store.create_reaction(post.id, b.id, ReactionType::Like).await.unwrap();
        let duplicate = store.create_reaction(post.id, b.id, ReactionType::Love).await;
        assert!(matches!(duplicate, Err(SocialPlatformError::InvalidInput(_))));

        let counts = store.reaction_counts(post.id).await.unwrap();
        assert_eq!(counts, vec![(ReactionType::Like, 1), (ReactionType::Angry, 1)]);
    }
}
