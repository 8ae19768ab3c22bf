//! Persistence interface
//!
//! Services talk to storage only through these traits. [`DatabaseService`]
//! implements them on PostgreSQL and [`MemoryStore`] keeps everything in
//! process. Cascading deletes are a single store call so each implementation
//! can run them atomically.
//!
//! [`DatabaseService`]: crate::database::DatabaseService
//! [`MemoryStore`]: crate::database::MemoryStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::*;
use crate::utils::errors::Result;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn update_user(&self, user_id: i64, request: UpdateUserRequest) -> Result<User>;

    /// Delete a user and everything that references them, in this order:
    /// groups the user solely owns, reactions, saves and comments by the user,
    /// reactions, saves and comments on the user's posts, the user's posts,
    /// messages sent by the user, conversation participations, memberships,
    /// follow requests in both directions, the user.
    async fn delete_user_cascade(&self, user_id: i64) -> Result<()>;
}

#[async_trait]
pub trait FollowStore: Send + Sync {
    async fn find_follow(&self, follower_id: i64, following_id: i64) -> Result<Option<FollowRequest>>;

    async fn find_follow_by_id(&self, request_id: i64) -> Result<Option<FollowRequest>>;

    async fn create_follow(&self, follower_id: i64, following_id: i64, status: FollowStatus) -> Result<FollowRequest>;

    async fn set_follow_status(&self, request_id: i64, status: FollowStatus) -> Result<FollowRequest>;

    async fn delete_follow(&self, request_id: i64) -> Result<()>;

    /// Edges where the user is either follower or following
    async fn follows_touching(&self, user_id: i64) -> Result<Vec<FollowRequest>>;

    /// Edges pointing at the user with the given status
    async fn incoming_follows(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>>;

    /// Edges leaving the user with the given status
    async fn outgoing_follows(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Create the group, its conversation, the Owner membership and the
    /// owner's participation as one unit
    async fn create_group(&self, request: CreateGroupRequest, owner_id: i64) -> Result<(Group, GroupMembership)>;

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    async fn list_groups(&self) -> Result<Vec<Group>>;

    async fn find_membership(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMembership>>;

    async fn find_membership_by_id(&self, membership_id: i64) -> Result<Option<GroupMembership>>;

    /// Insert a membership, adding the user to the group conversation when
    /// `conversation_access` is set
    async fn insert_membership(
        &self,
        group_id: i64,
        user_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership>;

    async fn set_membership_role(
        &self,
        membership_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership>;

    /// Remove the membership and the user's access to the group conversation
    async fn remove_membership(&self, group_id: i64, user_id: i64) -> Result<()>;

    /// Delete memberships, conversation participants, messages, the
    /// conversation and finally the group row
    async fn delete_group_cascade(&self, group_id: i64) -> Result<()>;

    async fn group_memberships(&self, group_id: i64) -> Result<Vec<GroupMembership>>;

    async fn user_memberships(&self, user_id: i64) -> Result<Vec<GroupMembership>>;
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn find_conversation(&self, conversation_id: i64) -> Result<Option<Conversation>>;

    async fn find_group_conversation(&self, group_id: i64) -> Result<Option<Conversation>>;

    /// Non-group conversation whose participants are exactly the two users
    async fn find_direct_conversation(&self, user_a: i64, user_b: i64) -> Result<Option<Conversation>>;

    async fn create_direct_conversation(&self, user_a: i64, user_b: i64) -> Result<Conversation>;

    async fn participants(&self, conversation_id: i64) -> Result<Vec<ConversationParticipant>>;

    async fn touch_participant(&self, conversation_id: i64, user_id: i64, at: DateTime<Utc>) -> Result<()>;

    async fn user_conversations(&self, user_id: i64) -> Result<Vec<Conversation>>;

    /// Messages of a conversation, oldest first
    async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>>;

    async fn set_read_flags(&self, changes: &[(i64, bool)]) -> Result<()>;

    async fn create_message(&self, conversation_id: i64, sender_id: i64, content: &str) -> Result<Message>;

    async fn find_message(&self, message_id: i64) -> Result<Option<Message>>;

    async fn update_message(&self, message_id: i64, content: &str) -> Result<Message>;

    async fn delete_message(&self, message_id: i64) -> Result<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, user_id: i64, description: &str) -> Result<Post>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// Posts written by any of the users, newest first
    async fn posts_by_users(&self, user_ids: &[i64]) -> Result<Vec<Post>>;

    /// Delete the post's reactions, saves and comments, then the post
    async fn delete_post_cascade(&self, post_id: i64) -> Result<()>;

    async fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        body: &str,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment>;

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>>;

    /// Replace the body, stamp `edited_at` and overwrite the sentiment fields
    async fn update_comment(
        &self,
        comment_id: i64,
        body: &str,
        edited_at: DateTime<Utc>,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment>;

    async fn delete_comment(&self, comment_id: i64) -> Result<()>;

    /// Comments on a post, oldest first
    async fn post_comments(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn find_reaction(&self, post_id: i64, user_id: i64) -> Result<Option<Reaction>>;

    /// Insert the user's reaction; a second reaction on the same post is invalid input
    async fn create_reaction(&self, post_id: i64, user_id: i64, reaction_type: ReactionType) -> Result<Reaction>;

    async fn set_reaction_type(&self, reaction_id: i64, reaction_type: ReactionType) -> Result<Reaction>;

    async fn delete_reaction(&self, reaction_id: i64) -> Result<()>;

    /// Number of reactions per type on a post; types nobody used are absent
    async fn reaction_counts(&self, post_id: i64) -> Result<Vec<(ReactionType, i64)>>;

    async fn find_saved_post(&self, user_id: i64, post_id: i64) -> Result<Option<SavedPost>>;

    async fn create_saved_post(&self, user_id: i64, post_id: i64) -> Result<SavedPost>;

    async fn delete_saved_post(&self, saved_id: i64) -> Result<()>;

    /// Posts the user saved, most recently saved first
    async fn saved_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>>;
}

/// Everything the services need from storage
pub trait SocialStore:
    UserStore + FollowStore + GroupStore + ConversationStore + PostStore + Clone + 'static
{
}

impl<T> SocialStore for T where
    T: UserStore + FollowStore + GroupStore + ConversationStore + PostStore + Clone + 'static
{
}
