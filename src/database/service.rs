//! Database service layer
//!
//! Bundles the PostgreSQL repositories and exposes them through the store traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::store::{ConversationStore, FollowStore, GroupStore, PostStore, UserStore};
use crate::database::{
    ConversationRepository, DatabasePool, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub follows: FollowRepository,
    pub groups: GroupRepository,
    pub conversations: ConversationRepository,
    pub posts: PostRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            follows: FollowRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            conversations: ConversationRepository::new(pool.clone()),
            posts: PostRepository::new(pool),
        }
    }
}

#[async_trait]
impl UserStore for DatabaseService {
    async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        self.users.create(request).await
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn update_user(&self, user_id: i64, request: UpdateUserRequest) -> Result<User> {
        self.users.update(user_id, request).await
    }

    async fn delete_user_cascade(&self, user_id: i64) -> Result<()> {
        self.users.delete_cascade(user_id).await
    }
}

#[async_trait]
impl FollowStore for DatabaseService {
    async fn find_follow(&self, follower_id: i64, following_id: i64) -> Result<Option<FollowRequest>> {
        self.follows.find_by_pair(follower_id, following_id).await
    }

    async fn find_follow_by_id(&self, request_id: i64) -> Result<Option<FollowRequest>> {
        self.follows.find_by_id(request_id).await
    }

    async fn create_follow(&self, follower_id: i64, following_id: i64, status: FollowStatus) -> Result<FollowRequest> {
        self.follows.create(follower_id, following_id, status).await
    }

    async fn set_follow_status(&self, request_id: i64, status: FollowStatus) -> Result<FollowRequest> {
        self.follows.set_status(request_id, status).await
    }

    async fn delete_follow(&self, request_id: i64) -> Result<()> {
        self.follows.delete(request_id).await
    }

    async fn follows_touching(&self, user_id: i64) -> Result<Vec<FollowRequest>> {
        self.follows.touching(user_id).await
    }

    async fn incoming_follows(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>> {
        self.follows.incoming(user_id, status).await
    }

    async fn outgoing_follows(&self, user_id: i64, status: FollowStatus) -> Result<Vec<FollowRequest>> {
        self.follows.outgoing(user_id, status).await
    }
}

#[async_trait]
impl GroupStore for DatabaseService {
    async fn create_group(&self, request: CreateGroupRequest, owner_id: i64) -> Result<(Group, GroupMembership)> {
        self.groups.create(request, owner_id).await
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        self.groups.find_by_id(group_id).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.groups.list().await
    }

    async fn find_membership(&self, group_id: i64, user_id: i64) -> Result<Option<GroupMembership>> {
        self.groups.find_membership(group_id, user_id).await
    }

    async fn find_membership_by_id(&self, membership_id: i64) -> Result<Option<GroupMembership>> {
        self.groups.find_membership_by_id(membership_id).await
    }

    async fn insert_membership(
        &self,
        group_id: i64,
        user_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership> {
        self.groups.add_member(group_id, user_id, role, conversation_access).await
    }

    async fn set_membership_role(
        &self,
        membership_id: i64,
        role: MembershipRole,
        conversation_access: bool,
    ) -> Result<GroupMembership> {
        self.groups.set_role(membership_id, role, conversation_access).await
    }

    async fn remove_membership(&self, group_id: i64, user_id: i64) -> Result<()> {
        self.groups.remove_member(group_id, user_id).await
    }

    async fn delete_group_cascade(&self, group_id: i64) -> Result<()> {
        self.groups.delete_cascade(group_id).await
    }

    async fn group_memberships(&self, group_id: i64) -> Result<Vec<GroupMembership>> {
        self.groups.get_members(group_id).await
    }

    async fn user_memberships(&self, user_id: i64) -> Result<Vec<GroupMembership>> {
        self.groups.get_user_memberships(user_id).await
    }
}

#[async_trait]
impl ConversationStore for DatabaseService {
    async fn find_conversation(&self, conversation_id: i64) -> Result<Option<Conversation>> {
        self.conversations.find_by_id(conversation_id).await
    }

    async fn find_group_conversation(&self, group_id: i64) -> Result<Option<Conversation>> {
        self.conversations.find_by_group(group_id).await
    }

    async fn find_direct_conversation(&self, user_a: i64, user_b: i64) -> Result<Option<Conversation>> {
        self.conversations.find_direct(user_a, user_b).await
    }

    async fn create_direct_conversation(&self, user_a: i64, user_b: i64) -> Result<Conversation> {
        self.conversations.create_direct(user_a, user_b).await
    }

    async fn participants(&self, conversation_id: i64) -> Result<Vec<ConversationParticipant>> {
        self.conversations.get_participants(conversation_id).await
    }

    async fn touch_participant(&self, conversation_id: i64, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        self.conversations.touch_participant(conversation_id, user_id, at).await
    }

    async fn user_conversations(&self, user_id: i64) -> Result<Vec<Conversation>> {
        self.conversations.get_user_conversations(user_id).await
    }

    async fn messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        self.conversations.get_messages(conversation_id).await
    }

    async fn set_read_flags(&self, changes: &[(i64, bool)]) -> Result<()> {
        self.conversations.set_read_flags(changes).await
    }

    async fn create_message(&self, conversation_id: i64, sender_id: i64, content: &str) -> Result<Message> {
        self.conversations.create_message(conversation_id, sender_id, content).await
    }

    async fn find_message(&self, message_id: i64) -> Result<Option<Message>> {
        self.conversations.find_message(message_id).await
    }

    async fn update_message(&self, message_id: i64, content: &str) -> Result<Message> {
        self.conversations.update_message(message_id, content).await
    }

    async fn delete_message(&self, message_id: i64) -> Result<()> {
        self.conversations.delete_message(message_id).await
    }
}

#[async_trait]
impl PostStore for DatabaseService {
    async fn create_post(&self, user_id: i64, description: &str) -> Result<Post> {
        self.posts.create(user_id, description).await
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        self.posts.find_by_id(post_id).await
    }

    async fn posts_by_users(&self, user_ids: &[i64]) -> Result<Vec<Post>> {
        self.posts.get_by_authors(user_ids).await
    }

    async fn delete_post_cascade(&self, post_id: i64) -> Result<()> {
        self.posts.delete_cascade(post_id).await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        user_id: i64,
        body: &str,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment> {
        self.posts.create_comment(post_id, user_id, body, sentiment).await
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        self.posts.find_comment(comment_id).await
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        body: &str,
        edited_at: DateTime<Utc>,
        sentiment: Option<CommentSentiment>,
    ) -> Result<Comment> {
        self.posts.update_comment(comment_id, body, edited_at, sentiment).await
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        self.posts.delete_comment(comment_id).await
    }

    async fn post_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.posts.get_comments(post_id).await
    }

    async fn find_reaction(&self, post_id: i64, user_id: i64) -> Result<Option<Reaction>> {
        self.posts.find_reaction(post_id, user_id).await
    }

    async fn create_reaction(&self, post_id: i64, user_id: i64, reaction_type: ReactionType) -> Result<Reaction> {
        self.posts.create_reaction(post_id, user_id, reaction_type).await
    }

    async fn set_reaction_type(&self, reaction_id: i64, reaction_type: ReactionType) -> Result<Reaction> {
        self.posts.set_reaction_type(reaction_id, reaction_type).await
    }

    async fn delete_reaction(&self, reaction_id: i64) -> Result<()> {
        self.posts.delete_reaction(reaction_id).await
    }

    async fn reaction_counts(&self, post_id: i64) -> Result<Vec<(ReactionType, i64)>> {
        self.posts.reaction_counts(post_id).await
    }

    async fn find_saved_post(&self, user_id: i64, post_id: i64) -> Result<Option<SavedPost>> {
        self.posts.find_saved(user_id, post_id).await
    }

    async fn create_saved_post(&self, user_id: i64, post_id: i64) -> Result<SavedPost> {
        self.posts.create_saved(user_id, post_id).await
    }

    async fn delete_saved_post(&self, saved_id: i64) -> Result<()> {
        self.posts.delete_saved(saved_id).await
    }

    async fn saved_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        self.posts.get_saved_by_user(user_id).await
    }
}
