//! Data models module
//!
//! This module contains all data structures used throughout the crate

pub mod auth;
pub mod user;
pub mod follow;
pub mod group;
pub mod conversation;
pub mod post;
pub mod reaction;

// Re-export commonly used models
pub use auth::{AuthContext, Permission};
pub use user::{User, AccountRole, CreateUserRequest, UpdateUserRequest};
pub use follow::{FollowRequest, FollowStatus, FollowDecision};
pub use group::{Group, GroupMembership, MembershipRole, JoinDecision, CreateGroupRequest};
pub use conversation::{Conversation, ConversationParticipant, Message, ConversationView};
pub use post::{Post, Comment, CommentSentiment, PostWithComments};
pub use reaction::{Reaction, ReactionType, ReactionCount, ReactionSummary, SavedPost};
