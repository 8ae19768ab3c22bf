//! Post service implementation
//!
//! Moderated posts and comments, the follow-based feed and profile post
//! listings gated by profile visibility.

use chrono::Utc;
use tracing::{debug, info};
use crate::database::store::SocialStore;
use crate::models::{Comment, FollowStatus, Post, PostWithComments, ReactionSummary, ReactionType};
use crate::policy::{react_transition, resolve_visibility, tally, ReactionAction};
use crate::services::auth::{AuthContext, AuthService, Permission};
use crate::services::moderation::ModerationService;
use crate::services::require_user;
use crate::utils::errors::{SocialPlatformError, Result};
use crate::utils::helpers::require_text;
use crate::utils::logging::{log_admin_action, log_moderation_result};

#[derive(Clone)]
pub struct PostService<S: SocialStore> {
    store: S,
    auth: AuthService,
    moderation: ModerationService,
}

impl<S: SocialStore> PostService<S> {
    pub fn new(store: S, auth: AuthService, moderation: ModerationService) -> Self {
        Self { store, auth, moderation }
    }

    async fn require_post(&self, post_id: i64) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or(SocialPlatformError::PostNotFound { post_id })
    }

    async fn require_comment(&self, comment_id: i64) -> Result<Comment> {
        self.store
            .find_comment(comment_id)
            .await?
            .ok_or(SocialPlatformError::CommentNotFound { comment_id })
    }

    /// Refuse with 403 unless the viewer may see the author's full profile
    async fn require_visible(&self, viewer: Option<&AuthContext>, author_id: i64) -> Result<()> {
        let author = require_user(&self.store, author_id).await?;
        let edges = self.store.follows_touching(author_id).await?;
        let visibility = resolve_visibility(viewer, &author, self.auth.is_admin(&author), &edges);

        if !visibility.can_view_full_profile {
            return Err(SocialPlatformError::PermissionDenied(format!(
                "Profile of user {} is private",
                author_id
            )));
        }
        Ok(())
    }

    /// Run moderation and turn a rejection into `ContentRejected`
    async fn moderate(&self, actor: &AuthContext, text: &str) -> Result<()> {
        let verdict = self.moderation.moderate_content(text).await;
        log_moderation_result(actor.user_id, verdict.is_appropriate, verdict.reason.as_deref(), verdict.success);

        if !verdict.is_appropriate {
            return Err(SocialPlatformError::ContentRejected {
                reason: verdict.reason.unwrap_or_else(|| "inappropriate content".to_string()),
            });
        }
        Ok(())
    }

    pub async fn create_post(&self, actor: &AuthContext, description: &str) -> Result<Post> {
        actor.require(Permission::Publish)?;
        let description = require_text(description, "Post")?;
        self.moderate(actor, &description).await?;

        let post = self.store.create_post(actor.user_id, &description).await?;
        info!(post_id = post.id, user_id = actor.user_id, "Post created");
        Ok(post)
    }

    /// Posts by the users the actor follows plus the actor's own, newest first
    pub async fn feed(&self, actor: &AuthContext) -> Result<Vec<Post>> {
        let mut authors: Vec<i64> = self
            .store
            .outgoing_follows(actor.user_id, FollowStatus::Accepted)
            .await?
            .into_iter()
            .map(|f| f.following_id)
            .collect();
        authors.push(actor.user_id);

        self.store.posts_by_users(&authors).await
    }

    /// Posts on a profile, newest first
    pub async fn profile_posts(&self, viewer: Option<&AuthContext>, user_id: i64) -> Result<Vec<Post>> {
        self.require_visible(viewer, user_id).await?;
        self.store.posts_by_users(&[user_id]).await
    }

    /// A single post with its comments
    pub async fn post_details(&self, viewer: Option<&AuthContext>, post_id: i64) -> Result<PostWithComments> {
        let post = self.require_post(post_id).await?;
        self.require_visible(viewer, post.user_id).await?;

        let comments = self.store.post_comments(post_id).await?;
        Ok(PostWithComments { post, comments })
    }

    pub async fn delete_post(&self, actor: &AuthContext, post_id: i64) -> Result<()> {
        actor.require(Permission::Publish)?;
        let post = self.require_post(post_id).await?;
        if post.user_id != actor.user_id && !actor.has_permission(Permission::ModerateContent) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the author or an administrator can delete this post".to_string(),
            ));
        }

        self.store.delete_post_cascade(post_id).await?;
        if post.user_id != actor.user_id {
            log_admin_action(actor.user_id, "delete_post", Some(&post_id.to_string()), None);
        }
        debug!(post_id = post_id, user_id = actor.user_id, "Post deleted");
        Ok(())
    }

    pub async fn add_comment(&self, actor: &AuthContext, post_id: i64, body: &str) -> Result<Comment> {
        actor.require(Permission::Publish)?;
        let post = self.require_post(post_id).await?;
        self.require_visible(Some(actor), post.user_id).await?;

        let body = require_text(body, "Comment")?;
        self.moderate(actor, &body).await?;
        let sentiment = self.moderation.analyze_sentiment(&body).await.into_comment_sentiment();

        let comment = self.store.create_comment(post_id, actor.user_id, &body, sentiment).await?;
        info!(
            comment_id = comment.id,
            post_id = post_id,
            user_id = actor.user_id,
            sentiment = comment.sentiment_label.as_deref().unwrap_or("unknown"),
            "Comment added"
        );
        Ok(comment)
    }

    /// Replace a comment body, re-running moderation and sentiment
    pub async fn edit_comment(&self, actor: &AuthContext, comment_id: i64, body: &str) -> Result<Comment> {
        actor.require(Permission::Publish)?;
        let comment = self.require_comment(comment_id).await?;
        if comment.user_id != actor.user_id {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the author can edit a comment".to_string(),
            ));
        }

        let body = require_text(body, "Comment")?;
        self.moderate(actor, &body).await?;
        let sentiment = self.moderation.analyze_sentiment(&body).await.into_comment_sentiment();

        self.store.update_comment(comment_id, &body, Utc::now(), sentiment).await
    }

    pub async fn delete_comment(&self, actor: &AuthContext, comment_id: i64) -> Result<()> {
        actor.require(Permission::Publish)?;
        let comment = self.require_comment(comment_id).await?;
        if comment.user_id != actor.user_id && !actor.has_permission(Permission::ModerateContent) {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the author or an administrator can delete this comment".to_string(),
            ));
        }

        self.store.delete_comment(comment_id).await?;
        if comment.user_id != actor.user_id {
            log_admin_action(actor.user_id, "delete_comment", Some(&comment_id.to_string()), None);
        }
        Ok(())
    }

    async fn summarize(&self, post_id: i64, user_reaction: Option<ReactionType>) -> Result<ReactionSummary> {
        let counts = self.store.reaction_counts(post_id).await?;
        Ok(ReactionSummary { post_id, user_reaction, counts: tally(&counts) })
    }

    /// React to a post.
    ///
    /// Reacting with the type already held removes the reaction, any other
    /// type replaces it. Returns the actor's resulting reaction and the
    /// per-type counts.
    pub async fn react(&self, actor: &AuthContext, post_id: i64, reaction_type: &str) -> Result<ReactionSummary> {
        actor.require(Permission::Publish)?;
        let post = self.require_post(post_id).await?;
        self.require_visible(Some(actor), post.user_id).await?;
        let requested: ReactionType = reaction_type.parse()?;

        let existing = self.store.find_reaction(post_id, actor.user_id).await?;
        let user_reaction = match react_transition(existing.as_ref().map(|r| r.reaction_type), requested) {
            ReactionAction::Create(reaction_type) => {
                self.store.create_reaction(post_id, actor.user_id, reaction_type).await?;
                Some(reaction_type)
            }
            ReactionAction::Change(reaction_type) => {
                if let Some(reaction) = &existing {
                    self.store.set_reaction_type(reaction.id, reaction_type).await?;
                }
                Some(reaction_type)
            }
            ReactionAction::Remove => {
                if let Some(reaction) = &existing {
                    self.store.delete_reaction(reaction.id).await?;
                }
                None
            }
        };

        debug!(post_id = post_id, user_id = actor.user_id, reaction = ?user_reaction, "Reaction updated");
        self.summarize(post_id, user_reaction).await
    }

    /// Reaction counts on a post, with the viewer's own reaction when signed in
    pub async fn reactions(&self, viewer: Option<&AuthContext>, post_id: i64) -> Result<ReactionSummary> {
        let post = self.require_post(post_id).await?;
        self.require_visible(viewer, post.user_id).await?;

        let user_reaction = match viewer {
            Some(viewer) => self
                .store
                .find_reaction(post_id, viewer.user_id)
                .await?
                .map(|r| r.reaction_type),
            None => None,
        };
        self.summarize(post_id, user_reaction).await
    }

    /// Save the post for later, or unsave it. Returns whether it is now saved.
    pub async fn toggle_save(&self, actor: &AuthContext, post_id: i64) -> Result<bool> {
        actor.require(Permission::Publish)?;
        let post = self.require_post(post_id).await?;
        self.require_visible(Some(actor), post.user_id).await?;

        let saved = match self.store.find_saved_post(actor.user_id, post_id).await? {
            Some(existing) => {
                self.store.delete_saved_post(existing.id).await?;
                false
            }
            None => {
                self.store.create_saved_post(actor.user_id, post_id).await?;
                true
            }
        };

        debug!(post_id = post_id, user_id = actor.user_id, saved = saved, "Save toggled");
        Ok(saved)
    }

    /// The actor's saved posts, most recently saved first
    pub async fn saved_posts(&self, actor: &AuthContext) -> Result<Vec<Post>> {
        self.store.saved_posts_by_user(actor.user_id).await
    }
}
