//! Conversation service implementation

use chrono::Utc;
use tracing::{debug, info};
use crate::database::store::SocialStore;
use crate::models::{Conversation, ConversationParticipant, ConversationView, MembershipRole, Message};
use crate::policy::conversation::read_flag_changes;
use crate::services::auth::{AuthContext, Permission};
use crate::services::require_user;
use crate::utils::errors::{SocialPlatformError, Result};
use crate::utils::helpers::require_text;

#[derive(Clone)]
pub struct ConversationService<S: SocialStore> {
    store: S,
}

impl<S: SocialStore> ConversationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn require_conversation(&self, conversation_id: i64) -> Result<Conversation> {
        self.store
            .find_conversation(conversation_id)
            .await?
            .ok_or(SocialPlatformError::ConversationNotFound { conversation_id })
    }

    async fn require_participant(&self, actor: &AuthContext, conversation_id: i64) -> Result<Vec<ConversationParticipant>> {
        let participants = self.store.participants(conversation_id).await?;
        if !participants.iter().any(|p| p.user_id == actor.user_id) {
            return Err(SocialPlatformError::PermissionDenied(format!(
                "User {} is not part of conversation {}",
                actor.user_id, conversation_id
            )));
        }
        Ok(participants)
    }

    async fn require_own_message(&self, actor: &AuthContext, message_id: i64) -> Result<Message> {
        let message = self
            .store
            .find_message(message_id)
            .await?
            .ok_or(SocialPlatformError::MessageNotFound { message_id })?;

        if message.sender_id != actor.user_id {
            return Err(SocialPlatformError::PermissionDenied(
                "Only the author can change a message".to_string(),
            ));
        }
        Ok(message)
    }

    /// Open or reuse the 1:1 conversation with another user
    pub async fn start_direct(&self, actor: &AuthContext, receiver_id: i64) -> Result<Conversation> {
        actor.require(Permission::SendMessages)?;
        require_user(&self.store, receiver_id).await?;
        if receiver_id == actor.user_id {
            return Err(SocialPlatformError::InvalidInput(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }

        if let Some(existing) = self.store.find_direct_conversation(actor.user_id, receiver_id).await? {
            debug!(conversation_id = existing.id, "Reusing direct conversation");
            return Ok(existing);
        }

        let conversation = self.store.create_direct_conversation(actor.user_id, receiver_id).await?;
        info!(conversation_id = conversation.id, user_id = actor.user_id, receiver_id = receiver_id, "Direct conversation created");
        Ok(conversation)
    }

    /// Enter a conversation: stamps the actor's last entry and refreshes read receipts
    pub async fn open(&self, actor: &AuthContext, conversation_id: i64) -> Result<ConversationView> {
        let conversation = self.require_conversation(conversation_id).await?;
        let mut participants = self.require_participant(actor, conversation_id).await?;

        let now = Utc::now();
        self.store.touch_participant(conversation_id, actor.user_id, now).await?;
        for participant in participants.iter_mut().filter(|p| p.user_id == actor.user_id) {
            participant.last_entry = now;
        }

        let other_entries: Vec<_> = participants
            .iter()
            .filter(|p| p.user_id != actor.user_id)
            .map(|p| p.last_entry)
            .collect();

        let mut messages = self.store.messages(conversation_id).await?;
        let changes = read_flag_changes(&messages, &other_entries);
        if !changes.is_empty() {
            self.store.set_read_flags(&changes).await?;
            for (message_id, is_read) in &changes {
                if let Some(message) = messages.iter_mut().find(|m| m.id == *message_id) {
                    message.is_read = *is_read;
                }
            }
        }

        let (group_description, is_group_owner) = match conversation.group_id {
            Some(group_id) => {
                let description = self.store.find_group(group_id).await?.and_then(|g| g.description);
                let is_owner = self
                    .store
                    .find_membership(group_id, actor.user_id)
                    .await?
                    .map_or(false, |m| m.role == MembershipRole::Owner);
                (description, is_owner)
            }
            None => (None, false),
        };

        debug!(conversation_id = conversation_id, user_id = actor.user_id, updated = changes.len(), "Conversation opened");
        Ok(ConversationView {
            group_id: conversation.group_id,
            conversation,
            messages,
            participants,
            group_description,
            is_group_owner,
        })
    }

    /// Post a message to a conversation the actor belongs to
    pub async fn send(&self, actor: &AuthContext, conversation_id: i64, content: &str) -> Result<Message> {
        actor.require(Permission::SendMessages)?;
        self.require_conversation(conversation_id).await?;
        self.require_participant(actor, conversation_id).await?;
        let content = require_text(content, "Message")?;

        let message = self.store.create_message(conversation_id, actor.user_id, &content).await?;
        debug!(conversation_id = conversation_id, message_id = message.id, sender_id = actor.user_id, "Message sent");
        Ok(message)
    }

    /// Change a message's content. Blank content leaves it as it was.
    pub async fn edit_message(&self, actor: &AuthContext, message_id: i64, content: &str) -> Result<Message> {
        actor.require(Permission::SendMessages)?;
        let message = self.require_own_message(actor, message_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Ok(message);
        }

        self.store.update_message(message_id, content).await
    }

    pub async fn delete_message(&self, actor: &AuthContext, message_id: i64) -> Result<()> {
        actor.require(Permission::SendMessages)?;
        self.require_own_message(actor, message_id).await?;
        self.store.delete_message(message_id).await?;
        debug!(message_id = message_id, user_id = actor.user_id, "Message deleted");
        Ok(())
    }

    /// Every conversation the actor participates in
    pub async fn list(&self, actor: &AuthContext) -> Result<Vec<Conversation>> {
        self.store.user_conversations(actor.user_id).await
    }
}
