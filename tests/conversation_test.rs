//! Conversation and read receipt tests over the in-memory store

mod helpers;

use std::time::Duration;

use assert_matches::assert_matches;
use helpers::*;
use SocialPlatform::models::CreateGroupRequest;
use SocialPlatform::SocialPlatformError;

async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_start_direct_reuses_existing_conversation() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(true).await;

    let first = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();
    let second = ctx.services.conversation_service.start_direct(&bob_ctx, alice.id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(first.is_direct());
    assert_eq!(ctx.services.conversation_service.list(&alice_ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_start_direct_rejects_self_and_missing_receiver() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;

    let own = ctx.services.conversation_service.start_direct(&alice_ctx, alice.id).await;
    assert_matches!(own, Err(SocialPlatformError::InvalidInput(_)));

    let missing = ctx.services.conversation_service.start_direct(&alice_ctx, 31337).await;
    assert_matches!(missing, Err(SocialPlatformError::UserNotFound { .. }));
}

#[tokio::test]
async fn test_read_receipts_follow_other_participants_last_entry() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(true).await;

    let conversation = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();
    tick().await;
    let message = ctx
        .services
        .conversation_service
        .send(&alice_ctx, conversation.id, "  hello bob  ")
        .await
        .unwrap();
    assert_eq!(message.content, "hello bob");
    assert!(!message.is_read);

    // Bob's view measures against Alice, who has not been back since sending
    tick().await;
    let bob_view = ctx.services.conversation_service.open(&bob_ctx, conversation.id).await.unwrap();
    assert_eq!(bob_view.messages.len(), 1);
    assert!(!bob_view.messages[0].is_read);

    tick().await;
    let alice_view = ctx.services.conversation_service.open(&alice_ctx, conversation.id).await.unwrap();
    assert!(alice_view.messages[0].is_read);
    assert!(alice_view.group_id.is_none());
    assert!(!alice_view.is_group_owner);

    let participant_ids: Vec<i64> = alice_view.participants.iter().map(|p| p.user_id).collect();
    assert!(participant_ids.contains(&alice.id) && participant_ids.contains(&bob.id));
}

#[tokio::test]
async fn test_new_message_is_unread_until_seen_again() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(true).await;

    let conversation = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();
    ctx.services.conversation_service.open(&bob_ctx, conversation.id).await.unwrap();
    tick().await;
    ctx.services.conversation_service.send(&alice_ctx, conversation.id, "are you there?").await.unwrap();

    let alice_view = ctx.services.conversation_service.open(&alice_ctx, conversation.id).await.unwrap();
    assert!(!alice_view.messages[0].is_read);

    tick().await;
    ctx.services.conversation_service.open(&bob_ctx, conversation.id).await.unwrap();
    let alice_view = ctx.services.conversation_service.open(&alice_ctx, conversation.id).await.unwrap();
    assert!(alice_view.messages[0].is_read);
}

#[tokio::test]
async fn test_outsider_cannot_open_or_send() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(true).await;
    let (_eve, eve_ctx) = ctx.user(true).await;

    let conversation = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();

    let open = ctx.services.conversation_service.open(&eve_ctx, conversation.id).await;
    assert_matches!(open, Err(SocialPlatformError::PermissionDenied(_)));

    let send = ctx.services.conversation_service.send(&eve_ctx, conversation.id, "hi").await;
    assert_matches!(send, Err(SocialPlatformError::PermissionDenied(_)));

    let missing = ctx.services.conversation_service.open(&alice_ctx, 5050).await;
    assert_matches!(missing, Err(SocialPlatformError::ConversationNotFound { conversation_id: 5050 }));
}

#[tokio::test]
async fn test_send_rejects_blank_content() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(true).await;

    let conversation = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();
    let result = ctx.services.conversation_service.send(&alice_ctx, conversation.id, " \n ").await;
    assert_matches!(result, Err(SocialPlatformError::InvalidInput(_)));
}

#[tokio::test]
async fn test_edit_and_delete_are_author_only() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(true).await;

    let conversation = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();
    let message = ctx
        .services
        .conversation_service
        .send(&alice_ctx, conversation.id, "first draft")
        .await
        .unwrap();

    let by_bob = ctx.services.conversation_service.edit_message(&bob_ctx, message.id, "hijacked").await;
    assert_matches!(by_bob, Err(SocialPlatformError::PermissionDenied(_)));

    let unchanged = ctx.services.conversation_service.edit_message(&alice_ctx, message.id, "   ").await.unwrap();
    assert_eq!(unchanged.content, "first draft");

    let edited = ctx.services.conversation_service.edit_message(&alice_ctx, message.id, "final").await.unwrap();
    assert_eq!(edited.content, "final");

    let delete_by_bob = ctx.services.conversation_service.delete_message(&bob_ctx, message.id).await;
    assert_matches!(delete_by_bob, Err(SocialPlatformError::PermissionDenied(_)));

    ctx.services.conversation_service.delete_message(&alice_ctx, message.id).await.unwrap();
    let gone = ctx.services.conversation_service.delete_message(&alice_ctx, message.id).await;
    assert_matches!(gone, Err(SocialPlatformError::MessageNotFound { .. }));
}

#[tokio::test]
async fn test_group_conversation_view_carries_group_context() {
    let ctx = TestContext::new();
    let (_owner, owner_ctx) = ctx.user(true).await;
    let (member, member_ctx) = ctx.user(true).await;
    let (_pending, pending_ctx) = ctx.user(true).await;

    let (group, _) = ctx
        .services
        .group_service
        .create_group(&owner_ctx, CreateGroupRequest {
            name: "Board games".to_string(),
            description: Some("Fridays".to_string()),
        })
        .await
        .unwrap();
    ctx.services.group_service.add_member(&owner_ctx, group.id, member.id).await.unwrap();
    ctx.services.group_service.join(&pending_ctx, group.id).await.unwrap();

    let conversation = ctx
        .services
        .conversation_service
        .list(&member_ctx)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.group_id == Some(group.id))
        .expect("member sees the group conversation");

    let owner_view = ctx.services.conversation_service.open(&owner_ctx, conversation.id).await.unwrap();
    assert_eq!(owner_view.group_id, Some(group.id));
    assert_eq!(owner_view.group_description.as_deref(), Some("Fridays"));
    assert!(owner_view.is_group_owner);

    let member_view = ctx.services.conversation_service.open(&member_ctx, conversation.id).await.unwrap();
    assert!(!member_view.is_group_owner);

    let pending_view = ctx.services.conversation_service.open(&pending_ctx, conversation.id).await;
    assert_matches!(pending_view, Err(SocialPlatformError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_incomplete_profile_cannot_edit_or_delete_own_message() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(true).await;

    let conversation = ctx.services.conversation_service.start_direct(&alice_ctx, bob.id).await.unwrap();
    let message = ctx.services.conversation_service.send(&alice_ctx, conversation.id, "draft").await.unwrap();

    let gated = ctx.revoke_profile(alice.id).await;
    let edit = ctx.services.conversation_service.edit_message(&gated, message.id, "changed").await;
    assert_matches!(edit, Err(SocialPlatformError::PermissionDenied(reason)) if reason.contains("complete their profile"));

    let delete = ctx.services.conversation_service.delete_message(&gated, message.id).await;
    assert_matches!(delete, Err(SocialPlatformError::PermissionDenied(_)));

    let view = ctx.services.conversation_service.open(&alice_ctx, conversation.id).await.unwrap();
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].content, "draft");
}
