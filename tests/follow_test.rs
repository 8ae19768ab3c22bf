//! Follow state machine tests over the in-memory store

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use SocialPlatform::models::FollowStatus;
use SocialPlatform::SocialPlatformError;

#[tokio::test]
async fn test_follow_public_user_is_accepted_immediately() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(true).await;

    let edge = ctx
        .services
        .follow_service
        .toggle_follow(&alice_ctx, bob.id)
        .await
        .unwrap()
        .expect("edge should exist");

    assert_eq!(edge.status, FollowStatus::Accepted);
    let followers = ctx.services.follow_service.followers(bob.id).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].follower_id, alice_ctx.user_id);
}

#[tokio::test]
async fn test_toggle_twice_on_public_user_removes_edge() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(true).await;

    ctx.services.follow_service.toggle_follow(&alice_ctx, bob.id).await.unwrap();
    let second = ctx.services.follow_service.toggle_follow(&alice_ctx, bob.id).await.unwrap();

    assert!(second.is_none());
    assert_eq!(ctx.store.follow_rows_for(bob.id), 0);
}

#[tokio::test]
async fn test_private_user_gets_pending_request_then_accepts() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(false).await;

    let request = ctx
        .services
        .follow_service
        .toggle_follow(&alice_ctx, bob.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.status, FollowStatus::Pending);

    let pending = ctx.services.follow_service.pending_requests(&bob_ctx).await.unwrap();
    assert_eq!(pending.len(), 1);

    let accepted = ctx
        .services
        .follow_service
        .respond_to_request(&bob_ctx, request.id, "Accept")
        .await
        .unwrap();
    assert_eq!(accepted.status, FollowStatus::Accepted);

    let following = ctx.services.follow_service.following(alice_ctx.user_id).await.unwrap();
    assert_eq!(following.len(), 1);
    assert!(ctx.services.follow_service.pending_requests(&bob_ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_cancels_pending_request() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(false).await;

    ctx.services.follow_service.toggle_follow(&alice_ctx, bob.id).await.unwrap();
    let cancelled = ctx.services.follow_service.toggle_follow(&alice_ctx, bob.id).await.unwrap();

    assert!(cancelled.is_none());
    assert_eq!(ctx.store.follow_rows_for(bob.id), 0);
}

#[tokio::test]
async fn test_rejected_request_can_be_renewed() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(false).await;

    let request = ctx
        .services
        .follow_service
        .toggle_follow(&alice_ctx, bob.id)
        .await
        .unwrap()
        .unwrap();
    let rejected = ctx
        .services
        .follow_service
        .respond_to_request(&bob_ctx, request.id, "reject")
        .await
        .unwrap();
    assert_eq!(rejected.status, FollowStatus::Rejected);

    let renewed = ctx
        .services
        .follow_service
        .toggle_follow(&alice_ctx, bob.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renewed.id, request.id);
    assert_eq!(renewed.status, FollowStatus::Pending);
}

#[tokio::test]
async fn test_only_receiver_can_respond() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, _) = ctx.user(false).await;

    let request = ctx
        .services
        .follow_service
        .toggle_follow(&alice_ctx, bob.id)
        .await
        .unwrap()
        .unwrap();

    let result = ctx
        .services
        .follow_service
        .respond_to_request(&alice_ctx, request.id, "accept")
        .await;
    assert_matches!(result, Err(SocialPlatformError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_respond_rejects_unknown_decision_and_settled_requests() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let (bob, bob_ctx) = ctx.user(false).await;

    let request = ctx
        .services
        .follow_service
        .toggle_follow(&alice_ctx, bob.id)
        .await
        .unwrap()
        .unwrap();

    let bad = ctx
        .services
        .follow_service
        .respond_to_request(&bob_ctx, request.id, "maybe")
        .await;
    assert_matches!(bad, Err(SocialPlatformError::InvalidDecision(_)));

    ctx.services
        .follow_service
        .respond_to_request(&bob_ctx, request.id, "accept")
        .await
        .unwrap();
    let again = ctx
        .services
        .follow_service
        .respond_to_request(&bob_ctx, request.id, "reject")
        .await;
    assert_matches!(again, Err(SocialPlatformError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn test_respond_to_missing_request() {
    let ctx = TestContext::new();
    let (_bob, bob_ctx) = ctx.user(false).await;

    let result = ctx
        .services
        .follow_service
        .respond_to_request(&bob_ctx, 9999, "accept")
        .await;
    assert_matches!(result, Err(SocialPlatformError::FollowRequestNotFound { request_id: 9999 }));
}

#[tokio::test]
async fn test_cannot_follow_self_or_administrators() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;
    let (admin, admin_ctx) = ctx.admin().await;

    let own = ctx.services.follow_service.toggle_follow(&alice_ctx, alice.id).await;
    assert_matches!(own, Err(SocialPlatformError::PermissionDenied(_)));

    let to_admin = ctx.services.follow_service.toggle_follow(&alice_ctx, admin.id).await;
    assert_matches!(to_admin, Err(SocialPlatformError::PermissionDenied(_)));

    let from_admin = ctx.services.follow_service.toggle_follow(&admin_ctx, alice.id).await;
    assert_matches!(from_admin, Err(SocialPlatformError::PermissionDenied(_)));

    assert_eq!(ctx.store.follow_rows_for(admin.id), 0);
}

#[tokio::test]
async fn test_incomplete_profile_cannot_follow() {
    let ctx = TestContext::new();
    let (_carol, carol_ctx) = ctx.incomplete_user().await;
    let (bob, _) = ctx.user(true).await;

    let result = ctx.services.follow_service.toggle_follow(&carol_ctx, bob.id).await;
    assert_matches!(result, Err(SocialPlatformError::PermissionDenied(msg)) if msg.contains("complete their profile"));
}

#[tokio::test]
async fn test_follow_missing_user() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;

    let result = ctx.services.follow_service.toggle_follow(&alice_ctx, 4242).await;
    assert_matches!(result, Err(SocialPlatformError::UserNotFound { user_id: 4242 }));
}

#[tokio::test]
async fn test_remove_follower() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;
    let (_bob, bob_ctx) = ctx.user(true).await;

    ctx.services.follow_service.toggle_follow(&alice_ctx, bob_ctx.user_id).await.unwrap();
    ctx.services.follow_service.remove_follower(&bob_ctx, alice.id).await.unwrap();

    assert!(ctx.services.follow_service.followers(bob_ctx.user_id).await.unwrap().is_empty());

    let again = ctx.services.follow_service.remove_follower(&bob_ctx, alice.id).await;
    assert_matches!(again, Err(SocialPlatformError::FollowNotFound { .. }));
}

#[tokio::test]
async fn test_remove_follower_ignores_pending_requests() {
    let ctx = TestContext::new();
    let (alice, alice_ctx) = ctx.user(true).await;
    let (_bob, bob_ctx) = ctx.user(false).await;

    ctx.services.follow_service.toggle_follow(&alice_ctx, bob_ctx.user_id).await.unwrap();
    let result = ctx.services.follow_service.remove_follower(&bob_ctx, alice.id).await;

    assert_matches!(result, Err(SocialPlatformError::FollowNotFound { .. }));
    assert_eq!(ctx.store.follow_rows_for(alice.id), 1);
}
